//! Chromium launcher over the Chrome DevTools Protocol.
//!
//! Each launch starts a browser process, spawns the CDP event loop on the
//! tokio runtime, and opens an isolated browser context so cookies and
//! storage never leak between runs.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{CreateBrowserContextParams, CreateTargetParams};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, instrument, trace};

use super::browser::{BrowserHandle, BrowserLauncher, PageHandle, SessionOptions};
use crate::error::BrowserError;

/// Interval between DOM polls while waiting for a selector.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

// ============================================================================
// Launcher
// ============================================================================

/// Launches Chromium-family browsers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    /// Creates a new launcher.
    pub fn new() -> Self {
        Self
    }

    fn config(options: &SessionOptions) -> Result<BrowserConfig, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(options.navigation_timeout)
            .window_size(options.viewport_width, options.viewport_height)
            .viewport(Viewport {
                width: options.viewport_width,
                height: options.viewport_height,
                ..Viewport::default()
            })
            .arg(format!("--user-agent={}", options.user_agent));

        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &options.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(BrowserError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    #[instrument(skip(self, options))]
    async fn launch(&self, options: &SessionOptions) -> Result<Box<dyn BrowserHandle>, BrowserError> {
        let config = Self::config(options)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let engine = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!(error = %e, "CDP handler event error");
                }
            }
            debug!("CDP handler finished");
        });

        let mut handle = ChromiumBrowser {
            browser,
            context: None,
            engine: Some(engine),
            navigation_timeout: options.navigation_timeout,
        };

        match handle
            .browser
            .create_browser_context(CreateBrowserContextParams::default())
            .await
        {
            Ok(context) => handle.context = Some(context),
            Err(e) => {
                // Best-effort release; the launch error is what gets reported.
                let _ = handle.close_browser().await;
                let _ = handle.stop_engine().await;
                return Err(BrowserError::Launch(format!(
                    "browser context creation failed: {e}"
                )));
            }
        }

        debug!("Chromium launched");
        Ok(Box::new(handle))
    }
}

// ============================================================================
// Browser Handle
// ============================================================================

struct ChromiumBrowser {
    browser: Browser,
    context: Option<BrowserContextId>,
    engine: Option<JoinHandle<()>>,
    navigation_timeout: Duration,
}

#[async_trait]
impl BrowserHandle for ChromiumBrowser {
    async fn open_page(&mut self) -> Result<Box<dyn PageHandle>, BrowserError> {
        let mut params = CreateTargetParams::new("about:blank");
        params.browser_context_id = self.context.clone();

        let page = self
            .browser
            .new_page(params)
            .await
            .map_err(|e| BrowserError::PageCreation(e.to_string()))?;

        Ok(Box::new(ChromiumPage {
            page,
            navigation_timeout: self.navigation_timeout,
        }))
    }

    async fn close_context(&mut self) -> Result<(), BrowserError> {
        if let Some(context) = self.context.take() {
            self.browser
                .dispose_browser_context(context)
                .await
                .map_err(|e| BrowserError::Close(format!("context: {e}")))?;
        }
        Ok(())
    }

    async fn close_browser(&mut self) -> Result<(), BrowserError> {
        self.browser
            .close()
            .await
            .map_err(|e| BrowserError::Close(format!("browser: {e}")))?;
        self.browser.wait().await?;
        Ok(())
    }

    async fn stop_engine(&mut self) -> Result<(), BrowserError> {
        if let Some(engine) = self.engine.take() {
            engine.abort();
            if let Err(e) = engine.await {
                if !e.is_cancelled() {
                    return Err(BrowserError::Close(format!("engine: {e}")));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Page Handle
// ============================================================================

struct ChromiumPage {
    page: Page,
    navigation_timeout: Duration,
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let navigation = tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await;

        match navigation {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout: self.navigation_timeout,
            }),
        }
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, BrowserError> {
        let deadline = Instant::now() + timeout;

        loop {
            let found = self
                .page
                .find_elements(selector)
                .await
                .map_err(|e| BrowserError::Query {
                    selector: selector.to_string(),
                    message: e.to_string(),
                })?;

            if !found.is_empty() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn hrefs(&self, selector: &str, limit: usize) -> Result<Vec<String>, BrowserError> {
        let query_error = |e: chromiumoxide::error::CdpError| BrowserError::Query {
            selector: selector.to_string(),
            message: e.to_string(),
        };

        let elements = self.page.find_elements(selector).await.map_err(query_error)?;

        let mut hrefs = Vec::new();
        for element in elements.iter().take(limit) {
            if let Some(href) = element.attribute("href").await.map_err(query_error)? {
                hrefs.push(href);
            }
        }
        Ok(hrefs)
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Capture(format!("content: {e}")))
    }

    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        self.page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await
            .map_err(|e| BrowserError::Capture(format!("screenshot: {e}")))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| BrowserError::Close(format!("page: {e}")))
    }
}

