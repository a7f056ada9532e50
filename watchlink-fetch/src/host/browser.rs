//! Browser session management.
//!
//! The session owns one browser and one page. It moves between two
//! states:
//!
//! ```text
//! Uninitialized --init()--> Ready
//!       ^                     |
//!       +-----teardown()------+
//! ```
//!
//! `init()` is a no-op when already `Ready`. If any launch step fails, the
//! resources created so far are released and the session stays
//! `Uninitialized`.
//!
//! The browser itself sits behind [`BrowserLauncher`], [`BrowserHandle`]
//! and [`PageHandle`], so strategies and the orchestrator never talk to a
//! particular driver.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::BrowserError;

/// Desktop Chrome user agent presented to streaming sites.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

// ============================================================================
// Session Options
// ============================================================================

/// Options applied when launching the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Run without a visible window.
    pub headless: bool,
    /// Timeout for a single navigation.
    pub navigation_timeout: Duration,
    /// Viewport width in CSS pixels.
    pub viewport_width: u32,
    /// Viewport height in CSS pixels.
    pub viewport_height: u32,
    /// User agent string.
    pub user_agent: String,
    /// Explicit browser binary; auto-detected when `None`.
    pub executable: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headless: true,
            navigation_timeout: Duration::from_secs(30),
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            executable: None,
        }
    }
}

// ============================================================================
// Driver Seams
// ============================================================================

/// A single browser tab.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigates to `url` and waits for the load to settle.
    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// Waits up to `timeout` for `selector` to match at least one element.
    ///
    /// Returns `Ok(false)` when the selector simply never appeared.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
        -> Result<bool, BrowserError>;

    /// Returns the `href` attributes of the first `limit` matches.
    async fn hrefs(&self, selector: &str, limit: usize) -> Result<Vec<String>, BrowserError>;

    /// Returns the serialized DOM.
    async fn content(&self) -> Result<String, BrowserError>;

    /// Writes a full-page PNG screenshot to `path`.
    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError>;

    /// Closes the tab.
    async fn close(&self) -> Result<(), BrowserError>;
}

/// A running browser with its isolated context.
///
/// Teardown is split per resource so one failure does not block the rest.
#[async_trait]
pub trait BrowserHandle: Send {
    /// Opens a tab in the browser context.
    async fn open_page(&mut self) -> Result<Box<dyn PageHandle>, BrowserError>;

    /// Disposes the browser context.
    async fn close_context(&mut self) -> Result<(), BrowserError>;

    /// Closes the browser process.
    async fn close_browser(&mut self) -> Result<(), BrowserError>;

    /// Stops the driver's event loop.
    async fn stop_engine(&mut self) -> Result<(), BrowserError>;
}

/// Starts browsers.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launches a browser with the given options.
    async fn launch(&self, options: &SessionOptions) -> Result<Box<dyn BrowserHandle>, BrowserError>;
}

// ============================================================================
// Browser Session
// ============================================================================

/// Lifecycle state of a [`BrowserSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No browser is running.
    Uninitialized,
    /// Browser and page are open.
    Ready,
}

/// Owns at most one browser and one page.
pub struct BrowserSession {
    launcher: Arc<dyn BrowserLauncher>,
    options: SessionOptions,
    browser: Option<Box<dyn BrowserHandle>>,
    page: Option<Box<dyn PageHandle>>,
}

impl BrowserSession {
    /// Creates an uninitialized session.
    pub fn new(launcher: Arc<dyn BrowserLauncher>, options: SessionOptions) -> Self {
        Self {
            launcher,
            options,
            browser: None,
            page: None,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        if self.browser.is_some() && self.page.is_some() {
            SessionState::Ready
        } else {
            SessionState::Uninitialized
        }
    }

    /// Returns the session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Returns the page when `Ready`.
    pub fn page(&self) -> Option<&dyn PageHandle> {
        self.page.as_deref()
    }

    /// Starts the browser and opens a page, unless already `Ready`.
    #[instrument(skip(self), fields(headless = self.options.headless))]
    pub async fn init(&mut self) -> Result<&dyn PageHandle, BrowserError> {
        if self.state() == SessionState::Ready {
            return self.page.as_deref().ok_or(BrowserError::NotReady);
        }

        // A half-open session from an earlier failure is released first.
        self.teardown().await;

        debug!("Launching browser");
        let mut browser = self.launcher.launch(&self.options).await?;

        let page = match browser.open_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "Opening page failed, tearing down browser");
                release_browser(browser.as_mut()).await;
                return Err(e);
            }
        };

        info!("Browser session ready");
        self.browser = Some(browser);
        self.page = Some(page);
        self.page.as_deref().ok_or(BrowserError::NotReady)
    }

    /// Closes page, context, browser and engine in that order.
    ///
    /// Close errors are logged and skipped. Safe to call in any state.
    #[instrument(skip(self))]
    pub async fn teardown(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                warn!(error = %e, "Failed to close page");
            }
        }

        if let Some(mut browser) = self.browser.take() {
            release_browser(browser.as_mut()).await;
            debug!("Browser session torn down");
        }
    }
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("state", &self.state())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Releases context, browser and engine, logging each failure.
async fn release_browser(browser: &mut dyn BrowserHandle) {
    if let Err(e) = browser.close_context().await {
        warn!(error = %e, "Failed to close browser context");
    }
    if let Err(e) = browser.close_browser().await {
        warn!(error = %e, "Failed to close browser");
    }
    if let Err(e) = browser.stop_engine().await {
        warn!(error = %e, "Failed to stop browser engine");
    }
}

// ============================================================================
// Tests
// ============================================================================
