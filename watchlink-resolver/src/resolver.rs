//! Resolution orchestrator.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use watchlink_core::{CacheEntry, LinkResolution, ResolutionRequest, StreamingService};
use watchlink_fetch::{
    BrowserLauncher, BrowserSession, ChromiumLauncher, DiagnosticsCapturer, RateLimiter,
    ResolveError, RetryController, RetryVerdict, SessionState,
};
use watchlink_providers::PlatformRegistry;
use watchlink_store::{LinkCache, Settings, StoreError};

// ============================================================================
// Link Resolver
// ============================================================================

/// Resolves `(work, title, year, service)` requests to watch-page links.
///
/// `resolve` takes `&mut self`: one resolver runs one resolution at a time.
/// Share it across tasks behind a mutex. Call [`close`](Self::close) before
/// dropping so the cache is flushed and the browser shut down cleanly.
pub struct LinkResolver {
    registry: PlatformRegistry,
    cache: LinkCache,
    session: BrowserSession,
    limiter: RateLimiter,
    retry: RetryController,
    diagnostics: DiagnosticsCapturer,
}

impl LinkResolver {
    /// Creates a resolver with the built-in platforms and Chromium.
    pub async fn new(settings: &Settings) -> Self {
        Self::with_components(
            settings,
            PlatformRegistry::builtin(settings.search_settings()),
            Arc::new(ChromiumLauncher::new()),
        )
        .await
    }

    /// Creates a resolver with a custom registry and browser launcher.
    ///
    /// Loads the cache and prunes old diagnostics. The browser is not
    /// started until the first cache miss.
    #[instrument(skip_all, fields(cache = %settings.cache_path.display()))]
    pub async fn with_components(
        settings: &Settings,
        registry: PlatformRegistry,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Self {
        let cache = LinkCache::load(&settings.cache_path, settings.cache_ttl_days).await;
        let diagnostics = settings.diagnostics();
        diagnostics.prune().await;

        info!(
            entries = cache.len(),
            platforms = registry.len(),
            "Link resolver ready"
        );

        Self {
            registry,
            cache,
            session: BrowserSession::new(launcher, settings.session_options()),
            limiter: RateLimiter::new(settings.rate_limit()),
            retry: RetryController::new(settings.backoff_policy()),
            diagnostics,
        }
    }

    /// Returns the link cache.
    pub fn cache(&self) -> &LinkCache {
        &self.cache
    }

    /// Returns the platform registry.
    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Returns the browser session state.
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Resolves one title on one service.
    ///
    /// Never fails: every error is folded into the returned
    /// [`LinkResolution`].
    #[instrument(skip(self, year), fields(year = year.unwrap_or("")))]
    pub async fn resolve(
        &mut self,
        work_id: &str,
        title: &str,
        year: Option<&str>,
        service_name: &str,
    ) -> LinkResolution {
        let (service, strategy) = match self.registry.lookup(service_name) {
            Ok(found) => found,
            Err(e) => {
                info!(error = %e, "Skipping resolution");
                return LinkResolution::unsupported(service_name);
            }
        };
        let label = service.display_name();

        if let Some(entry) = self.cache.get_fresh(work_id, Utc::now()) {
            if StreamingService::from_name(entry.service()) == Some(service) {
                debug!(link = ?entry.streaming.link, "Cache hit");
                return LinkResolution::from_entry(entry, true);
            }
            debug!(cached_service = entry.service(), "Cached entry is for another service");
        }

        let started = self.session.init().await.map(|_| ());
        if let Err(e) = started {
            let error = ResolveError::SessionInit(e);
            warn!(error = %error, "Cannot resolve without a browser");
            self.session.teardown().await;
            return LinkResolution::failed(label, error.to_string(), 0);
        }
        let Some(page) = self.session.page() else {
            return LinkResolution::failed(label, "browser session not ready", 0);
        };

        let limiter = &self.limiter;
        let strategy = &*strategy;
        debug!(strategy = strategy.id(), "Resolving");

        let report = self
            .retry
            .run(move |attempt| async move {
                let waited = limiter.before_request().await;
                debug!(attempt = attempt + 1, waited = ?waited, "Starting attempt");
                strategy.resolve(page, title, year).await
            })
            .await;

        let now = Utc::now();
        let expires_at = self.cache.expiry_from(now);
        let failure = report.failure_reason();

        let entry = match report.verdict {
            RetryVerdict::Found(found) => {
                info!(link = %found.link, attempts = report.attempts, "Resolved link");
                CacheEntry::found(label, found.link, now, expires_at)
                    .with_retry_count(report.attempts)
                    .with_selector(Some(found.selector))
            }
            RetryVerdict::NotFound(_) | RetryVerdict::Failed | RetryVerdict::Exhausted => {
                let error = failure.unwrap_or_else(|| "resolution failed".to_string());
                warn!(error = %error, attempts = report.attempts, "No link resolved");

                let artifacts = self
                    .diagnostics
                    .capture(page, work_id, service.slug(), &error)
                    .await;

                CacheEntry::not_found(label, error, now, expires_at)
                    .with_retry_count(report.attempts)
                    .with_diagnostics(artifacts.screenshot_path(), artifacts.html_path())
            }
        };

        let result = LinkResolution::from_entry(&entry, false);
        self.cache.put(work_id, entry);
        result
    }

    /// Resolves a [`ResolutionRequest`].
    pub async fn resolve_request(&mut self, request: &ResolutionRequest) -> LinkResolution {
        self.resolve(
            &request.work_id,
            &request.title,
            request.year.as_deref(),
            &request.service_name,
        )
        .await
    }

    /// Resolves requests one after another, in order.
    #[instrument(skip_all, fields(count = requests.len()))]
    pub async fn resolve_batch(&mut self, requests: &[ResolutionRequest]) -> Vec<LinkResolution> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.resolve_request(request).await);
        }

        let found = results.iter().filter(|r| r.is_found()).count();
        info!(found, total = results.len(), "Batch complete");
        results
    }

    /// Flushes the cache and shuts the browser down.
    ///
    /// Safe to call more than once. The browser is torn down even when the
    /// flush fails; the flush error is returned.
    #[instrument(skip(self))]
    pub async fn close(&mut self) -> Result<(), StoreError> {
        let flushed = self.cache.flush().await;
        if let Err(e) = &flushed {
            warn!(error = %e, "Failed to flush link cache");
        }

        self.session.teardown().await;
        flushed
    }
}

impl std::fmt::Debug for LinkResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkResolver")
            .field("registry", &self.registry)
            .field("cache_entries", &self.cache.len())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
