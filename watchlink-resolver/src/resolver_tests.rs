//! End-to-end orchestrator tests with a scripted browser.

use async_trait::async_trait;
use chrono::{Duration as TimeDelta, Utc};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use watchlink_core::{CacheEntry, ResolutionRequest, StreamingService, UNSUPPORTED_SERVICE};
use watchlink_fetch::{
    BrowserError, BrowserHandle, BrowserLauncher, LinkStrategy, PageHandle, ResolveError,
    SessionOptions, SessionState, StrategyOutcome,
};
use watchlink_providers::{PlatformRegistry, SearchSettings};
use watchlink_providers::platforms::netflix_descriptor;
use watchlink_store::{LinkCache, Settings, StoreError};

use crate::LinkResolver;

// ============================================================================
// Fake Browser
// ============================================================================

/// Counters shared between a test and the fake browser it hands out.
#[derive(Default)]
struct BrowserLog {
    launches: AtomicUsize,
    navigations: AtomicUsize,
    screenshots: AtomicUsize,
    closed_pages: AtomicUsize,
}

struct FakeLauncher {
    log: Arc<BrowserLog>,
    results: HashMap<&'static str, Vec<&'static str>>,
    fail_launch: bool,
}

impl FakeLauncher {
    fn new(log: &Arc<BrowserLog>) -> Self {
        Self {
            log: Arc::clone(log),
            results: HashMap::new(),
            fail_launch: false,
        }
    }

    fn with_results(mut self, selector: &'static str, hrefs: Vec<&'static str>) -> Self {
        self.results.insert(selector, hrefs);
        self
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, _: &SessionOptions) -> Result<Box<dyn BrowserHandle>, BrowserError> {
        self.log.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(BrowserError::Launch("no chrome binary".to_string()));
        }
        Ok(Box::new(FakeBrowser {
            log: Arc::clone(&self.log),
            results: self.results.clone(),
        }))
    }
}

struct FakeBrowser {
    log: Arc<BrowserLog>,
    results: HashMap<&'static str, Vec<&'static str>>,
}

#[async_trait]
impl BrowserHandle for FakeBrowser {
    async fn open_page(&mut self) -> Result<Box<dyn PageHandle>, BrowserError> {
        Ok(Box::new(FakePage {
            log: Arc::clone(&self.log),
            results: self.results.clone(),
        }))
    }

    async fn close_context(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn close_browser(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn stop_engine(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }
}

struct FakePage {
    log: Arc<BrowserLog>,
    results: HashMap<&'static str, Vec<&'static str>>,
}

#[async_trait]
impl PageHandle for FakePage {
    async fn goto(&self, _: &str) -> Result<(), BrowserError> {
        self.log.navigations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _: Duration) -> Result<bool, BrowserError> {
        Ok(self.results.contains_key(selector))
    }

    async fn hrefs(&self, selector: &str, limit: usize) -> Result<Vec<String>, BrowserError> {
        Ok(self
            .results
            .get(selector)
            .map(|h| h.iter().take(limit).map(|s| (*s).to_string()).collect())
            .unwrap_or_default())
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok("<html><body>Search</body></html>".to_string())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        self.log.screenshots.fetch_add(1, Ordering::SeqCst);
        std::fs::write(path, b"png")?;
        Ok(())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.log.closed_pages.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Scripted Strategy
// ============================================================================

/// Replays queued outcomes, then keeps asking for a retry.
struct ScriptedStrategy {
    script: Mutex<VecDeque<Result<StrategyOutcome, ResolveError>>>,
    calls: AtomicUsize,
}

impl ScriptedStrategy {
    fn new(script: Vec<Result<StrategyOutcome, ResolveError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkStrategy for ScriptedStrategy {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn resolve(
        &self,
        page: &dyn PageHandle,
        _: &str,
        _: Option<&str>,
    ) -> Result<StrategyOutcome, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        page.goto("https://www.hulu.com/search?q=x").await?;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(StrategyOutcome::Retry))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn test_settings(dir: &TempDir) -> Settings {
    let mut settings = Settings {
        rate_limit_seconds: 0.0,
        max_retries: 3,
        cache_path: dir.path().join("agent_links.json"),
        screenshot_dir: dir.path().join("screenshots"),
        ..Settings::default()
    };
    settings.backoff.base_delay = 0.0;
    settings.backoff.max_delay = 0.0;
    settings
}

fn builtin_registry() -> PlatformRegistry {
    PlatformRegistry::builtin(SearchSettings::immediate())
}

fn registry_with(service: StreamingService, strategy: Arc<ScriptedStrategy>) -> PlatformRegistry {
    let mut registry = builtin_registry();
    registry.register(service, strategy);
    registry
}

async fn build_resolver(
    settings: &Settings,
    registry: PlatformRegistry,
    launcher: FakeLauncher,
) -> LinkResolver {
    LinkResolver::with_components(settings, registry, Arc::new(launcher)).await
}

fn transient() -> ResolveError {
    ResolveError::Navigation(BrowserError::NavigationTimeout {
        url: "https://www.hulu.com/search?q=x".to_string(),
        timeout: Duration::from_secs(30),
    })
}

fn artifact_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_end_to_end_netflix_then_cached() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let log = Arc::new(BrowserLog::default());
    let second_selector = netflix_descriptor().selectors[1];
    let launcher = FakeLauncher::new(&log).with_results(second_selector, vec!["/title/123"]);

    let mut resolver = build_resolver(&settings, builtin_registry(), launcher).await;

    let first = resolver.resolve("42", "Some Title", Some("2024"), "Netflix").await;
    assert_eq!(first.service, "Netflix");
    assert_eq!(first.link.as_deref(), Some("https://www.netflix.com/title/123"));
    assert!(!first.cached);
    assert_eq!(first.selector_used.as_deref(), Some(second_selector));
    assert_eq!(first.retry_count, Some(1));
    assert_eq!(first.last_error, None);

    let second = resolver.resolve("42", "Some Title", Some("2024"), "netflix").await;
    assert!(second.cached);
    assert_eq!(second.link, first.link);
    assert_eq!(log.launches.load(Ordering::SeqCst), 1);
    assert_eq!(log.navigations.load(Ordering::SeqCst), 1);

    resolver.close().await.unwrap();
}

#[tokio::test]
async fn test_fresh_cache_hit_touches_no_browser() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let now = Utc::now();

    let mut seed = LinkCache::load(&settings.cache_path, 7).await;
    seed.put(
        "42",
        CacheEntry::found(
            "Disney+",
            "https://www.disneyplus.com/movies/moana/abc",
            now,
            now + TimeDelta::days(3),
        ),
    );
    seed.flush().await.unwrap();

    let log = Arc::new(BrowserLog::default());
    let mut resolver = build_resolver(&settings, builtin_registry(), FakeLauncher::new(&log)).await;

    let result = resolver.resolve("42", "Moana", None, "Disney Plus").await;

    assert!(result.cached);
    assert_eq!(result.service, "Disney+");
    assert_eq!(log.launches.load(Ordering::SeqCst), 0);
    assert_eq!(resolver.session_state(), SessionState::Uninitialized);
}

#[tokio::test]
async fn test_expired_entry_is_a_miss() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let now = Utc::now();

    let mut seed = LinkCache::load(&settings.cache_path, 7).await;
    seed.put(
        "42",
        CacheEntry::found(
            "Hulu",
            "https://www.hulu.com/movie/old",
            now - TimeDelta::days(10),
            now - TimeDelta::days(3),
        ),
    );
    seed.flush().await.unwrap();

    let log = Arc::new(BrowserLog::default());
    let strategy = ScriptedStrategy::new(vec![Ok(StrategyOutcome::found(
        "https://www.hulu.com/movie/new",
        "a",
    ))]);
    let registry = registry_with(StreamingService::Hulu, Arc::clone(&strategy));
    let mut resolver = build_resolver(&settings, registry, FakeLauncher::new(&log)).await;

    let result = resolver.resolve("42", "X", None, "Hulu").await;

    assert!(!result.cached);
    assert_eq!(result.link.as_deref(), Some("https://www.hulu.com/movie/new"));
    assert_eq!(log.launches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unsupported_service_returns_immediately() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let log = Arc::new(BrowserLog::default());
    let mut resolver = build_resolver(&settings, builtin_registry(), FakeLauncher::new(&log)).await;

    let result = resolver.resolve("42", "X", None, "Crunchyroll").await;

    assert_eq!(result.service, "Crunchyroll");
    assert_eq!(result.link, None);
    assert_eq!(result.retry_count, Some(0));
    assert_eq!(result.last_error.as_deref(), Some(UNSUPPORTED_SERVICE));
    assert_eq!(log.launches.load(Ordering::SeqCst), 0);
    assert!(resolver.cache().is_empty());
}

#[tokio::test]
async fn test_fails_twice_then_succeeds() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let log = Arc::new(BrowserLog::default());
    let strategy = ScriptedStrategy::new(vec![
        Err(transient()),
        Ok(StrategyOutcome::Retry),
        Ok(StrategyOutcome::found("https://www.hulu.com/movie/x", "a.result")),
    ]);
    let registry = registry_with(StreamingService::Hulu, Arc::clone(&strategy));
    let mut resolver = build_resolver(&settings, registry, FakeLauncher::new(&log)).await;

    let result = resolver.resolve("7", "X", None, "Hulu").await;

    assert_eq!(result.link.as_deref(), Some("https://www.hulu.com/movie/x"));
    assert_eq!(result.retry_count, Some(3));
    assert_eq!(strategy.calls(), 3);
    assert_eq!(log.screenshots.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_always_retry_exhausts_and_captures_once() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let log = Arc::new(BrowserLog::default());
    let strategy = ScriptedStrategy::new(vec![]);
    let registry = registry_with(StreamingService::Hulu, Arc::clone(&strategy));
    let mut resolver = build_resolver(&settings, registry, FakeLauncher::new(&log)).await;

    let result = resolver.resolve("7", "X", None, "Hulu").await;

    assert_eq!(result.link, None);
    assert!(!result.cached);
    assert_eq!(result.retry_count, Some(3));
    assert!(result.last_error.is_some());
    assert_eq!(strategy.calls(), 3);
    assert_eq!(log.screenshots.load(Ordering::SeqCst), 1);
    assert_eq!(artifact_count(&settings.screenshot_dir), 2);

    let entry = resolver.cache().get("7").unwrap();
    assert!(!entry.success);
    assert!(entry.screenshot.as_deref().unwrap().ends_with(".png"));
    assert!(entry.html.as_deref().unwrap().ends_with(".html"));
}

#[tokio::test]
async fn test_not_found_is_not_retried_and_cached() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let log = Arc::new(BrowserLog::default());
    let strategy = ScriptedStrategy::new(vec![Ok(StrategyOutcome::NotFound(
        "no results".to_string(),
    ))]);
    let registry = registry_with(StreamingService::Hulu, Arc::clone(&strategy));
    let mut resolver = build_resolver(&settings, registry, FakeLauncher::new(&log)).await;

    let first = resolver.resolve("7", "X", None, "Hulu").await;
    assert_eq!(first.retry_count, Some(1));
    assert_eq!(first.last_error.as_deref(), Some("not found: no results"));
    assert_eq!(strategy.calls(), 1);

    let second = resolver.resolve("7", "X", None, "Hulu").await;
    assert!(second.cached);
    assert_eq!(second.link, None);
    assert_eq!(strategy.calls(), 1);
}

#[tokio::test]
async fn test_other_service_for_same_work_is_a_miss() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let log = Arc::new(BrowserLog::default());
    let hulu = ScriptedStrategy::new(vec![Ok(StrategyOutcome::found(
        "https://www.hulu.com/movie/x",
        "a",
    ))]);
    let max = ScriptedStrategy::new(vec![Ok(StrategyOutcome::found(
        "https://play.max.com/movie/x",
        "a",
    ))]);
    let mut registry = registry_with(StreamingService::Hulu, Arc::clone(&hulu));
    registry.register(StreamingService::Max, max.clone());
    let mut resolver = build_resolver(&settings, registry, FakeLauncher::new(&log)).await;

    resolver.resolve("7", "X", None, "Hulu").await;
    let result = resolver.resolve("7", "X", None, "HBO Max").await;

    assert!(!result.cached);
    assert_eq!(result.service, "Max");
    assert_eq!(max.calls(), 1);
    assert_eq!(resolver.cache().get("7").unwrap().service(), "Max");
}

#[tokio::test]
async fn test_session_start_failure_is_not_cached() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let log = Arc::new(BrowserLog::default());
    let launcher = FakeLauncher {
        fail_launch: true,
        ..FakeLauncher::new(&log)
    };
    let mut resolver = build_resolver(&settings, builtin_registry(), launcher).await;

    let result = resolver.resolve("42", "X", None, "Netflix").await;

    assert_eq!(result.retry_count, Some(0));
    assert!(
        result
            .last_error
            .as_deref()
            .unwrap()
            .contains("no chrome binary")
    );
    assert!(resolver.cache().is_empty());
    assert_eq!(resolver.session_state(), SessionState::Uninitialized);
}

#[tokio::test]
async fn test_cache_survives_close_and_reopen() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let log = Arc::new(BrowserLog::default());
    let strategy = ScriptedStrategy::new(vec![Ok(StrategyOutcome::found(
        "https://www.hulu.com/movie/x",
        "a",
    ))]);

    let mut first = build_resolver(
        &settings,
        registry_with(StreamingService::Hulu, Arc::clone(&strategy)),
        FakeLauncher::new(&log),
    )
    .await;
    first.resolve("7", "X", None, "Hulu").await;
    first.close().await.unwrap();
    first.close().await.unwrap();
    assert_eq!(log.closed_pages.load(Ordering::SeqCst), 1);

    let mut second = build_resolver(&settings, builtin_registry(), FakeLauncher::new(&log)).await;
    let result = second.resolve("7", "X", None, "Hulu").await;

    assert!(result.cached);
    assert_eq!(result.link.as_deref(), Some("https://www.hulu.com/movie/x"));
    assert_eq!(log.launches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_batch_resolves_in_order() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let log = Arc::new(BrowserLog::default());
    let strategy = ScriptedStrategy::new(vec![
        Ok(StrategyOutcome::found("https://www.hulu.com/movie/a", "a")),
        Ok(StrategyOutcome::NotFound("no results".to_string())),
    ]);
    let registry = registry_with(StreamingService::Hulu, Arc::clone(&strategy));
    let mut resolver = build_resolver(&settings, registry, FakeLauncher::new(&log)).await;

    let requests: Vec<ResolutionRequest> = serde_json::from_str(
        r#"[
            {"work_id": "1", "title": "A", "service": "Hulu"},
            {"workID": "2", "title": "B", "year": "2024", "service_name": "hulu"},
            {"work_id": "3", "title": "C", "service": "Tubi"}
        ]"#,
    )
    .unwrap();

    let results = resolver.resolve_batch(&requests).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_found());
    assert!(!results[1].is_found());
    assert_eq!(results[2].last_error.as_deref(), Some(UNSUPPORTED_SERVICE));
    assert_eq!(log.launches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_close_reports_flush_failure() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    // A directory where the cache file should be makes the rename fail.
    std::fs::create_dir_all(&settings.cache_path).unwrap();

    let log = Arc::new(BrowserLog::default());
    let strategy = ScriptedStrategy::new(vec![Ok(StrategyOutcome::found(
        "https://www.hulu.com/movie/x",
        "a",
    ))]);
    let registry = registry_with(StreamingService::Hulu, Arc::clone(&strategy));
    let mut resolver = build_resolver(&settings, registry, FakeLauncher::new(&log)).await;

    resolver.resolve("7", "X", None, "Hulu").await;
    let err = resolver.close().await.unwrap_err();

    assert!(matches!(err, StoreError::Io(_)));
    assert_eq!(log.closed_pages.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_transient_error_stops_after_one_attempt() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let log = Arc::new(BrowserLog::default());
    let strategy = ScriptedStrategy::new(vec![Err(ResolveError::Io(std::io::Error::other(
        "disk full",
    )))]);
    let registry = registry_with(StreamingService::Hulu, Arc::clone(&strategy));
    let mut resolver = build_resolver(&settings, registry, FakeLauncher::new(&log)).await;

    let result = resolver.resolve("7", "X", None, "Hulu").await;

    assert_eq!(result.link, None);
    assert_eq!(result.retry_count, Some(1));
    assert!(result.last_error.as_deref().unwrap().contains("disk full"));
    assert_eq!(strategy.calls(), 1);
    assert_eq!(log.screenshots.load(Ordering::SeqCst), 1);
    assert!(!resolver.cache().get("7").unwrap().success);
}

#[tokio::test]
async fn test_startup_prunes_old_diagnostics() {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    std::fs::create_dir_all(&settings.screenshot_dir).unwrap();

    let old_png = settings.screenshot_dir.join("1_hulu_20240101_000000.png");
    let old_html = settings.screenshot_dir.join("1_hulu_20240101_000000.html");
    let recent = settings.screenshot_dir.join("2_hulu_20240501_000000.png");
    let day = Duration::from_secs(24 * 60 * 60);
    for (path, age) in [(&old_png, day * 10), (&old_html, day * 10), (&recent, day)] {
        std::fs::write(path, b"x").unwrap();
        std::fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(std::time::SystemTime::now() - age)
            .unwrap();
    }

    let log = Arc::new(BrowserLog::default());
    let _resolver = build_resolver(&settings, builtin_registry(), FakeLauncher::new(&log)).await;

    assert!(!old_png.exists());
    assert!(!old_html.exists());
    assert!(recent.exists());
    assert_eq!(log.launches.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_navigations_are_spaced_by_rate_limit() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        rate_limit_seconds: 5.0,
        ..test_settings(&dir)
    };
    let rate_limit = settings.rate_limit();
    let log = Arc::new(BrowserLog::default());
    let strategy = ScriptedStrategy::new(vec![
        Err(transient()),
        Ok(StrategyOutcome::found("https://www.hulu.com/movie/a", "a")),
        Ok(StrategyOutcome::found("https://www.hulu.com/movie/b", "a")),
    ]);
    let registry = registry_with(StreamingService::Hulu, Arc::clone(&strategy));
    let mut resolver = build_resolver(&settings, registry, FakeLauncher::new(&log)).await;

    let start = tokio::time::Instant::now();
    let first = resolver.resolve("1", "A", None, "Hulu").await;
    let after_first = start.elapsed();
    let second = resolver.resolve("2", "B", None, "Hulu").await;
    let elapsed = start.elapsed();

    assert!(first.is_found());
    assert!(second.is_found());
    assert_eq!(log.navigations.load(Ordering::SeqCst), 3);
    // Retry within one resolution, then the next resolution.
    assert!(after_first >= rate_limit, "retry not spaced: {after_first:?}");
    assert!(elapsed >= rate_limit * 2, "resolutions not spaced: {elapsed:?}");
}
