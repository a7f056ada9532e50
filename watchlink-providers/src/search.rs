//! Generic search-page strategy.
//!
//! Every built-in platform is resolved the same way: open its search page,
//! let client-side rendering settle, then walk the descriptor's selector
//! candidates looking for a result link that points at a watch page.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};
use watchlink_fetch::{LinkMatch, LinkStrategy, PageHandle, ResolveError, StrategyOutcome};

use crate::descriptor::PlatformDescriptor;

/// Result links inspected per selector.
pub const MAX_HREFS_PER_SELECTOR: usize = 3;

// ============================================================================
// Settings
// ============================================================================

/// Timing knobs shared by all search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// Pause after navigation before querying the DOM.
    pub settle: Duration,
    /// Upper bound on waiting for each selector candidate.
    pub selector_timeout: Duration,
}

impl SearchSettings {
    /// Settings with no settle pause and a short selector wait.
    pub fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            selector_timeout: Duration::from_millis(100),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(3),
            selector_timeout: Duration::from_secs(5),
        }
    }
}

// ============================================================================
// Candidate Results
// ============================================================================

/// What one selector candidate produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateResult {
    /// An acceptable watch-page link.
    Matched(LinkMatch),
    /// The selector never appeared before its timeout.
    Absent {
        /// Selector tried.
        selector: String,
    },
    /// The selector matched but none of its links were watch pages.
    Rejected {
        /// Selector tried.
        selector: String,
        /// Links inspected.
        inspected: usize,
    },
}

impl fmt::Display for CandidateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched(m) => write!(f, "{} -> {}", m.selector, m.link),
            Self::Absent { selector } => write!(f, "{selector}: not present"),
            Self::Rejected {
                selector,
                inspected,
            } => write!(f, "{selector}: {inspected} link(s) rejected"),
        }
    }
}

/// Decides the outcome from every candidate tried.
///
/// The first match wins; otherwise the summary of all candidates becomes
/// the not-found reason.
pub fn decide(title: &str, results: Vec<CandidateResult>) -> StrategyOutcome {
    let mut summary = Vec::with_capacity(results.len());

    for result in results {
        if let CandidateResult::Matched(found) = result {
            return StrategyOutcome::Found(found);
        }
        summary.push(result.to_string());
    }

    if summary.is_empty() {
        return StrategyOutcome::NotFound(format!("no selectors configured for '{title}'"));
    }
    StrategyOutcome::NotFound(format!(
        "no watch link for '{title}' ({})",
        summary.join("; ")
    ))
}

// ============================================================================
// Search Strategy
// ============================================================================

/// Resolves a title through a platform's search page.
#[derive(Debug, Clone)]
pub struct SearchStrategy {
    descriptor: PlatformDescriptor,
    settings: SearchSettings,
}

impl SearchStrategy {
    /// Creates a strategy for the given platform.
    pub fn new(descriptor: PlatformDescriptor, settings: SearchSettings) -> Self {
        Self {
            descriptor,
            settings,
        }
    }

    /// Returns the platform descriptor.
    pub fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    async fn try_candidate(
        &self,
        page: &dyn PageHandle,
        selector: &str,
    ) -> Result<CandidateResult, ResolveError> {
        if !page
            .wait_for_selector(selector, self.settings.selector_timeout)
            .await?
        {
            debug!(selector, "Selector not present");
            return Ok(CandidateResult::Absent {
                selector: selector.to_string(),
            });
        }

        let hrefs = page.hrefs(selector, MAX_HREFS_PER_SELECTOR).await?;
        for href in &hrefs {
            if let Some(link) = self.descriptor.accept_href(href) {
                debug!(selector, link = %link, "Accepted result link");
                return Ok(CandidateResult::Matched(LinkMatch::new(link, selector)));
            }
            debug!(selector, href = %href, "Rejected result link");
        }

        Ok(CandidateResult::Rejected {
            selector: selector.to_string(),
            inspected: hrefs.len(),
        })
    }
}

#[async_trait]
impl LinkStrategy for SearchStrategy {
    fn id(&self) -> &str {
        self.descriptor.strategy_id
    }

    #[instrument(skip(self, page), fields(platform = self.descriptor.display_name()))]
    async fn resolve(
        &self,
        page: &dyn PageHandle,
        title: &str,
        _year: Option<&str>,
    ) -> Result<StrategyOutcome, ResolveError> {
        let url = self.descriptor.search_url(title);
        debug!(url = %url, "Opening search page");
        page.goto(&url).await?;

        if !self.settings.settle.is_zero() {
            tokio::time::sleep(self.settings.settle).await;
        }

        let mut results = Vec::with_capacity(self.descriptor.selectors.len());
        for selector in self.descriptor.selectors {
            let result = self.try_candidate(page, selector).await?;
            let matched = matches!(result, CandidateResult::Matched(_));
            results.push(result);
            if matched {
                break;
            }
        }

        Ok(decide(title, results))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::{hulu_descriptor, netflix_descriptor};
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;
    use watchlink_fetch::BrowserError;

    #[derive(Default)]
    struct ScriptedPage {
        results: HashMap<&'static str, Vec<&'static str>>,
        fail_goto: bool,
        visited: Mutex<Vec<String>>,
        waited: Mutex<Vec<String>>,
    }

    impl ScriptedPage {
        fn with(mut self, selector: &'static str, hrefs: Vec<&'static str>) -> Self {
            self.results.insert(selector, hrefs);
            self
        }
    }

    #[async_trait]
    impl PageHandle for ScriptedPage {
        async fn goto(&self, url: &str) -> Result<(), BrowserError> {
            if self.fail_goto {
                return Err(BrowserError::NavigationTimeout {
                    url: url.to_string(),
                    timeout: Duration::from_secs(30),
                });
            }
            self.visited.lock().unwrap().push(url.to_string());
            Ok(())
        }

        async fn wait_for_selector(&self, selector: &str, _: Duration) -> Result<bool, BrowserError> {
            self.waited.lock().unwrap().push(selector.to_string());
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
            Ok(String::new())
        }

        async fn screenshot(&self, _: &Path) -> Result<(), BrowserError> {
            Ok(())
        }

        async fn close(&self) -> Result<(), BrowserError> {
            Ok(())
        }
    }

    fn netflix() -> SearchStrategy {
        SearchStrategy::new(netflix_descriptor(), SearchSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_selector_matches() {
        let page = ScriptedPage::default().with("a[href*='/title/']", vec!["/title/123"]);

        let outcome = netflix().resolve(&page, "Some Title", Some("2024")).await.unwrap();

        assert_eq!(
            outcome,
            StrategyOutcome::found("https://www.netflix.com/title/123", "a[href*='/title/']")
        );
        assert_eq!(
            page.visited.lock().unwrap().as_slice(),
            ["https://www.netflix.com/search?q=Some+Title"]
        );
        assert_eq!(page.waited.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skips_rejected_links_within_limit() {
        let page = ScriptedPage::default().with(
            ".title-card a",
            vec!["/browse", "/browse/genre/1", "/browse/my-list", "/title/4"],
        );

        let outcome = netflix().resolve(&page, "X", None).await.unwrap();

        // Only the first three links are inspected.
        let StrategyOutcome::NotFound(reason) = outcome else {
            panic!("expected NotFound, got {outcome:?}");
        };
        assert!(reason.contains(".title-card a: 3 link(s) rejected"));
        assert!(reason.contains(".slider-item a: not present"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_present_is_not_found() {
        let page = ScriptedPage::default();
        let strategy = SearchStrategy::new(hulu_descriptor(), SearchSettings::immediate());

        let outcome = strategy.resolve(&page, "Nope", None).await.unwrap();

        assert!(matches!(outcome, StrategyOutcome::NotFound(_)));
        assert_eq!(page.waited.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_error_propagates() {
        let page = ScriptedPage {
            fail_goto: true,
            ..ScriptedPage::default()
        };

        let err = netflix().resolve(&page, "X", None).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_period_elapses() {
        let page = ScriptedPage::default().with(".title-card a", vec!["/title/1"]);
        let start = tokio::time::Instant::now();

        netflix().resolve(&page, "X", None).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[test]
    fn test_decide_prefers_first_match() {
        let outcome = decide(
            "X",
            vec![
                CandidateResult::Absent {
                    selector: "a".to_string(),
                },
                CandidateResult::Matched(LinkMatch::new("https://h/1", "b")),
            ],
        );
        assert_eq!(outcome, StrategyOutcome::found("https://h/1", "b"));
    }
}
