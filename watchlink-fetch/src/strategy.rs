//! Link strategy trait and outcome types.
//!
//! A strategy knows how to find a title's watch page on one platform.
//! It is handed a ready page and reports one of three outcomes, so "try
//! again" and "definitely not there" can never be confused.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::host::browser::PageHandle;

// ============================================================================
// Link Match
// ============================================================================

/// A deep link found by a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMatch {
    /// Absolute URL of the watch page.
    pub link: String,
    /// CSS selector whose match produced the link.
    pub selector: String,
}

impl LinkMatch {
    /// Creates a new match.
    pub fn new(link: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            selector: selector.into(),
        }
    }
}

// ============================================================================
// Strategy Outcome
// ============================================================================

/// Result of one strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// The page was not in a usable state; ask for another attempt.
    Retry,
    /// The platform has no matching title. Not retried.
    NotFound(String),
    /// A deep link was found.
    Found(LinkMatch),
}

impl StrategyOutcome {
    /// Shorthand for a found link.
    pub fn found(link: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::Found(LinkMatch::new(link, selector))
    }
}

// ============================================================================
// Link Strategy Trait
// ============================================================================

/// A platform-specific way of finding a title's deep link.
///
/// ## Implementing a Strategy
///
/// ```ignore
/// struct NetflixStrategy;
///
/// #[async_trait]
/// impl LinkStrategy for NetflixStrategy {
///     fn id(&self) -> &str {
///         "netflix.search"
///     }
///
///     async fn resolve(
///         &self,
///         page: &dyn PageHandle,
///         title: &str,
///         _year: Option<&str>,
///     ) -> Result<StrategyOutcome, ResolveError> {
///         page.goto(&search_url(title)).await?;
///         // Inspect the results and return Found / NotFound / Retry
///     }
/// }
/// ```
///
/// Errors returned from `resolve` are treated as transient and retried.
#[async_trait]
pub trait LinkStrategy: Send + Sync {
    /// Unique identifier (e.g. `"netflix.search"`).
    fn id(&self) -> &str;

    /// Attempts to find the deep link for `title` on the given page.
    async fn resolve(
        &self,
        page: &dyn PageHandle,
        title: &str,
        year: Option<&str>,
    ) -> Result<StrategyOutcome, ResolveError>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_shorthand() {
        let outcome = StrategyOutcome::found("https://www.hulu.com/movie/x", "a");
        assert_eq!(
            outcome,
            StrategyOutcome::Found(LinkMatch::new("https://www.hulu.com/movie/x", "a"))
        );
    }
}
