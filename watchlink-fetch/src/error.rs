//! Resolution error types.

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Resolve Error
// ============================================================================

/// Error type for link resolution.
///
/// "Not found" is deliberately absent: a definitive miss is a
/// [`StrategyOutcome::NotFound`](crate::StrategyOutcome::NotFound), not a failure.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No strategy is registered for the service.
    #[error("Unsupported service: {0}")]
    UnsupportedService(String),

    /// Navigation or selector wait failed. Retried with backoff.
    #[error("Navigation failed: {0}")]
    Navigation(#[from] BrowserError),

    /// The browser could not be started.
    #[error("Browser session failed to start: {0}")]
    SessionInit(#[source] BrowserError),

    /// Diagnostics capture failed.
    #[error("Diagnostics capture failed: {0}")]
    Diagnostics(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    /// Returns true if another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ResolveError::Navigation(_))
    }
}

// ============================================================================
// Browser Error
// ============================================================================

/// Error type for browser and page operations.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Browser process or connection could not be started.
    #[error("Launch failed: {0}")]
    Launch(String),

    /// Browser context or page could not be created.
    #[error("Page creation failed: {0}")]
    PageCreation(String),

    /// Navigating to a URL failed.
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target URL.
        url: String,
        /// Driver error text.
        message: String,
    },

    /// Navigation did not finish in time.
    #[error("Navigation to {url} timed out after {timeout:?}")]
    NavigationTimeout {
        /// Target URL.
        url: String,
        /// Configured timeout.
        timeout: Duration,
    },

    /// Querying the DOM failed (not the same as "no match").
    #[error("Selector query {selector:?} failed: {message}")]
    Query {
        /// The CSS selector.
        selector: String,
        /// Driver error text.
        message: String,
    },

    /// Screenshot or content capture failed.
    #[error("Capture failed: {0}")]
    Capture(String),

    /// Closing a resource failed.
    #[error("Close failed: {0}")]
    Close(String),

    /// Operation requires a ready session.
    #[error("Browser session not initialized")]
    NotReady,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_errors_are_transient() {
        let err = ResolveError::from(BrowserError::NavigationTimeout {
            url: "https://www.netflix.com/search?q=x".to_string(),
            timeout: Duration::from_secs(30),
        });
        assert!(err.is_transient());
    }

    #[test]
    fn test_other_errors_are_not_transient() {
        assert!(!ResolveError::UnsupportedService("Tubi".to_string()).is_transient());
        assert!(!ResolveError::SessionInit(BrowserError::Launch("no chrome".to_string())).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = BrowserError::Query {
            selector: "a.title".to_string(),
            message: "detached".to_string(),
        };
        assert_eq!(err.to_string(), "Selector query \"a.title\" failed: detached");
    }
}
