//! Resolution request and result types.

use serde::{Deserialize, Serialize};

use super::cache::CacheEntry;
use crate::error::CoreError;

/// Error text reported for services with no registered strategy.
pub const UNSUPPORTED_SERVICE: &str = "unsupported service";

// ============================================================================
// Resolution Request
// ============================================================================

/// A request to find the watch-page link for one title on one service.
///
/// Supplied by the upstream metadata pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    /// Upstream work identifier (e.g. a TMDB id). Also the cache key.
    #[serde(alias = "workID", alias = "movie_id")]
    pub work_id: String,
    /// Title to search for.
    pub title: String,
    /// Release year, if known.
    #[serde(default)]
    pub year: Option<String>,
    /// Claimed streaming service, by display name or alias.
    #[serde(alias = "service")]
    pub service_name: String,
}

impl ResolutionRequest {
    /// Creates a new request.
    pub fn new(
        work_id: impl Into<String>,
        title: impl Into<String>,
        year: Option<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            work_id: work_id.into(),
            title: title.into(),
            year,
            service_name: service_name.into(),
        }
    }

    /// Rejects requests with a blank work id, title or service name.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("work_id", &self.work_id),
            ("title", &self.title),
            ("service_name", &self.service_name),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidRequest(format!("{field} is empty")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Link Resolution
// ============================================================================

/// The uniform result of a resolution, returned to every caller.
///
/// A missing `link` means "no link to show"; `last_error` says why.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkResolution {
    /// Service name (canonical if recognized, as requested otherwise).
    pub service: String,
    /// Deep link to the title's watch page.
    pub link: Option<String>,
    /// Whether the result came from the cache.
    pub cached: bool,
    /// Number of attempts made by the resolution that produced this result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    /// Error text from the last failed attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// CSS selector that yielded the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector_used: Option<String>,
}

impl LinkResolution {
    /// Result for a service with no registered strategy.
    pub fn unsupported(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            link: None,
            cached: false,
            retry_count: Some(0),
            last_error: Some(UNSUPPORTED_SERVICE.to_string()),
            selector_used: None,
        }
    }

    /// Failure result that never reached a strategy.
    pub fn failed(service: impl Into<String>, error: impl Into<String>, retry_count: u32) -> Self {
        Self {
            service: service.into(),
            link: None,
            cached: false,
            retry_count: Some(retry_count),
            last_error: Some(error.into()),
            selector_used: None,
        }
    }

    /// Builds a result from a cache entry.
    pub fn from_entry(entry: &CacheEntry, cached: bool) -> Self {
        Self {
            service: entry.streaming.service.clone(),
            link: entry.streaming.link.clone(),
            cached,
            retry_count: entry.retry_count,
            last_error: entry.last_error.clone(),
            selector_used: entry.selector_used.clone(),
        }
    }

    /// Returns true if a link was resolved.
    pub fn is_found(&self) -> bool {
        self.link.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
