//! Persisted cache entry format.
//!
//! The on-disk shape is shared with the feed pipeline, so field names
//! follow the published JSON rather than Rust conventions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `source` value written for entries produced by the resolver.
pub const AGENT_SOURCE: &str = "agent";

// ============================================================================
// Streaming Link
// ============================================================================

/// The `{service, link}` pair stored in a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingLink {
    /// Canonical service display name.
    pub service: String,
    /// Deep link, absent for negative results.
    pub link: Option<String>,
}

// ============================================================================
// Cache Entry
// ============================================================================

/// One resolution record, keyed by work id in the cache file.
///
/// Only the latest service's result is kept per work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Service and link.
    pub streaming: StreamingLink,
    /// When the resolution ran. Missing on some legacy entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<DateTime<Utc>>,
    /// When this entry stops being served. Missing on legacy entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Producer of the entry.
    #[serde(default = "default_source")]
    pub source: String,
    /// Whether a link was found.
    #[serde(default)]
    pub success: bool,
    /// Attempts used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    /// Error text of the last failed attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Selector that produced the link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector_used: Option<String>,
    /// Path of the failure screenshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    /// Path of the failure DOM snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

fn default_source() -> String {
    AGENT_SOURCE.to_string()
}

impl CacheEntry {
    /// Creates a positive entry.
    pub fn found(
        service: impl Into<String>,
        link: impl Into<String>,
        scraped_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            streaming: StreamingLink {
                service: service.into(),
                link: Some(link.into()),
            },
            scraped_at: Some(scraped_at),
            expires_at: Some(expires_at),
            source: default_source(),
            success: true,
            retry_count: None,
            last_error: None,
            selector_used: None,
            screenshot: None,
            html: None,
        }
    }

    /// Creates a negative entry carrying the failure reason.
    pub fn not_found(
        service: impl Into<String>,
        error: impl Into<String>,
        scraped_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            streaming: StreamingLink {
                service: service.into(),
                link: None,
            },
            scraped_at: Some(scraped_at),
            expires_at: Some(expires_at),
            source: default_source(),
            success: false,
            retry_count: None,
            last_error: Some(error.into()),
            selector_used: None,
            screenshot: None,
            html: None,
        }
    }

    /// Sets the attempt count.
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }

    /// Sets the selector that produced the link.
    pub fn with_selector(mut self, selector: Option<String>) -> Self {
        self.selector_used = selector;
        self
    }

    /// Records diagnostic artifact paths.
    pub fn with_diagnostics(mut self, screenshot: Option<String>, html: Option<String>) -> Self {
        self.screenshot = screenshot;
        self.html = html;
        self
    }

    /// Returns the service stored in this entry.
    pub fn service(&self) -> &str {
        &self.streaming.service
    }
}
