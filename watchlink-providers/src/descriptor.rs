//! Platform descriptor system.
//!
//! A descriptor holds everything the generic search strategy needs to know
//! about one streaming platform:
//! - Search endpoint template and site origin
//! - Ordered CSS selector candidates for result links
//! - Path patterns a result link must contain to count as a watch page

use url::{Url, form_urlencoded};
use watchlink_core::StreamingService;

/// Placeholder in a search template replaced by the encoded title.
pub const QUERY_PLACEHOLDER: &str = "{query}";

// ============================================================================
// Platform Descriptor
// ============================================================================

/// Static configuration for one streaming platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDescriptor {
    /// Platform identifier.
    pub service: StreamingService,
    /// Search URL containing [`QUERY_PLACEHOLDER`].
    pub search_template: &'static str,
    /// Site origin used to resolve relative links.
    pub origin: &'static str,
    /// Result-link selectors, most specific first.
    pub selectors: &'static [&'static str],
    /// Path fragments that mark a watch/detail page.
    pub link_patterns: &'static [&'static str],
    /// Identifier of the strategy built from this descriptor.
    pub strategy_id: &'static str,
}

impl PlatformDescriptor {
    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        self.service.display_name()
    }

    /// Builds the search URL for `title`, form-encoding it.
    pub fn search_url(&self, title: &str) -> String {
        let query: String = form_urlencoded::byte_serialize(title.trim().as_bytes()).collect();
        self.search_template.replace(QUERY_PLACEHOLDER, &query)
    }

    /// Resolves `href` against the origin and returns it if it is a watch page.
    ///
    /// The link must stay on the origin's host, use http(s), and contain one
    /// of the platform's link patterns in its path.
    pub fn accept_href(&self, href: &str) -> Option<String> {
        let origin = Url::parse(self.origin).ok()?;
        let url = origin.join(href.trim()).ok()?;

        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        if url.host_str() != origin.host_str() {
            return None;
        }
        if !self.link_patterns.iter().any(|p| url.path().contains(p)) {
            return None;
        }

        Some(url.into())
    }
}

// ============================================================================
// Tests
// ============================================================================
