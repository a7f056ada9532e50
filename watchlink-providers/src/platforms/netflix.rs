//! Netflix platform descriptor.
//!
//! Search results render as title cards whose anchors point at
//! `/title/{id}`; logged-out sessions land on `/watch/{id}` instead.

use watchlink_core::StreamingService;

use crate::descriptor::PlatformDescriptor;

/// Creates the Netflix descriptor.
pub fn netflix_descriptor() -> PlatformDescriptor {
    PlatformDescriptor {
        service: StreamingService::Netflix,
        search_template: "https://www.netflix.com/search?q={query}",
        origin: "https://www.netflix.com",
        selectors: &[".title-card a", "a[href*='/title/']", ".slider-item a"],
        link_patterns: &["/title/", "/watch/"],
        strategy_id: "netflix.search",
    }
}
