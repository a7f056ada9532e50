//! Hulu platform descriptor.

use watchlink_core::StreamingService;

use crate::descriptor::PlatformDescriptor;

/// Creates the Hulu descriptor.
pub fn hulu_descriptor() -> PlatformDescriptor {
    PlatformDescriptor {
        service: StreamingService::Hulu,
        search_template: "https://www.hulu.com/search?q={query}",
        origin: "https://www.hulu.com",
        selectors: &[
            "[data-automationid='search-result'] a",
            "a[href*='/movie/']",
            "a[href*='/series/']",
        ],
        link_patterns: &["/movie/", "/series/", "/watch/"],
        strategy_id: "hulu.search",
    }
}
