//! Peacock platform descriptor.

use watchlink_core::StreamingService;

use crate::descriptor::PlatformDescriptor;

/// Creates the Peacock descriptor.
pub fn peacock_descriptor() -> PlatformDescriptor {
    PlatformDescriptor {
        service: StreamingService::Peacock,
        search_template: "https://www.peacocktv.com/search?q={query}",
        origin: "https://www.peacocktv.com",
        selectors: &[
            "[data-testid='search-result'] a",
            "a[href*='/watch/asset/']",
            "a[href*='/watch/']",
        ],
        link_patterns: &["/watch/asset/", "/watch/"],
        strategy_id: "peacock.search",
    }
}
