//! Apple TV+ platform descriptor.

use watchlink_core::StreamingService;

use crate::descriptor::PlatformDescriptor;

/// Creates the Apple TV+ descriptor.
pub fn apple_tv_plus_descriptor() -> PlatformDescriptor {
    PlatformDescriptor {
        service: StreamingService::AppleTvPlus,
        search_template: "https://tv.apple.com/search?term={query}",
        origin: "https://tv.apple.com",
        selectors: &[".search-results a", "a[href*='/movie/']", "a[href*='/show/']"],
        link_patterns: &["/movie/", "/show/"],
        strategy_id: "apple_tv_plus.search",
    }
}
