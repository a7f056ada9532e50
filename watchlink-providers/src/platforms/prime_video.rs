//! Prime Video platform descriptor.
//!
//! Searches amazon.com restricted to the video department. Detail pages
//! live under `/gp/video/detail/` or the generic `/dp/` product path.

use watchlink_core::StreamingService;

use crate::descriptor::PlatformDescriptor;

/// Creates the Prime Video descriptor.
pub fn prime_video_descriptor() -> PlatformDescriptor {
    PlatformDescriptor {
        service: StreamingService::PrimeVideo,
        search_template: "https://www.amazon.com/s?k={query}&i=instant-video",
        origin: "https://www.amazon.com",
        selectors: &[
            "a[href*='/gp/video/detail/']",
            "[data-component-type='s-search-result'] h2 a",
            "a[href*='/dp/']",
        ],
        link_patterns: &["/gp/video/detail/", "/dp/"],
        strategy_id: "prime_video.search",
    }
}
