//! Max platform descriptor.
//!
//! Formerly HBO Max; the web player serves everything from `play.max.com`.

use watchlink_core::StreamingService;

use crate::descriptor::PlatformDescriptor;

/// Creates the Max descriptor.
pub fn max_descriptor() -> PlatformDescriptor {
    PlatformDescriptor {
        service: StreamingService::Max,
        search_template: "https://play.max.com/search?q={query}",
        origin: "https://play.max.com",
        selectors: &["[data-testid='search-result'] a", "a[href*='/movie/']", "a[href*='/show/']"],
        link_patterns: &["/movie/", "/show/", "/video/watch/"],
        strategy_id: "max.search",
    }
}
