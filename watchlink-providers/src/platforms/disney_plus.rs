//! Disney+ platform descriptor.

use watchlink_core::StreamingService;

use crate::descriptor::PlatformDescriptor;

/// Creates the Disney+ descriptor.
pub fn disney_plus_descriptor() -> PlatformDescriptor {
    PlatformDescriptor {
        service: StreamingService::DisneyPlus,
        search_template: "https://www.disneyplus.com/search?q={query}",
        origin: "https://www.disneyplus.com",
        selectors: &["a[data-testid='set-item']", "a[href*='/movies/']", "a[href*='/series/']"],
        link_patterns: &["/movies/", "/series/", "/video/", "/browse/entity-"],
        strategy_id: "disney_plus.search",
    }
}
