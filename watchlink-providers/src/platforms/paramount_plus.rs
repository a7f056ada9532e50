//! Paramount+ platform descriptor.

use watchlink_core::StreamingService;

use crate::descriptor::PlatformDescriptor;

/// Creates the Paramount+ descriptor.
pub fn paramount_plus_descriptor() -> PlatformDescriptor {
    PlatformDescriptor {
        service: StreamingService::ParamountPlus,
        search_template: "https://www.paramountplus.com/search/?q={query}",
        origin: "https://www.paramountplus.com",
        selectors: &[".search-results a", "a[href*='/movies/']", "a[href*='/shows/']"],
        link_patterns: &["/movies/", "/shows/"],
        strategy_id: "paramount_plus.search",
    }
}
