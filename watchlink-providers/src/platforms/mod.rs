//! Built-in streaming platforms.
//!
//! | Platform | Search endpoint | Watch-page paths |
//! |----------|-----------------|------------------|
//! | Netflix | `netflix.com/search` | `/title/`, `/watch/` |
//! | Disney+ | `disneyplus.com/search` | `/movies/`, `/series/`, `/video/` |
//! | Prime Video | `amazon.com/s` | `/gp/video/detail/`, `/dp/` |
//! | Max | `play.max.com/search` | `/movie/`, `/show/` |
//! | Hulu | `hulu.com/search` | `/movie/`, `/series/`, `/watch/` |
//! | Apple TV+ | `tv.apple.com/search` | `/movie/`, `/show/` |
//! | Paramount+ | `paramountplus.com/search` | `/movies/`, `/shows/` |
//! | Peacock | `peacocktv.com/search` | `/watch/asset/`, `/watch/` |

mod apple_tv_plus;
mod disney_plus;
mod hulu;
mod max;
mod netflix;
mod paramount_plus;
mod peacock;
mod prime_video;

pub use apple_tv_plus::apple_tv_plus_descriptor;
pub use disney_plus::disney_plus_descriptor;
pub use hulu::hulu_descriptor;
pub use max::max_descriptor;
pub use netflix::netflix_descriptor;
pub use paramount_plus::paramount_plus_descriptor;
pub use peacock::peacock_descriptor;
pub use prime_video::prime_video_descriptor;
