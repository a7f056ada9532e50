//! Output formatting for CLI.

mod json;
mod text;

pub use json::{CacheEntryOutput, JsonFormatter, PruneOutput, ResolutionOutput};
pub use text::TextFormatter;
