//! Domain models for `WatchLink`.
//!
//! ## Submodules
//!
//! - [`service`] - Streaming platforms and their aliases
//! - [`resolution`] - Requests and results of a link resolution
//! - [`cache`] - The persisted cache entry format

mod cache;
mod resolution;
mod service;

pub use cache::{CacheEntry, StreamingLink, AGENT_SOURCE};
pub use resolution::{LinkResolution, ResolutionRequest, UNSUPPORTED_SERVICE};
pub use service::StreamingService;

#[cfg(test)]
mod serde_tests;
