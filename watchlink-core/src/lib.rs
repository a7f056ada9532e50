// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `WatchLink` Core
//!
//! Core types and models shared by every `WatchLink` crate.
//!
//! ## Key Types
//!
//! ### Services
//! - [`StreamingService`] - Enum of supported streaming platforms, with aliases
//!
//! ### Resolution
//! - [`ResolutionRequest`] - A `(work, title, year, service)` lookup request
//! - [`LinkResolution`] - The uniform result handed back to every caller
//!
//! ### Cache
//! - [`CacheEntry`] - Persisted per-work resolution record
//! - [`StreamingLink`] - The `{service, link}` pair inside an entry

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    CacheEntry, LinkResolution, ResolutionRequest, StreamingLink, StreamingService,
    AGENT_SOURCE, UNSUPPORTED_SERVICE,
};
