//! CLI command implementations.

pub mod batch;
pub mod cache;
pub mod prune;
pub mod resolve;
pub mod services;
