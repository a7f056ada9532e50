// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # WatchLink Resolver
//!
//! The public entry point for finding streaming deep links.
//!
//! [`LinkResolver`] owns the link cache, the browser session, the rate
//! limiter, the diagnostics capturer and the platform registry. Each call
//! to [`LinkResolver::resolve`] goes:
//!
//! 1. registry lookup (unsupported services return immediately)
//! 2. cache lookup (fresh entry for the same service is returned as-is)
//! 3. browser session start, then the platform strategy under retry,
//!    rate-limited before every attempt
//! 4. positive or negative cache write, with diagnostics on failure
//!
//! ## Usage
//!
//! ```ignore
//! use watchlink_resolver::LinkResolver;
//! use watchlink_store::Settings;
//!
//! let settings = Settings::load_default().await?;
//! let mut resolver = LinkResolver::new(&settings).await;
//!
//! let result = resolver.resolve("42", "Some Title", Some("2024"), "Netflix").await;
//! println!("{:?}", result.link);
//!
//! resolver.close().await?;
//! ```

mod resolver;

pub use resolver::LinkResolver;

#[cfg(test)]
mod resolver_tests;
