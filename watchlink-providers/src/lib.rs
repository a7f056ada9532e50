// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # WatchLink Providers
//!
//! Streaming platform definitions for WatchLink.
//!
//! Each platform is a [`PlatformDescriptor`]: a search endpoint, an ordered
//! list of result-link selectors and the path patterns that identify a
//! watch page. The generic [`SearchStrategy`] turns any descriptor into a
//! [`LinkStrategy`](watchlink_fetch::LinkStrategy), so adding a platform
//! means adding a descriptor.
//!
//! ## Usage
//!
//! ```ignore
//! use watchlink_providers::{PlatformRegistry, SearchSettings};
//!
//! let registry = PlatformRegistry::builtin(SearchSettings::default());
//! let (service, strategy) = registry.lookup("Disney Plus").unwrap();
//! let outcome = strategy.resolve(page, "Moana", Some("2016")).await?;
//! ```

pub mod descriptor;
pub mod platforms;
pub mod registry;
pub mod search;

pub use descriptor::{PlatformDescriptor, QUERY_PLACEHOLDER};
pub use registry::PlatformRegistry;
pub use search::{CandidateResult, MAX_HREFS_PER_SELECTOR, SearchSettings, SearchStrategy};
