// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # WatchLink Fetch
//!
//! Infrastructure for driving a browser to a title's watch page.
//!
//! ## Host APIs
//!
//! The [`host`] module wraps the systems a resolution touches:
//!
//! - [`host::browser`] - Browser session state machine and page abstraction
//! - [`host::chromium`] - Chromium (CDP) implementation of the launcher
//! - [`host::diagnostics`] - Screenshot/DOM capture and retention pruning
//!
//! ## Resolution Plumbing
//!
//! - [`strategy::LinkStrategy`] - Trait for per-platform link finders
//! - [`retry::RetryController`] - Bounded exponential backoff around a strategy
//! - [`rate_limit::RateLimiter`] - Global spacing between navigations
//!
//! ## Example
//!
//! ```ignore
//! use watchlink_fetch::{BackoffPolicy, RateLimiter, RetryController};
//!
//! let limiter = RateLimiter::from_secs_f64(2.0);
//! let retry = RetryController::new(BackoffPolicy::default());
//!
//! let report = retry
//!     .run(|_attempt| async {
//!         limiter.before_request().await;
//!         strategy.resolve(page, "Some Title", Some("2024")).await
//!     })
//!     .await;
//! ```

pub mod error;
pub mod host;
pub mod rate_limit;
pub mod retry;
pub mod strategy;

// Errors
pub use error::{BrowserError, ResolveError};

// Host APIs
pub use host::{
    browser::{BrowserHandle, BrowserLauncher, BrowserSession, PageHandle, SessionOptions, SessionState},
    chromium::ChromiumLauncher,
    diagnostics::{DiagnosticArtifacts, DiagnosticsCapturer, PruneReport},
};

// Resolution plumbing
pub use rate_limit::RateLimiter;
pub use retry::{BackoffPolicy, RetryController, RetryReport, RetryVerdict};
pub use strategy::{LinkMatch, LinkStrategy, StrategyOutcome};
