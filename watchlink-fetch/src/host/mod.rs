//! Host APIs for link resolution.
//!
//! - [`browser`] - Session state machine and the page/browser seams
//! - [`chromium`] - Chromium over the DevTools protocol
//! - [`diagnostics`] - Failure evidence capture

pub mod browser;
pub mod chromium;
pub mod diagnostics;

pub use browser::{BrowserHandle, BrowserLauncher, BrowserSession, PageHandle, SessionOptions, SessionState};
pub use chromium::ChromiumLauncher;
pub use diagnostics::{DiagnosticArtifacts, DiagnosticsCapturer, PruneReport};
