//! Failure diagnostics capture.
//!
//! When a resolution fails for good, the page is saved as a full-page PNG
//! and an HTML snapshot named `{work}_{service}_{YYYYMMDD_HHMMSS}`, with a
//! `_{n}` suffix when that second is already taken. Old artifacts are
//! pruned by modification time on startup and after every capture.

use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, instrument, warn};

use super::browser::PageHandle;
use crate::error::ResolveError;

/// Extensions written by the capturer; pruning only touches these.
const ARTIFACT_EXTENSIONS: &[&str] = &["png", "html"];

// ============================================================================
// Artifacts
// ============================================================================

/// Paths written by one capture. Either may be missing if that capture failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticArtifacts {
    /// Full-page screenshot.
    pub screenshot: Option<PathBuf>,
    /// Serialized DOM.
    pub html: Option<PathBuf>,
}

impl DiagnosticArtifacts {
    /// Returns the screenshot path as a string.
    pub fn screenshot_path(&self) -> Option<String> {
        self.screenshot.as_ref().map(|p| p.display().to_string())
    }

    /// Returns the HTML path as a string.
    pub fn html_path(&self) -> Option<String> {
        self.html.as_ref().map(|p| p.display().to_string())
    }

    /// Returns true if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.screenshot.is_none() && self.html.is_none()
    }
}

/// Counts from one pruning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Files deleted.
    pub removed: usize,
    /// Files within the retention window.
    pub kept: usize,
    /// Files that could not be inspected or deleted.
    pub failed: usize,
}

// ============================================================================
// Capturer
// ============================================================================

/// Saves failure evidence and enforces its retention window.
#[derive(Debug, Clone)]
pub struct DiagnosticsCapturer {
    dir: PathBuf,
    retention: Duration,
    enabled: bool,
}

impl DiagnosticsCapturer {
    /// Creates a capturer writing to `dir`, keeping files for `retention_days`.
    pub fn new(dir: impl Into<PathBuf>, retention_days: u32) -> Self {
        Self {
            dir: dir.into(),
            retention: Duration::from_secs(u64::from(retention_days) * 24 * 60 * 60),
            enabled: true,
        }
    }

    /// Enables or disables capture. Pruning still runs when disabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Overrides the retention window.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Returns the artifact directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns whether capture is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Builds the file stem `{work}_{service}_{YYYYMMDD_HHMMSS}`.
    pub fn artifact_stem(work_id: &str, service_slug: &str, timestamp: &str) -> String {
        format!(
            "{}_{}_{}",
            sanitize(work_id),
            sanitize(service_slug),
            timestamp
        )
    }

    /// Captures a screenshot and DOM snapshot of `page`, then prunes.
    ///
    /// Never fails: each half is logged and skipped on error.
    #[instrument(skip(self, page, error))]
    pub async fn capture(
        &self,
        page: &dyn PageHandle,
        work_id: &str,
        service_slug: &str,
        error: &str,
    ) -> DiagnosticArtifacts {
        if !self.enabled {
            return DiagnosticArtifacts::default();
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "Cannot create diagnostics directory");
            return DiagnosticArtifacts::default();
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let stem = self
            .free_stem(Self::artifact_stem(work_id, service_slug, &timestamp))
            .await;
        let mut artifacts = DiagnosticArtifacts::default();

        let png = self.dir.join(format!("{stem}.png"));
        match page.screenshot(&png).await {
            Ok(()) => artifacts.screenshot = Some(png),
            Err(e) => warn!(error = %e, "Screenshot capture failed"),
        }

        let html = self.dir.join(format!("{stem}.html"));
        match self.write_dom(page, &html).await {
            Ok(()) => artifacts.html = Some(html),
            Err(e) => warn!(error = %e, "DOM capture failed"),
        }

        info!(
            screenshot = ?artifacts.screenshot,
            html = ?artifacts.html,
            error = %error,
            "Captured failure diagnostics"
        );

        self.prune().await;
        artifacts
    }

    /// Returns `stem`, or `stem_{n}` for the first `n` with no artifact yet.
    async fn free_stem(&self, stem: String) -> String {
        let mut candidate = stem.clone();
        let mut n = 1u32;
        while self.stem_taken(&candidate).await {
            candidate = format!("{stem}_{n}");
            n += 1;
        }
        candidate
    }

    async fn stem_taken(&self, stem: &str) -> bool {
        for ext in ARTIFACT_EXTENSIONS {
            let path = self.dir.join(format!("{stem}.{ext}"));
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return true;
            }
        }
        false
    }

    async fn write_dom(&self, page: &dyn PageHandle, path: &Path) -> Result<(), ResolveError> {
        let content = page
            .content()
            .await
            .map_err(|e| ResolveError::Diagnostics(e.to_string()))?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Deletes artifacts older than the retention window.
    ///
    /// A missing directory is not an error. Per-file failures are logged.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn prune(&self) -> PruneReport {
        let mut report = PruneReport::default();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return report,
            Err(e) => {
                warn!(error = %e, "Cannot read diagnostics directory");
                return report;
            }
        };

        let cutoff = SystemTime::now()
            .checked_sub(self.retention)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read directory entry");
                    report.failed += 1;
                    break;
                }
            };

            let path = entry.path();
            if !is_artifact(&path) {
                continue;
            }

            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot stat artifact");
                    report.failed += 1;
                    continue;
                }
            };

            if modified >= cutoff {
                report.kept += 1;
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(path = %path.display(), "Removed expired artifact");
                    report.removed += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove artifact");
                    report.failed += 1;
                }
            }
        }

        if report.removed > 0 {
            info!(removed = report.removed, kept = report.kept, "Pruned diagnostics");
        }
        report
    }
}

fn is_artifact(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ARTIFACT_EXTENSIONS.contains(&ext))
}

/// Keeps `[A-Za-z0-9_-]`, replacing everything else with `_`.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
