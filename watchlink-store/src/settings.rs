//! Resolver settings.
//!
//! Loaded from YAML (`.yaml`/`.yml`) or JSON (`.json`). Every key is
//! optional; missing keys and a missing file fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use watchlink_fetch::host::browser::DEFAULT_USER_AGENT;
use watchlink_fetch::{BackoffPolicy, DiagnosticsCapturer, SessionOptions};
use watchlink_providers::SearchSettings;

use crate::error::StoreError;
use crate::persistence::{default_cache_path, default_screenshot_dir, default_settings_path};

/// Longest accepted cache lifetime, about a century.
pub const MAX_CACHE_TTL_DAYS: u32 = 36_500;

// ============================================================================
// Settings Types
// ============================================================================

/// Backoff delays, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffSettings {
    /// Delay after the first failed attempt.
    pub base_delay: f64,
    /// Cap on any single delay.
    pub max_delay: f64,
    /// Jitter fraction in `[0, 1]`.
    pub jitter_ratio: f64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            base_delay: 1.0,
            max_delay: 30.0,
            jitter_ratio: 0.25,
        }
    }
}

/// Everything the resolver can be configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run the browser without a window.
    pub headless: bool,
    /// Per-navigation timeout.
    pub timeout_seconds: u64,
    /// Minimum spacing between navigations, across all platforms.
    pub rate_limit_seconds: f64,
    /// Attempts per resolution, including the first.
    pub max_retries: u32,
    /// Lifetime of cache entries.
    pub cache_ttl_days: u32,
    /// Capture screenshots and DOM snapshots on failure.
    pub screenshots_enabled: bool,
    /// Age after which diagnostics are pruned.
    pub screenshot_retention_days: u32,
    /// Backoff between attempts.
    pub backoff: BackoffSettings,
    /// Pause after opening a search page.
    pub settle_seconds: f64,
    /// Wait per selector candidate.
    pub selector_timeout_seconds: f64,
    /// Link cache file.
    pub cache_path: PathBuf,
    /// Diagnostics directory.
    pub screenshot_dir: PathBuf,
    /// Browser user agent.
    pub user_agent: String,
    /// Browser binary; auto-detected when unset.
    pub browser_executable: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_seconds: 30,
            rate_limit_seconds: 2.0,
            max_retries: 3,
            cache_ttl_days: 7,
            screenshots_enabled: true,
            screenshot_retention_days: 7,
            backoff: BackoffSettings::default(),
            settle_seconds: 3.0,
            selector_timeout_seconds: 5.0,
            cache_path: default_cache_path(),
            screenshot_dir: default_screenshot_dir(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser_executable: None,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl Settings {
    /// Loads settings from the default path.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(&default_settings_path()).await
    }

    /// Loads and validates settings from `path`. A missing file gives defaults.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Settings file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let settings = Self::parse(path, &content)?;
        settings.validate()?;

        info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Parses settings text, choosing the format from `path`'s extension.
    pub fn parse(path: &Path, content: &str) -> Result<Self, StoreError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("yaml" | "yml") => {
                // An empty YAML document is `null`, which means "all defaults".
                if content.trim().is_empty() {
                    return Ok(Self::default());
                }
                Ok(serde_yaml::from_str(content)?)
            }
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(StoreError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), StoreError> {
        let b = &self.backoff;

        if !(0.0..=1.0).contains(&b.jitter_ratio) {
            return Err(StoreError::Config(format!(
                "backoff.jitter_ratio must be within [0, 1], got {}",
                b.jitter_ratio
            )));
        }

        for (name, value) in [
            ("backoff.base_delay", b.base_delay),
            ("backoff.max_delay", b.max_delay),
            ("rate_limit_seconds", self.rate_limit_seconds),
            ("settle_seconds", self.settle_seconds),
            ("selector_timeout_seconds", self.selector_timeout_seconds),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(StoreError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(StoreError::Config(format!(
                    "{name} is too large, got {value}"
                )));
            }
        }

        if b.max_delay < b.base_delay {
            return Err(StoreError::Config(format!(
                "backoff.max_delay ({}) is below backoff.base_delay ({})",
                b.max_delay, b.base_delay
            )));
        }

        if self.max_retries == 0 {
            return Err(StoreError::Config("max_retries must be at least 1".to_string()));
        }

        if !(1..=MAX_CACHE_TTL_DAYS).contains(&self.cache_ttl_days) {
            return Err(StoreError::Config(format!(
                "cache_ttl_days must be within [1, {MAX_CACHE_TTL_DAYS}], got {}",
                self.cache_ttl_days
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Derived Views
// ============================================================================

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::ZERO)
}

impl Settings {
    /// Retry policy for resolutions.
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.max_retries)
            .with_delays(secs(self.backoff.base_delay), secs(self.backoff.max_delay))
            .with_jitter(self.backoff.jitter_ratio)
    }

    /// Browser launch options.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            headless: self.headless,
            navigation_timeout: Duration::from_secs(self.timeout_seconds),
            user_agent: self.user_agent.clone(),
            executable: self.browser_executable.clone(),
            ..SessionOptions::default()
        }
    }

    /// Timing for the built-in search strategies.
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            settle: secs(self.settle_seconds),
            selector_timeout: secs(self.selector_timeout_seconds),
        }
    }

    /// Minimum spacing between navigations.
    pub fn rate_limit(&self) -> Duration {
        secs(self.rate_limit_seconds)
    }

    /// Diagnostics capturer for the configured directory and retention.
    pub fn diagnostics(&self) -> DiagnosticsCapturer {
        DiagnosticsCapturer::new(&self.screenshot_dir, self.screenshot_retention_days)
            .with_enabled(self.screenshots_enabled)
    }
}

// ============================================================================
// Tests
// ============================================================================
