//! Global navigation rate limiter.
//!
//! One timestamp is shared by every platform, so all navigations are
//! serialized behind the same minimum spacing.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum interval between consecutive navigations.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum spacing.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Creates a limiter from a spacing in seconds. Negative or
    /// unrepresentable values disable it.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::new(Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::ZERO))
    }

    /// Returns the configured spacing.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the spacing since the previous call has elapsed, then
    /// records this call. Returns how long it waited.
    pub async fn before_request(&self) -> Duration {
        let mut last = self.last_request.lock().await;

        let waited = match *last {
            Some(previous) => {
                let elapsed = previous.elapsed();
                if elapsed < self.min_interval {
                    let remaining = self.min_interval - elapsed;
                    debug!(wait = ?remaining, "Rate limiting navigation");
                    tokio::time::sleep(remaining).await;
                    remaining
                } else {
                    Duration::ZERO
                }
            }
            None => Duration::ZERO,
        };

        *last = Some(Instant::now());
        waited
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

// ============================================================================
// Tests
// ============================================================================
