//! Retry with bounded exponential backoff.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::strategy::{LinkMatch, StrategyOutcome};

/// `last_error` recorded when a strategy asks for another attempt.
const RETRY_REQUESTED: &str = "strategy requested retry";

// ============================================================================
// Backoff Policy
// ============================================================================

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Jitter as a fraction of the delay, in `[0, 1]`.
    pub jitter_ratio: f64,
}

impl BackoffPolicy {
    /// Creates a policy with the given attempt count and default delays.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter_ratio: 0.0,
        }
    }

    /// Sets the base and max delays.
    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    /// Sets the jitter ratio, clamped to `[0, 1]`.
    pub fn with_jitter(mut self, jitter_ratio: f64) -> Self {
        self.jitter_ratio = jitter_ratio.clamp(0.0, 1.0);
        self
    }

    /// Delay after failed attempt `attempt` (0-based), before jitter:
    /// `min(max_delay, base_delay * 2^attempt)`.
    pub fn delay_before_jitter(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * 2f64.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// Applies uniform jitter within `±jitter_ratio * delay`.
    pub fn jittered<R: Rng + ?Sized>(&self, delay: Duration, rng: &mut R) -> Duration {
        if self.jitter_ratio <= 0.0 || delay.is_zero() {
            return delay;
        }
        let secs = delay.as_secs_f64();
        let spread = secs * self.jitter_ratio;
        let offset = rng.gen_range(-spread..=spread);
        Duration::from_secs_f64((secs + offset).max(0.0))
    }

    /// Delay after failed attempt `attempt`, with jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.delay_before_jitter(attempt);
        self.jittered(delay, &mut rand::thread_rng())
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter_ratio: 0.25,
        }
    }
}

// ============================================================================
// Retry Report
// ============================================================================

/// How a retry loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryVerdict {
    /// A link was found.
    Found(LinkMatch),
    /// The strategy reported a definitive miss.
    NotFound(String),
    /// An error that another attempt cannot fix ended the loop early.
    Failed,
    /// Every attempt failed or asked for a retry.
    Exhausted,
}

/// Outcome of [`RetryController::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryReport {
    /// How the loop ended.
    pub verdict: RetryVerdict,
    /// Attempts made (`attempt + 1` on a terminal outcome).
    pub attempts: u32,
    /// Error text from the last failed attempt.
    pub last_error: Option<String>,
}

impl RetryReport {
    /// Returns the error text to report for a non-success verdict.
    pub fn failure_reason(&self) -> Option<String> {
        match &self.verdict {
            RetryVerdict::Found(_) => None,
            RetryVerdict::NotFound(reason) => Some(format!("not found: {reason}")),
            RetryVerdict::Failed | RetryVerdict::Exhausted => Some(
                self.last_error
                    .clone()
                    .unwrap_or_else(|| "all attempts failed".to_string()),
            ),
        }
    }
}

// ============================================================================
// Retry Controller
// ============================================================================

/// Runs an attempt function under a [`BackoffPolicy`].
#[derive(Debug, Clone)]
pub struct RetryController {
    policy: BackoffPolicy,
}

impl RetryController {
    /// Creates a controller with the given policy.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy }
    }

    /// Returns the policy.
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Calls `op(attempt)` until it returns a terminal outcome or attempts run out.
    ///
    /// `Retry` outcomes and transient errors both consume an attempt and are
    /// followed by a backoff sleep when attempts remain. Any other error
    /// stops the loop with [`RetryVerdict::Failed`].
    pub async fn run<F, Fut>(&self, mut op: F) -> RetryReport
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<StrategyOutcome, ResolveError>>,
    {
        let max_attempts = self.policy.attempts();
        let mut last_error: Option<String> = None;

        for attempt in 0..max_attempts {
            debug!(attempt = attempt + 1, max_attempts, "Running attempt");

            match op(attempt).await {
                Ok(StrategyOutcome::Found(found)) => {
                    return RetryReport {
                        verdict: RetryVerdict::Found(found),
                        attempts: attempt + 1,
                        last_error,
                    };
                }
                Ok(StrategyOutcome::NotFound(reason)) => {
                    debug!(attempt = attempt + 1, reason = %reason, "Definitive miss");
                    return RetryReport {
                        verdict: RetryVerdict::NotFound(reason),
                        attempts: attempt + 1,
                        last_error,
                    };
                }
                Ok(StrategyOutcome::Retry) => {
                    debug!(attempt = attempt + 1, "Strategy requested retry");
                    last_error = Some(RETRY_REQUESTED.to_string());
                }
                Err(error) if error.is_transient() => {
                    warn!(attempt = attempt + 1, error = %error, "Attempt failed");
                    last_error = Some(error.to_string());
                }
                Err(error) => {
                    warn!(attempt = attempt + 1, error = %error, "Attempt failed, not retrying");
                    return RetryReport {
                        verdict: RetryVerdict::Failed,
                        attempts: attempt + 1,
                        last_error: Some(error.to_string()),
                    };
                }
            }

            if attempt + 1 < max_attempts {
                let delay = self.policy.delay_for_attempt(attempt);
                debug!(delay = ?delay, "Backing off");
                tokio::time::sleep(delay).await;
            }
        }

        RetryReport {
            verdict: RetryVerdict::Exhausted,
            attempts: max_attempts,
            last_error,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
