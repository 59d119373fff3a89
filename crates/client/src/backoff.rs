//! Retry and poll backoff schedules.
//!
//! Two independent policies: retries of a single logical request use
//! jittered exponential backoff, while polling a long-running operation
//! grows deterministically. Jitter desynchronizes concurrent retriers
//! hitting a just-recovered server; a poll loop watches one already-known
//! job and needs no such spread.

use std::time::Duration;

use rand::Rng;
use skylift_domain::{ApiError, ApiResult};

/// Backoff configuration for request retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first; total calls = `max_retries + 1`.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Symmetric jitter amplitude as a fraction of the raw delay (0.0..=1.0).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based).
    ///
    /// `base_delay * multiplier^attempt` clamped to `max_delay`, then
    /// perturbed by `raw * jitter_factor * U(-1, 1)`. Never negative.
    pub fn delay(&self, attempt: u32) -> Duration {
        let raw = exponential(self.base_delay, self.multiplier, attempt, self.max_delay);
        let jitter = raw * self.jitter_factor * rand::thread_rng().gen_range(-1.0..=1.0);
        Duration::from_secs_f64((raw + jitter).max(0.0))
    }

    /// Reject configurations the backoff math cannot honor.
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_delay.is_zero() {
            return Err(ApiError::Config("retry base_delay must be positive".into()));
        }
        if self.max_delay < self.base_delay {
            return Err(ApiError::Config("retry max_delay must be >= base_delay".into()));
        }
        if self.multiplier <= 1.0 {
            return Err(ApiError::Config("retry multiplier must be > 1.0".into()));
        }
        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(ApiError::Config("retry jitter_factor must be within 0.0..=1.0".into()));
        }
        Ok(())
    }
}

/// Interval configuration for operation polling. Never used for retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub min_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            multiplier: 1.5,
        }
    }
}

impl PollPolicy {
    /// Interval before poll number `attempt` (0-based). Deterministic:
    /// `min_interval * multiplier^attempt` capped at `max_interval`,
    /// no jitter.
    pub fn interval(&self, attempt: u32) -> Duration {
        Duration::from_secs_f64(exponential(
            self.min_interval,
            self.multiplier,
            attempt,
            self.max_interval,
        ))
    }

    /// Reject configurations the poll schedule cannot honor.
    pub fn validate(&self) -> ApiResult<()> {
        if self.min_interval.is_zero() {
            return Err(ApiError::Config("poll min_interval must be positive".into()));
        }
        if self.max_interval < self.min_interval {
            return Err(ApiError::Config("poll max_interval must be >= min_interval".into()));
        }
        if self.multiplier <= 1.0 {
            return Err(ApiError::Config("poll multiplier must be > 1.0".into()));
        }
        Ok(())
    }
}

/// `base * multiplier^attempt` in seconds, clamped to `cap`.
///
/// Large attempt indices overflow f64 to infinity; `min(cap)` saturates
/// them at the cap instead.
fn exponential(base: Duration, multiplier: f64, attempt: u32, cap: Duration) -> f64 {
    (base.as_secs_f64() * multiplier.powf(f64::from(attempt))).min(cap.as_secs_f64())
}
