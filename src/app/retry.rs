//! Reusable retry policy with exponential backoff
//!
//! A [`RetryPolicy`] bounds the number of attempts and derives the delay
//! between them from the `backoff` crate's exponential schedule. Only errors
//! that report themselves as [`Retryable`] are retried.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::limits;
use crate::errors::ProviderError;

/// Errors that can tell whether another attempt is worthwhile
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for ProviderError {
    fn is_retryable(&self) -> bool {
        ProviderError::is_retryable(self)
    }
}

/// Attempt limit plus backoff schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first (1 = no retry)
    pub max_attempts: u32,
    /// Delay before the second attempt
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub multiplier: f64,
    /// Randomization applied to each delay (0.0-1.0)
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: limits::MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(limits::RETRY_BASE_DELAY_MS),
            max_delay: Duration::from_millis(limits::RETRY_MAX_DELAY_MS),
            multiplier: limits::RETRY_MULTIPLIER,
            jitter: limits::BACKOFF_JITTER_FACTOR,
        }
    }
}

impl RetryPolicy {
    /// Policy that makes exactly one attempt
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Set the attempt limit
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the first delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("Retry max_attempts must be at least 1".to_string());
        }
        if self.multiplier < 1.0 {
            return Err("Retry multiplier must be at least 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err("Retry jitter must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }

    /// Fresh backoff schedule for one retried operation
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_max_interval(self.max_delay)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(self.jitter)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Run `operation` until it succeeds, fails permanently or attempts run out
    ///
    /// `label` identifies the operation in logs.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut backoff = self.backoff();
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = backoff.next_backoff().unwrap_or(self.max_delay);
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {}ms",
                        label,
                        attempt,
                        self.max_attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!("{} gave up after {} attempt(s): {}", label, attempt, e);
                    return Err(e);
                }
            }
        }
    }
}
