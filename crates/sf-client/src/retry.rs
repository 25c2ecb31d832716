//! Opt-in retry schedule for idempotent async-API reads.
//!
//! The transport performs one attempt per call unless a [`RetryConfig`] is
//! installed via [`ClientConfigBuilder::with_retry`](crate::ClientConfigBuilder::with_retry).
//! Job creation and batch submission are not idempotent, so retries belong on
//! status reads and result downloads, where re-issuing the request is safe.

use rand::Rng;
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_attempts: u32,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff strategy to use.
    pub backoff: BackoffStrategy,
    /// Whether to respect Retry-After headers.
    pub respect_retry_after: bool,
    /// Maximum time to wait from Retry-After header.
    pub max_retry_after: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff: BackoffStrategy::ExponentialWithJitter { factor: 2.0 },
            respect_retry_after: true,
            max_retry_after: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of retry attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the ceiling on computed delays.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff strategy.
    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Control whether Retry-After headers override the computed delay.
    pub fn with_respect_retry_after(mut self, respect: bool) -> Self {
        self.respect_retry_after = respect;
        self
    }

    /// Cap the wait taken from a Retry-After header. The service's value is
    /// advisory; an org under heavy concurrent-batch load can send waits far
    /// longer than a caller wants to honor.
    pub fn with_max_retry_after(mut self, cap: Duration) -> Self {
        self.max_retry_after = cap;
        self
    }
}

/// Backoff strategy for determining retry delays.
#[derive(Debug, Clone, Copy)]
pub enum BackoffStrategy {
    /// Constant delay between retries.
    Constant,
    /// Linear increase in delay (delay * attempt).
    Linear,
    /// Exponential increase in delay (delay * factor^attempt).
    Exponential { factor: f64 },
    /// Exponential with random jitter to avoid thundering herd.
    ExponentialWithJitter { factor: f64 },
}

impl BackoffStrategy {
    /// Calculate the delay for a given attempt number (0-indexed), capped at
    /// `max_delay`.
    pub fn delay(&self, attempt: u32, initial_delay: Duration, max_delay: Duration) -> Duration {
        let delay = match self {
            BackoffStrategy::Constant => initial_delay,
            BackoffStrategy::Linear => initial_delay.saturating_mul(attempt + 1),
            BackoffStrategy::Exponential { factor } => {
                scale(initial_delay, factor.powi(attempt as i32))
            }
            BackoffStrategy::ExponentialWithJitter { factor } => {
                let base = factor.powi(attempt as i32);
                // Jitter spreads concurrent pollers over [base, 2*base).
                let spread = 1.0 + rand::rng().random::<f64>();
                scale(initial_delay, base * spread)
            }
        };

        delay.min(max_delay)
    }
}

fn scale(delay: Duration, multiplier: f64) -> Duration {
    Duration::from_secs_f64(delay.as_secs_f64() * multiplier)
}

/// Mutable retry state for one logical request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    attempt: u32,
}

impl RetryPolicy {
    /// Create a new retry policy from config.
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// The number of retries consumed so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether the attempt budget allows another retry.
    pub fn should_retry(&self) -> bool {
        self.attempt < self.config.max_attempts
    }

    /// Consume one attempt and return the delay to sleep before retrying,
    /// or `None` when the budget is spent. A Retry-After value from the
    /// service wins over the computed backoff, subject to the configured cap.
    pub fn next_delay(&mut self, retry_after: Option<Duration>) -> Option<Duration> {
        if !self.should_retry() {
            return None;
        }

        let delay = match retry_after {
            Some(wait) if self.config.respect_retry_after => {
                wait.min(self.config.max_retry_after)
            }
            _ => self.config.backoff.delay(
                self.attempt,
                self.config.initial_delay,
                self.config.max_delay,
            ),
        };

        self.attempt += 1;
        Some(delay)
    }

    /// Reset the retry policy for a new request.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
