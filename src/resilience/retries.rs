//! Retry executor for calls to the completion service.
//!
//! # State Machine
//! ```text
//! ATTEMPTING(0) ──ok──────────────────────────────▶ SUCCEEDED
//!      │
//!      ├─retryable, n < max_retries ─ sleep ─▶ ATTEMPTING(n+1)
//!      │
//!      └─terminal, or n == max_retries ──────────▶ FAILED
//! ```
//!
//! The operation may run up to `max_retries + 1` times with full side
//! effects each time, so it must be idempotent. There is no cancellation and
//! no deadline over the whole sequence; per-attempt timeouts belong to the
//! operation itself.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::ServiceError;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::classify::classify;
use crate::resilience::failure::UpstreamFailure;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

/// Suspends the current call between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(delay)
    }
}

/// Sleeper that returns immediately and records every requested delay.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(delay);
        }
        std::future::ready(())
    }
}

/// Runs fallible upstream operations under a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryExecutor<S = TokioSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl RetryExecutor<TokioSleeper> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, TokioSleeper)
    }
}

impl<S: Sleeper> RetryExecutor<S> {
    pub fn with_sleeper(policy: RetryPolicy, sleeper: S) -> Self {
        Self { policy, sleeper }
    }

    /// Run `operation` until it succeeds, fails terminally, or the retry
    /// budget is spent.
    ///
    /// `label` only feeds logs and metrics. Every failure path yields exactly
    /// one [`ServiceError::Upstream`] carrying the last failure's description.
    pub async fn execute<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, UpstreamFailure>>,
    {
        let max_retries = self.policy.max_retries;
        let mut attempt: u32 = 0;

        loop {
            let failure = match operation().await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };

            let class = classify(&failure);
            if !class.is_retryable() || attempt >= max_retries {
                tracing::error!(
                    operation = %label,
                    attempt,
                    retryable = class.is_retryable(),
                    status = ?failure.status,
                    error = %failure,
                    "Upstream call failed"
                );
                metrics::record_upstream_failure(label);
                return Err(ServiceError::Upstream(failure.describe().to_string()));
            }

            let delay = calculate_backoff(&self.policy, attempt, &failure);
            tracing::debug!(
                operation = %label,
                attempt,
                status = ?failure.status,
                error = %failure,
                "Retryable upstream failure"
            );

            self.sleeper.sleep(delay).await;
            attempt += 1;

            let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            tracing::info!(
                operation = %label,
                attempt,
                max_retries,
                delay_ms,
                "retry attempt {}/{} for {} after {}ms",
                attempt,
                max_retries,
                label,
                delay_ms
            );
            metrics::record_upstream_retry(label);
        }
    }
}
