//! Bounded exponential backoff for store reads.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vitrine_core::{Error, ObjectStore, Result};

/// Share of the delay added or removed at random.
const JITTER: f64 = 0.2;

/// Backoff schedule applied to rate-limited and reset requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 250,
            max_delay_ms: 4000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Upper bound on the time spent sleeping across every retry.
    pub fn worst_case(&self) -> Duration {
        let mut delay = self.initial_delay();
        let mut total = Duration::ZERO;
        for _ in 0..=self.max_retries {
            total = total.saturating_add(scale(delay.min(self.max_delay()), 1.0 + JITTER));
            delay = self.next_delay(delay);
        }
        total
    }

    /// Grow `delay` by the multiplier, saturating at `max_delay`.
    fn next_delay(&self, delay: Duration) -> Duration {
        let max = self.max_delay();
        let secs = delay.as_secs_f64() * self.backoff_multiplier.max(1.0);
        if !secs.is_finite() || secs >= max.as_secs_f64() {
            return max;
        }
        Duration::try_from_secs_f64(secs).map_or(max, |d| d.min(max))
    }

    fn jittered(&self, delay: Duration) -> Duration {
        let factor = rand::thread_rng().gen_range((1.0 - JITTER)..=(1.0 + JITTER));
        scale(delay.min(self.max_delay()), factor)
    }
}

/// `delay * factor`, saturating instead of panicking on overflow.
fn scale(delay: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

/// Reads object bodies, retrying on backpressure.
///
/// Only rate-limit responses and reset-type network failures are retried.
/// Everything else (404, other HTTP errors, refused connections) fails on
/// the first attempt.
#[derive(Debug, Clone)]
pub struct ResilientFetcher<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S: ObjectStore> ResilientFetcher<S> {
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// The wrapped store, for calls that bypass the retry loop.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Read the body at `url`.
    ///
    /// # Errors
    ///
    /// [`Error::RateLimited`] once every attempt was rate-limited; otherwise
    /// the error of the last attempt.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        self.retry(|| self.store.fetch(url)).await
    }

    /// Run `op` under this policy.
    pub async fn retry<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.policy.max_retries + 1;
        let mut delay = self.policy.initial_delay();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let retryable = err.is_rate_limited() || err.is_transient();
            if !retryable {
                return Err(err);
            }

            if attempt >= attempts {
                warn!(attempts, error = %err, "giving up after retries");
                return Err(if err.is_rate_limited() {
                    Error::RateLimited { attempts }
                } else {
                    err
                });
            }

            let sleep = self.policy.jittered(delay);
            info!(attempt, delay_ms = sleep.as_millis() as u64, error = %err, "retrying");
            tokio::time::sleep(sleep).await;
            delay = self.policy.next_delay(delay);
        }
    }
}
