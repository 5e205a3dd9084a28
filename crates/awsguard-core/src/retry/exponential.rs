//! Exponential backoff with jitter, bounded by a total time budget.

use super::strategy::BackoffStrategy;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Exponential backoff strategy with configurable jitter and a deadline.
///
/// Delays between retries grow as `initial_delay * multiplier^attempt`, are
/// randomized by `jitter`, and are clamped to `[min_delay, max_delay]`. Within
/// one call the delays never shrink, so polling gets less frequent over the
/// budget window.
///
/// # Mathematical Formula
///
/// For attempt `n` (0-indexed after the first failure):
/// ```text
/// base_delay   = initial_delay * (multiplier ^ n)
/// jittered     = base_delay + base_delay * jitter * random(-1.0, +1.0)
/// final_delay  = clamp(jittered, min_delay, max_delay)
/// ```
///
/// The sleep before the next attempt is additionally clipped to whatever
/// remains of `timeout`.
///
/// # Examples
///
/// ```rust
/// use awsguard_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .timeout(Duration::from_secs(120))
///     .initial_delay(Duration::from_millis(500))
///     .max_delay(Duration::from_secs(10))
///     .multiplier(2.0)
///     .jitter(0.1)
///     .build();
///
/// assert_eq!(backoff.timeout(), Duration::from_secs(120));
/// ```
///
/// # Performance Characteristics
///
/// - **Memory**: O(1) - no allocations during retry loop
/// - **CPU**: O(1) per retry - simple arithmetic + one random number generation
/// - **I/O**: Sleeps between retries using `tokio::time::sleep`
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    timeout: Duration,
    initial_delay: Duration,
    min_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: f64,
}

impl ExponentialBackoff {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// Lower bound applied to every delay.
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Upper bound applied to every delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

impl Default for ExponentialBackoff {
    /// Defaults:
    /// - `timeout`: 60s
    /// - `initial_delay`: 100ms
    /// - `min_delay`: 25ms
    /// - `max_delay`: 10s
    /// - `multiplier`: 2.0 (doubles each time)
    /// - `jitter`: 0.1 (10% randomization)
    fn default() -> Self {
        ExponentialBackoffBuilder::default().build()
    }
}

#[async_trait]
impl BackoffStrategy for ExponentialBackoff {
    async fn execute<F, Fut, T, E, P>(&self, is_retryable: P, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Send,
        P: Fn(&E) -> bool + Send + Sync,
    {
        // A budget too large to represent means the loop never times out.
        let deadline = Instant::now().checked_add(self.timeout);
        let mut attempt: u32 = 0;
        let mut previous = Duration::ZERO;

        loop {
            match operation().await {
                Ok(result) => {
                    #[cfg(feature = "tracing")]
                    if attempt > 0 {
                        tracing::debug!(retries = attempt, "operation succeeded after retrying");
                    }
                    return Ok(result);
                }
                Err(err) if !is_retryable(&err) => return Err(err),
                Err(_) => {}
            }

            let now = Instant::now();
            let remaining = match deadline {
                Some(deadline) if now >= deadline => break,
                Some(deadline) => deadline - now,
                None => Duration::MAX,
            };

            let delay = self.next_delay(attempt).max(previous);
            previous = delay;

            #[cfg(feature = "tracing")]
            tracing::debug!(
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "retryable error, backing off"
            );

            tokio::time::sleep(delay.min(remaining)).await;
            attempt += 1;

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                break;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempts = attempt + 1,
            timeout_ms = self.timeout.as_millis() as u64,
            "retry budget exhausted, making final attempt"
        );

        operation().await
    }

    fn next_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base_delay = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);

        let jittered = if self.jitter > 0.0 {
            // base * jitter * random(-1.0, +1.0)
            let jitter_amount = base_delay * self.jitter * (rand::random::<f64>() - 0.5) * 2.0;
            base_delay + jitter_amount
        } else {
            base_delay
        };

        let clamped = jittered
            .min(self.max_delay.as_secs_f64())
            .max(self.min_delay.as_secs_f64());

        Duration::from_secs_f64(clamped)
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for configuring [`ExponentialBackoff`].
///
/// # Examples
///
/// ```rust
/// use awsguard_core::retry::ExponentialBackoff;
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .timeout(Duration::from_secs(60))
///     .initial_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(30))
///     .multiplier(2.0)
///     .jitter(0.1)
///     .build();
/// ```
#[derive(Debug, Default, Clone)]
pub struct ExponentialBackoffBuilder {
    timeout: Option<Duration>,
    initial_delay: Option<Duration>,
    min_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<f64>,
    jitter: Option<f64>,
}

impl ExponentialBackoffBuilder {
    /// Set the total time budget.
    ///
    /// Default: 60s
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the delay before the first retry.
    ///
    /// Default: 100ms
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Set the floor for every delay.
    ///
    /// Default: 25ms
    pub fn min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = Some(delay);
        self
    }

    /// Set the maximum delay between retries.
    ///
    /// Default: 10s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set the exponential multiplier. Values below 1.0 are raised to 1.0 so
    /// delays cannot shrink.
    ///
    /// Default: 2.0
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier.max(1.0));
        self
    }

    /// Set the jitter factor (0.0 to 1.0).
    ///
    /// A jitter of 0.1 means the delay can vary by ±10%.
    ///
    /// Default: 0.1
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter.clamp(0.0, 1.0));
        self
    }

    /// Build the `ExponentialBackoff` instance.
    ///
    /// Uses default values for any unset parameters. If the floor is above
    /// the cap, the cap wins.
    pub fn build(self) -> ExponentialBackoff {
        let max_delay = self.max_delay.unwrap_or(Duration::from_secs(10));
        ExponentialBackoff {
            timeout: self.timeout.unwrap_or(Duration::from_secs(60)),
            initial_delay: self.initial_delay.unwrap_or(Duration::from_millis(100)),
            min_delay: self
                .min_delay
                .unwrap_or(Duration::from_millis(25))
                .min(max_delay),
            max_delay,
            multiplier: self.multiplier.unwrap_or(2.0),
            jitter: self.jitter.unwrap_or(0.1),
        }
    }
}
