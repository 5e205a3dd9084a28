//! Retry executor for transient API errors
//!
//! This module wraps the deadline-bounded backoff from `awsguard-core` with
//! API-specific defaults and the code-based retry predicates.
//!
//! Two fixed entry points cover the common cases:
//!
//! - [`retry_on_code`] retries one error code for up to 2 minutes
//! - [`retry_on_codes`] retries any of several codes for up to 1 minute
//!
//! In both, a non-matching error ends the loop at once, and a matching error
//! that survives the whole budget gets exactly one more attempt whose outcome
//! is returned as-is.

use crate::classify::is_aws_err_any_code;
use crate::config::ResilienceConfig;
use crate::observability::log_retry_finished;
use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

pub use awsguard_core::retry::{BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder};

/// Budget used by [`retry_on_code`].
pub const SINGLE_CODE_RETRY_TIMEOUT: Duration = Duration::from_secs(2 * 60);

/// Budget used by [`retry_on_codes`].
pub const MULTI_CODE_RETRY_TIMEOUT: Duration = Duration::from_secs(60);

/// Retry `operation` while it fails with the API error code `code`.
///
/// Budget: 2 minutes.
///
/// # Examples
///
/// ```rust,no_run
/// use awsguard::{AwsError, retry::retry_on_code};
///
/// # async fn example() -> Result<(), AwsError> {
/// let role_arn = retry_on_code("InvalidParameterValue", || async {
///     // Freshly created IAM roles take a while to become usable.
///     Ok::<_, AwsError>("arn:aws:iam::123456789012:role/demo".to_string())
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_on_code<F, Fut, T, E>(code: &str, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: StdError + Send + 'static,
{
    let policy = RetryPolicy::for_code(code).with_timeout(SINGLE_CODE_RETRY_TIMEOUT);
    policy.execute(operation).await
}

/// Retry `operation` while it fails with any of the API error codes in
/// `codes`.
///
/// Budget: 1 minute.
pub async fn retry_on_codes<S, F, Fut, T, E>(codes: &[S], operation: F) -> Result<T, E>
where
    S: AsRef<str>,
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: StdError + Send + 'static,
{
    let policy = RetryPolicy::for_codes(codes).with_timeout(MULTI_CODE_RETRY_TIMEOUT);
    policy.execute(operation).await
}

/// A retry policy: the error codes worth retrying plus the backoff shape and
/// time budget.
///
/// A policy lives for one call; nothing about it is persisted.
///
/// # Default Backoff
///
/// - `timeout`: 1 minute
/// - `initial_delay`: 500ms
/// - `min_delay`: 25ms
/// - `max_delay`: 10s
/// - `multiplier`: 2.0 (exponential backoff)
/// - `jitter`: 0.1 (10% randomization)
///
/// # Examples
///
/// ```rust
/// use awsguard::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::for_codes(&["Throttling", "RequestLimitExceeded"])
///     .with_timeout(Duration::from_secs(30));
///
/// assert_eq!(policy.timeout(), Duration::from_secs(30));
/// assert_eq!(policy.codes(), ["Throttling", "RequestLimitExceeded"]);
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    codes: Vec<String>,
    backoff: ExponentialBackoffBuilder,
    inner: ExponentialBackoff,
}

impl RetryPolicy {
    /// Policy that retries a single error code.
    pub fn for_code(code: impl Into<String>) -> Self {
        Self::new(vec![code.into()], default_backoff())
    }

    /// Policy that retries any of several error codes.
    pub fn for_codes<S: AsRef<str>>(codes: &[S]) -> Self {
        Self::new(
            codes.iter().map(|code| code.as_ref().to_string()).collect(),
            default_backoff(),
        )
    }

    /// Policy for `codes` using the backoff shape from `config`.
    ///
    /// A single code gets `retry_timeout`; several codes get
    /// `multi_code_retry_timeout`, mirroring the two fixed entry points.
    pub fn from_config<S: AsRef<str>>(codes: &[S], config: &ResilienceConfig) -> Self {
        let timeout = if codes.len() == 1 {
            config.retry_timeout
        } else {
            config.multi_code_retry_timeout
        };
        let backoff = config.backoff.builder().timeout(timeout);
        Self::new(
            codes.iter().map(|code| code.as_ref().to_string()).collect(),
            backoff,
        )
    }

    fn new(codes: Vec<String>, backoff: ExponentialBackoffBuilder) -> Self {
        let inner = backoff.clone().build();
        Self {
            codes,
            backoff,
            inner,
        }
    }

    /// Replace the total time budget.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_backoff(|backoff| backoff.timeout(timeout))
    }

    /// Adjust the backoff shape.
    pub fn with_backoff(
        mut self,
        configure: impl FnOnce(ExponentialBackoffBuilder) -> ExponentialBackoffBuilder,
    ) -> Self {
        self.backoff = configure(self.backoff);
        self.inner = self.backoff.clone().build();
        self
    }

    /// Error codes this policy retries.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Total time budget.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout()
    }

    /// Check if an error should be retried under this policy.
    pub fn is_retryable(&self, error: &(dyn StdError + 'static)) -> bool {
        is_aws_err_any_code(error, self.codes.as_slice())
    }

    /// Get the underlying ExponentialBackoff instance.
    pub fn inner(&self) -> &ExponentialBackoff {
        &self.inner
    }

    /// Run `operation` under this policy.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: StdError + Send + 'static,
    {
        let start = Instant::now();
        let mut attempts: u32 = 0;

        let result = self
            .inner
            .execute(
                |err: &E| self.is_retryable(err),
                || {
                    attempts += 1;
                    operation()
                },
            )
            .await;

        if attempts > 1 {
            log_retry_finished(&self.codes, start.elapsed(), result.is_ok());
        }
        result
    }
}

fn default_backoff() -> ExponentialBackoffBuilder {
    ExponentialBackoff::builder()
        .timeout(MULTI_CODE_RETRY_TIMEOUT)
        .initial_delay(Duration::from_millis(500))
        .min_delay(Duration::from_millis(25))
        .max_delay(Duration::from_secs(10))
        .multiplier(2.0)
        .jitter(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AwsError, Error};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_retry_policy_defaults() {
        let policy = RetryPolicy::for_code("Throttling");
        assert_eq!(policy.codes(), ["Throttling"]);
        assert_eq!(policy.timeout(), MULTI_CODE_RETRY_TIMEOUT);

        let first_delay = policy.inner().next_delay(0);
        // With 10% jitter, should be between 450ms and 550ms
        assert!(first_delay.as_millis() >= 450 && first_delay.as_millis() <= 550);
    }

    #[test]
    fn test_is_retryable() {
        let policy = RetryPolicy::for_codes(&["Throttling", "RequestLimitExceeded"]);

        assert!(policy.is_retryable(&AwsError::new("Throttling", "slow down")));
        assert!(policy.is_retryable(&Error::from(AwsError::new("RequestLimitExceeded", "x"))));
        assert!(!policy.is_retryable(&AwsError::new("AccessDenied", "no")));
        assert!(!policy.is_retryable(&std::io::Error::other("Throttling")));
    }

    #[tokio::test]
    async fn test_huge_budget_still_runs_operation() {
        let policy =
            RetryPolicy::for_code("Throttling").with_timeout(Duration::from_secs(u64::MAX));

        let result = policy.execute(|| async { Ok::<_, AwsError>(1) }).await;

        assert_eq!(result, Ok(1));
        assert_eq!(policy.timeout(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_from_config() {
        let config = ResilienceConfig {
            retry_timeout: Duration::from_secs(7),
            multi_code_retry_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let single = RetryPolicy::from_config(&["Throttling"], &config);
        assert_eq!(single.timeout(), Duration::from_secs(7));

        let multi = RetryPolicy::from_config(&["Throttling", "RequestLimitExceeded"], &config);
        assert_eq!(multi.timeout(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_code_recovers_before_budget() {
        let attempts = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let result = retry_on_code("InvalidParameterValue", || {
            let attempts = Arc::clone(&attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(AwsError::new("InvalidParameterValue", "role not ready"))
                } else {
                    Ok("created")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("created"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() < SINGLE_CODE_RETRY_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_code_stops_on_other_code() {
        let attempts = Arc::new(AtomicU32::new(0));

        let result = retry_on_code("InvalidParameterValue", || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(AwsError::new("AccessDenied", "nope"))
            }
        })
        .await;

        assert_eq!(result.unwrap_err().code(), "AccessDenied");
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_codes_budget_is_one_minute() {
        let start = Instant::now();
        let last_call = Arc::new(std::sync::Mutex::new(None));

        let result = retry_on_codes(&["Throttling", "ServiceUnavailable"], || {
            let last_call = Arc::clone(&last_call);
            async move {
                *last_call.lock().unwrap() = Some(Instant::now());
                Err::<(), _>(AwsError::new("ServiceUnavailable", "try later"))
            }
        })
        .await;

        assert_eq!(result.unwrap_err().code(), "ServiceUnavailable");
        let last_call = last_call.lock().unwrap().unwrap();
        let elapsed = last_call.duration_since(start);
        assert!(elapsed >= MULTI_CODE_RETRY_TIMEOUT);
        assert!(elapsed < MULTI_CODE_RETRY_TIMEOUT + Duration::from_secs(1));
    }
}
