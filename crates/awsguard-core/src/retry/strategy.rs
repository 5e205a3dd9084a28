//! Deadline-bounded retry strategies.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// A strategy for retrying failed operations within a total time budget.
///
/// Implementations decide how long to wait between attempts and how long the
/// whole loop may run. Whether a particular error is worth another attempt is
/// decided by the caller-supplied predicate, so the same strategy can serve
/// any error classification.
///
/// # Contract
///
/// An implementation of [`execute`](BackoffStrategy::execute) must:
///
/// - return the first `Ok` immediately;
/// - return the first error rejected by `is_retryable` immediately, without
///   another attempt;
/// - sleep between retryable failures, with delays that never shrink;
/// - once the budget is spent while the last error was retryable, call the
///   operation exactly one more time and return that outcome as-is.
///
/// # Examples
///
/// ```rust
/// use awsguard_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), std::io::Error> {
/// let backoff = ExponentialBackoff::builder()
///     .timeout(Duration::from_secs(5))
///     .initial_delay(Duration::from_millis(100))
///     .build();
///
/// let value = backoff
///     .execute(
///         |err: &std::io::Error| err.kind() == std::io::ErrorKind::WouldBlock,
///         || async { Ok::<_, std::io::Error>(42) },
///     )
///     .await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait BackoffStrategy: Send + Sync {
    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the time budget runs out.
    ///
    /// # Type Parameters
    /// - `F`: Function that starts one attempt
    /// - `Fut`: The future returned by the function
    /// - `T`: Success type
    /// - `E`: Error type, opaque to the strategy
    /// - `P`: Predicate deciding whether an error is transient
    async fn execute<F, Fut, T, E, P>(&self, is_retryable: P, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Send,
        P: Fn(&E) -> bool + Send + Sync;

    /// Delay to wait after the `attempt`-th failure (0-indexed).
    fn next_delay(&self, attempt: u32) -> Duration;

    /// Total time budget for one call to [`execute`](BackoffStrategy::execute).
    ///
    /// The final post-deadline attempt is not counted against it.
    fn timeout(&self) -> Duration;
}
