//! Retry strategies and backoff implementations.
//!
//! This module provides a deadline-bounded retry loop with exponential
//! backoff and jitter. What counts as retryable is always decided by the
//! caller, through a predicate passed to each call.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - Core trait for retry strategies
//! - [`ExponentialBackoff`] - Exponential backoff with jitter and a time budget
//!
//! # Examples
//!
//! ```rust
//! use awsguard_core::retry::{BackoffStrategy, ExponentialBackoff};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), std::io::Error> {
//! let backoff = ExponentialBackoff::builder()
//!     .timeout(Duration::from_secs(30))
//!     .build();
//!
//! let result = backoff
//!     .execute(
//!         |err: &std::io::Error| err.kind() == std::io::ErrorKind::TimedOut,
//!         || async { Ok::<_, std::io::Error>(42) },
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod exponential;
mod strategy;

pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use strategy::BackoffStrategy;
