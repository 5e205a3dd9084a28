#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core retry primitives for the awsguard crates.
//!
//! This crate holds the parts of the resilience layer that know nothing about
//! any particular cloud API:
//!
//! - **Deadline-bounded retry** via the `BackoffStrategy` trait
//!   - Exponential backoff with jitter, a floor and a cap
//!   - Caller-supplied retry predicates
//!   - One final attempt once the time budget is spent
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use awsguard_core::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), std::io::Error> {
//! let backoff = ExponentialBackoff::builder()
//!     .timeout(Duration::from_secs(60))
//!     .initial_delay(Duration::from_millis(100))
//!     .build();
//!
//! let result = backoff
//!     .execute(|_: &std::io::Error| false, || async {
//!         Ok::<_, std::io::Error>(42)
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod retry;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use awsguard_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::retry::{BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder};
}
