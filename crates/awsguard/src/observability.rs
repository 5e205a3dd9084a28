//! Structured logging for retries, decoding and decoration
//!
//! All log output of this crate goes through these helpers so field names
//! stay consistent.

use std::time::Duration;
use tracing::{debug, info, warn};

/// What happened to one attempt at decoding an authorization message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The token was decoded and the message rewritten
    Decoded,
    /// The decode service returned an error
    Failed(String),
    /// The decode service did not answer in time
    TimedOut(Duration),
}

impl DecodeOutcome {
    /// Whether the error was rewritten.
    pub fn is_decoded(&self) -> bool {
        matches!(self, DecodeOutcome::Decoded)
    }

    /// Log this outcome for an error with API code `code`.
    ///
    /// Failures are warnings: they never change what the caller receives.
    pub fn log(&self, code: Option<&str>) {
        match self {
            DecodeOutcome::Decoded => {
                debug!(code = code, "Decoded encoded authorization failure message");
            }
            DecodeOutcome::Failed(error) => {
                warn!(
                    code = code,
                    error = %error,
                    "Attempted to decode authorization message, but received an error"
                );
            }
            DecodeOutcome::TimedOut(timeout) => {
                warn!(
                    code = code,
                    timeout_ms = timeout.as_millis() as u64,
                    "Attempted to decode authorization message, but the call timed out"
                );
            }
        }
    }
}

/// Log that a resource's lifecycle operations were wrapped.
pub fn log_resource_decorated(resource: &str, operations: &[&'static str]) {
    debug!(
        resource = %resource,
        operations = ?operations,
        "Wrapped lifecycle operations with authorization message decoding"
    );
}

/// Log that a resource was skipped because it is already wrapped.
pub fn log_resource_already_decorated(resource: &str) {
    debug!(resource = %resource, "Lifecycle operations already wrapped, skipping");
}

/// Log the end of a retry loop that needed more than one attempt.
pub fn log_retry_finished(codes: &[String], elapsed: Duration, succeeded: bool) {
    if succeeded {
        info!(
            codes = ?codes,
            elapsed_ms = elapsed.as_millis() as u64,
            "Operation succeeded after retrying transient errors"
        );
    } else {
        debug!(
            codes = ?codes,
            elapsed_ms = elapsed.as_millis() as u64,
            "Retry loop finished with an error"
        );
    }
}

/// Install a `tracing-subscriber` formatter filtered by `RUST_LOG`
/// (default `awsguard=info`).
///
/// Does nothing if a global subscriber is already set.
#[cfg(feature = "trace")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("awsguard=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
