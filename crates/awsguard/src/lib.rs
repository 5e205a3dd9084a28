//! # awsguard
//!
//! Resilience layer for infrastructure providers that talk to a cloud
//! control-plane API:
//! - Classification of API errors by code, message or HTTP status
//! - Deadline-bounded retries of transient error codes
//! - Decoding of encoded authorization failure messages
//! - Decoration of resource lifecycle operations with that decoding
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use awsguard::{AwsClient, AwsError, ResilienceConfig, retry_on_codes};
//! use awsguard::decorate::make_authz_message_decoding_resources;
//! use awsguard::schema::ResourceMap;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AwsClient::new().with_config(ResilienceConfig::default());
//!     let resources = make_authz_message_decoding_resources(ResourceMap::new());
//!
//!     let subnet = retry_on_codes(&["Throttling", "RequestLimitExceeded"], || async {
//!         Ok::<_, AwsError>("subnet-0a1b2c")
//!     })
//!     .await?;
//!
//!     println!("{subnet} ({} resources, {:?})", resources.len(), client.region());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use classify::{
    is_aws_err, is_aws_err_any_code, is_aws_err_code, is_aws_err_request_failure_status_code,
};
pub use client::AwsClient;
pub use config::{BackoffConfig, ResilienceConfig};
pub use decode::{AuthorizationDecoder, decode_error};
pub use decorate::{LifecycleOperation, decorate_all, make_authz_message_decoding_resources};
pub use error::{AwsError, Error, Result};
pub use retry::{RetryPolicy, retry_on_code, retry_on_codes};

// Module declarations
pub mod classify;
pub mod client;
pub mod config;
pub mod decode;
pub mod decorate;
pub mod error;
pub mod observability;
pub mod retry;
pub mod schema;

// Security token service decoder (optional, feature-gated)
#[cfg(feature = "sts")]
#[cfg_attr(docsrs, doc(cfg(feature = "sts")))]
pub mod sts;

// Re-export key dependencies for convenience
pub use async_trait::async_trait;
