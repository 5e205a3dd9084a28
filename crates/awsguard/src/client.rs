//! Provider client handed to every lifecycle operation

use crate::config::ResilienceConfig;
use crate::decode::{self, AuthorizationDecoder};
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use std::fmt;
use std::sync::Arc;

/// Connection state shared by all resources of a provider.
///
/// Carries the decoder used to expand encoded authorization failure
/// messages and the resilience settings. Cloning is cheap.
///
/// # Examples
///
/// ```rust
/// use awsguard::{AwsClient, ResilienceConfig};
///
/// let client = AwsClient::new()
///     .with_region("eu-west-1")
///     .with_config(ResilienceConfig::default());
///
/// assert_eq!(client.region(), Some("eu-west-1"));
/// assert!(client.decoder().is_none());
/// ```
#[derive(Clone, Default)]
pub struct AwsClient {
    decoder: Option<Arc<dyn AuthorizationDecoder>>,
    config: ResilienceConfig,
    region: Option<String>,
}

impl AwsClient {
    /// Client without a decoder and with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `decoder` for encoded authorization failure messages.
    pub fn with_decoder(mut self, decoder: Arc<dyn AuthorizationDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Replace the resilience settings.
    pub fn with_config(mut self, config: ResilienceConfig) -> Self {
        self.config = config;
        self
    }

    /// Record the region this client talks to.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// The decoder, unless none is set or decoding is switched off.
    pub fn decoder(&self) -> Option<&dyn AuthorizationDecoder> {
        if !self.config.decode_authorization_messages {
            return None;
        }
        self.decoder.as_deref()
    }

    /// Resilience settings.
    pub fn config(&self) -> &ResilienceConfig {
        &self.config
    }

    /// Region, if known.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Decode an encoded authorization message in `err`, bounded by the
    /// configured decode timeout.
    pub async fn decode_error(&self, err: Error) -> Error {
        decode::decode_error_within(self.decoder(), self.config.decode_timeout, err).await
    }

    /// Pass `Ok` through and decode the error of an `Err`.
    pub async fn decode_result<T>(&self, result: Result<T>) -> Result<T> {
        decode::decode_result(self.decoder(), self.config.decode_timeout, result).await
    }

    /// Retry policy for `codes` using this client's settings.
    pub fn retry_policy<S: AsRef<str>>(&self, codes: &[S]) -> RetryPolicy {
        RetryPolicy::from_config(codes, &self.config)
    }
}

impl fmt::Debug for AwsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsClient")
            .field("decoder", &self.decoder.is_some())
            .field("config", &self.config)
            .field("region", &self.region)
            .finish()
    }
}

#[cfg(feature = "sts")]
impl AwsClient {
    /// Client that decodes through the security token service configured by
    /// `sdk_config`.
    pub fn from_aws_config(sdk_config: &aws_config::SdkConfig) -> Self {
        let client = Self::new().with_decoder(Arc::new(crate::sts::StsDecoder::new(sdk_config)));
        match sdk_config.region() {
            Some(region) => client.with_region(region.to_string()),
            None => client,
        }
    }

    /// Load the default credential chain and build a client from it.
    ///
    /// The region comes from `AWS_REGION` or the active profile.
    pub async fn load(config: ResilienceConfig) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::from_aws_config(&sdk_config).with_config(config)
    }
}
