//! Configuration for the resilience layer

use awsguard_core::retry::{ExponentialBackoff, ExponentialBackoffBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default budget for decoding one authorization message.
pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for retrying and error decoding.
///
/// Durations are written as whole seconds (timeouts) or milliseconds
/// (backoff delays) when serialized.
///
/// The fixed entry points [`retry_on_code`](crate::retry::retry_on_code) and
/// [`retry_on_codes`](crate::retry::retry_on_codes) always use their own
/// 2 minute and 1 minute budgets; this configuration feeds
/// [`RetryPolicy::from_config`](crate::retry::RetryPolicy::from_config) and
/// the client's decoding behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Budget for single-code retry loops
    #[serde(with = "duration_secs")]
    pub retry_timeout: Duration,

    /// Budget for multi-code retry loops
    #[serde(with = "duration_secs")]
    pub multi_code_retry_timeout: Duration,

    /// Upper bound for one authorization message decode call
    #[serde(with = "duration_secs")]
    pub decode_timeout: Duration,

    /// Whether encoded authorization failure messages are decoded at all
    pub decode_authorization_messages: bool,

    /// Shape of the delays between attempts
    pub backoff: BackoffConfig,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry_timeout: Duration::from_secs(2 * 60),
            multi_code_retry_timeout: Duration::from_secs(60),
            decode_timeout: DEFAULT_DECODE_TIMEOUT,
            decode_authorization_messages: true,
            backoff: BackoffConfig::default(),
        }
    }
}

impl ResilienceConfig {
    /// Load configuration from environment variables.
    ///
    /// This will look for:
    /// - `AWSGUARD_RETRY_TIMEOUT` for the single-code retry budget (in seconds)
    /// - `AWSGUARD_MULTI_CODE_RETRY_TIMEOUT` for the multi-code retry budget (in seconds)
    /// - `AWSGUARD_DECODE_TIMEOUT` for the decode call budget (in seconds)
    /// - `AWSGUARD_DECODE_AUTHORIZATION_MESSAGES` to switch decoding on or off
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable if a value is set but cannot be
    /// parsed.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self, crate::error::Error> {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64>("AWSGUARD_RETRY_TIMEOUT")? {
            config.retry_timeout = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_var::<u64>("AWSGUARD_MULTI_CODE_RETRY_TIMEOUT")? {
            config.multi_code_retry_timeout = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_var::<u64>("AWSGUARD_DECODE_TIMEOUT")? {
            config.decode_timeout = Duration::from_secs(secs);
        }

        if let Some(enabled) = parse_var::<bool>("AWSGUARD_DECODE_AUTHORIZATION_MESSAGES")? {
            config.decode_authorization_messages = enabled;
        }

        fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, crate::error::Error> {
            match std::env::var(name) {
                Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
                    crate::error::Error::message(format!("invalid value for {name}: {raw:?}"))
                }),
                Err(_) => Ok(None),
            }
        }

        Ok(config)
    }
}

/// Backoff shape between retry attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first retry
    #[serde(with = "duration_millis")]
    pub initial_delay: Duration,

    /// Floor for every delay
    #[serde(with = "duration_millis")]
    pub min_delay: Duration,

    /// Cap for every delay
    #[serde(with = "duration_millis")]
    pub max_delay: Duration,

    /// Growth factor per attempt
    pub multiplier: f64,

    /// Randomization factor (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            min_delay: Duration::from_millis(25),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl BackoffConfig {
    /// A backoff builder pre-filled with this shape. The caller sets the
    /// time budget.
    pub fn builder(&self) -> ExponentialBackoffBuilder {
        ExponentialBackoff::builder()
            .initial_delay(self.initial_delay)
            .min_delay(self.min_delay)
            .max_delay(self.max_delay)
            .multiplier(self.multiplier)
            .jitter(self.jitter)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsguard_core::retry::BackoffStrategy;

    #[test]
    fn test_default_config() {
        let config = ResilienceConfig::default();
        assert_eq!(config.retry_timeout, Duration::from_secs(120));
        assert_eq!(config.multi_code_retry_timeout, Duration::from_secs(60));
        assert_eq!(config.decode_timeout, Duration::from_secs(10));
        assert!(config.decode_authorization_messages);
        assert_eq!(config.backoff.initial_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_config_from_toml() {
        let config: ResilienceConfig = toml::from_str(
            r#"
            multi_code_retry_timeout = 30
            decode_authorization_messages = false

            [backoff]
            initial_delay = 200
            jitter = 0.0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.multi_code_retry_timeout, Duration::from_secs(30));
        assert_eq!(config.retry_timeout, Duration::from_secs(120));
        assert!(!config.decode_authorization_messages);
        assert_eq!(config.backoff.initial_delay, Duration::from_millis(200));
        assert_eq!(config.backoff.max_delay, Duration::from_secs(10));
    }

    #[test]
    fn test_config_serializes_to_plain_numbers() {
        let value = serde_json::to_value(ResilienceConfig::default()).unwrap();
        assert_eq!(value["retry_timeout"], 120);
        assert_eq!(value["backoff"]["min_delay"], 25);
    }

    #[test]
    fn test_backoff_builder_uses_shape() {
        let backoff = BackoffConfig {
            jitter: 0.0,
            ..Default::default()
        }
        .builder()
        .timeout(Duration::from_secs(1))
        .build();

        assert_eq!(backoff.timeout(), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(0), Duration::from_millis(500));
        assert_eq!(backoff.next_delay(1), Duration::from_secs(1));
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_config_from_env_variables() {
        temp_env::with_vars(
            [
                ("AWSGUARD_RETRY_TIMEOUT", Some("300")),
                ("AWSGUARD_MULTI_CODE_RETRY_TIMEOUT", Some("90")),
                ("AWSGUARD_DECODE_TIMEOUT", Some("3")),
                ("AWSGUARD_DECODE_AUTHORIZATION_MESSAGES", Some("false")),
            ],
            || {
                let config = ResilienceConfig::from_env().expect("valid environment");
                assert_eq!(config.retry_timeout, Duration::from_secs(300));
                assert_eq!(config.multi_code_retry_timeout, Duration::from_secs(90));
                assert_eq!(config.decode_timeout, Duration::from_secs(3));
                assert!(!config.decode_authorization_messages);
            },
        );
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_config_from_env_rejects_garbage() {
        temp_env::with_var("AWSGUARD_DECODE_TIMEOUT", Some("soon"), || {
            let err = ResilienceConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("AWSGUARD_DECODE_TIMEOUT"));
        });
    }
}
