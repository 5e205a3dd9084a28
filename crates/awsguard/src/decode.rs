//! Decoding of encoded authorization failure messages
//!
//! Some API denials carry an opaque token instead of a readable reason:
//!
//! ```text
//! You are not authorized to perform this operation. Encoded authorization failure message: 4p2k...-Xy
//! ```
//!
//! Recovering the reason takes a signed round trip to a decode service. The
//! functions here make that round trip on behalf of the caller and swap the
//! decoded text into the error. Decoding is best effort: when the decoder is
//! missing, slow, or fails, the original error comes back untouched.

use crate::config::DEFAULT_DECODE_TIMEOUT;
use crate::error::{AwsError, Error, Result};
use crate::observability::DecodeOutcome;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

/// Pattern for an encoded authorization failure message.
///
/// Groups: prefix text, token (word characters and hyphens), trailing text.
static ENCODED_FAILURE_MESSAGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^(.*?)\s+Encoded authorization failure message: ([\w-]+)(.*)$")
        .expect("Failed to compile encoded authorization message regex")
});

/// A service able to turn an encoded authorization failure token into
/// plain text.
///
/// Usually backed by the cloud's security token service; see
/// `awsguard::sts::StsDecoder` with the `sts` feature.
#[async_trait]
pub trait AuthorizationDecoder: Send + Sync {
    /// Decode one token.
    async fn decode_authorization_message(
        &self,
        encoded_message: &str,
    ) -> std::result::Result<String, AwsError>;
}

/// The parts of a message that embeds an encoded authorization token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedAuthorizationMessage<'a> {
    /// Text before the marker, without the separating whitespace
    pub prefix: &'a str,
    /// The opaque token
    pub token: &'a str,
    /// Text after the token, kept verbatim
    pub trailing: &'a str,
}

impl<'a> EncodedAuthorizationMessage<'a> {
    /// Split `message` into prefix, token and trailing text, if it embeds an
    /// encoded authorization failure message.
    pub fn parse(message: &'a str) -> Option<Self> {
        let captures = ENCODED_FAILURE_MESSAGE_PATTERN.captures(message)?;
        Some(Self {
            prefix: captures.get(1).map_or("", |m| m.as_str()),
            token: captures.get(2)?.as_str(),
            trailing: captures.get(3).map_or("", |m| m.as_str()),
        })
    }

    /// The message with the token replaced by `decoded`.
    pub fn with_decoded(&self, decoded: &str) -> String {
        format!(
            "{} Authorization failure message: '{}'{}",
            self.prefix, decoded, self.trailing
        )
    }
}

/// Find an encoded authorization failure message in `message`.
///
/// ```rust
/// use awsguard::decode::extract_encoded_authorization_message;
///
/// let found = extract_encoded_authorization_message(
///     "Forbidden. Encoded authorization failure message: AbC-12",
/// )
/// .unwrap();
/// assert_eq!(found.token, "AbC-12");
/// ```
pub fn extract_encoded_authorization_message(
    message: &str,
) -> Option<EncodedAuthorizationMessage<'_>> {
    EncodedAuthorizationMessage::parse(message)
}

/// Replace an encoded authorization message in `err` with its decoded form.
///
/// Uses [`DEFAULT_DECODE_TIMEOUT`] for the decode call.
pub async fn decode_error(decoder: Option<&dyn AuthorizationDecoder>, err: Error) -> Error {
    decode_error_within(decoder, DEFAULT_DECODE_TIMEOUT, err).await
}

/// Replace an encoded authorization message in `err` with its decoded form,
/// giving the decode call at most `timeout`.
///
/// Returns `err` unchanged when there is no decoder, when the message does
/// not embed a token, or when decoding fails or times out. For API errors
/// only the message changes; code and status code are kept.
pub async fn decode_error_within(
    decoder: Option<&dyn AuthorizationDecoder>,
    timeout: Duration,
    err: Error,
) -> Error {
    let Some(decoder) = decoder else {
        return err;
    };

    let text = err.text();
    let Some(encoded) = extract_encoded_authorization_message(&text) else {
        return err;
    };

    let code = err.aws_error().map(|aws| aws.code().to_string());
    let outcome = match tokio::time::timeout(
        timeout,
        decoder.decode_authorization_message(encoded.token),
    )
    .await
    {
        Ok(Ok(decoded)) => {
            let rewritten = err.replace_text(encoded.with_decoded(&decoded));
            DecodeOutcome::Decoded.log(code.as_deref());
            return rewritten;
        }
        Ok(Err(decode_err)) => DecodeOutcome::Failed(decode_err.to_string()),
        Err(_) => DecodeOutcome::TimedOut(timeout),
    };

    outcome.log(code.as_deref());
    err
}

/// Pass `Ok` through and decode the error of an `Err`.
pub async fn decode_result<T>(
    decoder: Option<&dyn AuthorizationDecoder>,
    timeout: Duration,
    result: Result<T>,
) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => Err(decode_error_within(decoder, timeout, err).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const ENCODED: &str = "AccessDenied: you are not authorized. Encoded authorization failure message: AbCd123-xyz extra info";

    /// Decoder that answers from a fixed result and records the tokens it saw.
    struct FixedDecoder {
        answer: std::result::Result<String, AwsError>,
        seen: Mutex<Vec<String>>,
    }

    impl FixedDecoder {
        fn ok(text: &str) -> Self {
            Self {
                answer: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                answer: Err(AwsError::new("AccessDenied", "not allowed to decode")),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AuthorizationDecoder for FixedDecoder {
        async fn decode_authorization_message(
            &self,
            encoded_message: &str,
        ) -> std::result::Result<String, AwsError> {
            self.seen.lock().unwrap().push(encoded_message.to_string());
            self.answer.clone()
        }
    }

    struct HangingDecoder;

    #[async_trait]
    impl AuthorizationDecoder for HangingDecoder {
        async fn decode_authorization_message(
            &self,
            _encoded_message: &str,
        ) -> std::result::Result<String, AwsError> {
            std::future::pending().await
        }
    }

    fn denied() -> Error {
        Error::from(AwsError::request_failure("AccessDenied", ENCODED, 403))
    }

    #[test]
    fn test_parse_splits_message() {
        let parsed = EncodedAuthorizationMessage::parse(ENCODED).unwrap();
        assert_eq!(parsed.prefix, "AccessDenied: you are not authorized.");
        assert_eq!(parsed.token, "AbCd123-xyz");
        assert_eq!(parsed.trailing, " extra info");
    }

    #[test]
    fn test_parse_without_trailing_text() {
        let parsed =
            EncodedAuthorizationMessage::parse("Denied. Encoded authorization failure message: tok_1")
                .unwrap();
        assert_eq!(parsed.prefix, "Denied.");
        assert_eq!(parsed.token, "tok_1");
        assert_eq!(parsed.trailing, "");
    }

    #[test]
    fn test_parse_is_case_insensitive_and_spans_lines() {
        let parsed = EncodedAuthorizationMessage::parse(
            "Denied.\nencoded AUTHORIZATION failure message: abc\n\tstatus code: 403",
        )
        .unwrap();
        assert_eq!(parsed.prefix, "Denied.");
        assert_eq!(parsed.token, "abc");
        assert_eq!(parsed.trailing, "\n\tstatus code: 403");
    }

    #[test]
    fn test_parse_rejects_other_messages() {
        assert!(EncodedAuthorizationMessage::parse("AccessDenied: plain denial").is_none());
        assert!(
            EncodedAuthorizationMessage::parse("Encoded authorization failure message: abc")
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_decode_replaces_message() {
        let decoder = FixedDecoder::ok("DECODED_TEXT");
        let decoded = decode_error(Some(&decoder), denied()).await;

        let aws = decoded.aws_error().unwrap();
        assert_eq!(
            aws.message(),
            "AccessDenied: you are not authorized. Authorization failure message: 'DECODED_TEXT' extra info"
        );
        assert_eq!(aws.code(), "AccessDenied");
        assert_eq!(aws.status_code(), Some(403));
        assert_eq!(*decoder.seen.lock().unwrap(), vec!["AbCd123-xyz".to_string()]);
    }

    #[tokio::test]
    async fn test_decode_failure_keeps_original() {
        let decoder = FixedDecoder::failing();
        let result = decode_error(Some(&decoder), denied()).await;

        assert_eq!(result.aws_error().unwrap().message(), ENCODED);
        assert_eq!(decoder.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_pattern_is_untouched() {
        let decoder = FixedDecoder::ok("DECODED_TEXT");
        let original = AwsError::new("AccessDenied", "User is not authorized");
        let result = decode_error(Some(&decoder), Error::from(original.clone())).await;

        assert_eq!(result.aws_error(), Some(&original));
        assert!(decoder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_decoder_is_untouched() {
        let result = decode_error(None, denied()).await;
        assert_eq!(result.aws_error().unwrap().message(), ENCODED);
    }

    #[tokio::test]
    async fn test_context_wrapped_error_keeps_code() {
        let decoder = FixedDecoder::ok("DECODED");
        let err = Error::with_context(
            "creating instance",
            AwsError::request_failure(
                "UnauthorizedOperation",
                "Denied. Encoded authorization failure message: tok-1",
                403,
            ),
        );
        let decoded = decode_error(Some(&decoder), err).await;

        assert!(crate::classify::is_aws_err_code(&decoded, "UnauthorizedOperation"));
        assert!(crate::classify::is_aws_err_request_failure_status_code(&decoded, 403));
        assert_eq!(
            decoded.to_string(),
            "creating instance: UnauthorizedOperation: Denied. Authorization failure message: 'DECODED' (status code: 403)"
        );
        assert_eq!(*decoder.seen.lock().unwrap(), vec!["tok-1".to_string()]);
    }

    #[tokio::test]
    async fn test_plain_errors_are_decoded_too() {
        let decoder = FixedDecoder::ok("denied by SCP");
        let err = Error::message(
            "creating bucket: Forbidden. Encoded authorization failure message: zz-9",
        );
        let result = decode_error(Some(&decoder), err).await;

        assert_eq!(
            result.to_string(),
            "creating bucket: Forbidden. Authorization failure message: 'denied by SCP'"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_decoder_times_out() {
        let result =
            decode_error_within(Some(&HangingDecoder), Duration::from_secs(2), denied()).await;
        assert_eq!(result.aws_error().unwrap().message(), ENCODED);
    }

    #[tokio::test]
    async fn test_decode_result_passes_ok_through() {
        let decoder = FixedDecoder::ok("DECODED_TEXT");
        let result = decode_result(Some(&decoder), DEFAULT_DECODE_TIMEOUT, Ok(7)).await;

        assert_eq!(result.unwrap(), 7);
        assert!(decoder.seen.lock().unwrap().is_empty());
    }
}
