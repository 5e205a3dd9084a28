//! Common test utilities and helpers

use async_trait::async_trait;
use awsguard::decode::AuthorizationDecoder;
use awsguard::{AwsError, Error};
use std::sync::Mutex;

/// Message of a typical EC2 denial carrying an encoded token.
#[allow(dead_code)]
pub const ENCODED_DENIAL: &str = "You are not authorized to perform this operation. Encoded authorization failure message: 4p2k-Xy_9";

/// Build the API error an EC2 call returns when it is denied.
#[allow(dead_code)]
pub fn encoded_denial() -> Error {
    Error::from(AwsError::request_failure(
        "UnauthorizedOperation",
        ENCODED_DENIAL,
        403,
    ))
}

/// Decoder that answers from a script and records every token it saw.
#[allow(dead_code)]
pub struct ScriptedDecoder {
    answer: Result<String, AwsError>,
    seen: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedDecoder {
    pub fn decoding_to(text: &str) -> Self {
        Self {
            answer: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_with(code: &str) -> Self {
        Self {
            answer: Err(AwsError::request_failure(
                code,
                "User is not authorized to perform: sts:DecodeAuthorizationMessage",
                403,
            )),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthorizationDecoder for ScriptedDecoder {
    async fn decode_authorization_message(&self, encoded_message: &str) -> Result<String, AwsError> {
        self.seen.lock().unwrap().push(encoded_message.to_string());
        self.answer.clone()
    }
}

/// Decoder that never answers.
#[allow(dead_code)]
pub struct SilentDecoder;

#[async_trait]
impl AuthorizationDecoder for SilentDecoder {
    async fn decode_authorization_message(&self, _encoded_message: &str) -> Result<String, AwsError> {
        std::future::pending().await
    }
}
