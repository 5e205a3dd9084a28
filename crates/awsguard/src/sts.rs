//! Authorization message decoding through the security token service
//!
//! Requires the `sts` feature. The caller needs the
//! `sts:DecodeAuthorizationMessage` permission; without it every decode
//! attempt fails and the original error is kept.

use crate::decode::AuthorizationDecoder;
use crate::error::AwsError;
use async_trait::async_trait;
use aws_sdk_sts::config::http::HttpResponse;
use aws_sdk_sts::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_sts::operation::RequestId;
use aws_sdk_sts::operation::decode_authorization_message::DecodeAuthorizationMessageError;

/// [`AuthorizationDecoder`] backed by `sts:DecodeAuthorizationMessage`.
#[derive(Debug, Clone)]
pub struct StsDecoder {
    client: aws_sdk_sts::Client,
}

impl StsDecoder {
    /// Decoder using the credentials and region of `sdk_config`.
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::from_client(aws_sdk_sts::Client::new(sdk_config))
    }

    /// Decoder around an existing client.
    pub fn from_client(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthorizationDecoder for StsDecoder {
    async fn decode_authorization_message(
        &self,
        encoded_message: &str,
    ) -> Result<String, AwsError> {
        let output = self
            .client
            .decode_authorization_message()
            .encoded_message(encoded_message)
            .send()
            .await
            .map_err(aws_error_from_sdk)?;

        output
            .decoded_message()
            .map(str::to_string)
            .ok_or_else(|| AwsError::new("EmptyResponse", "no decoded message in response"))
    }
}

fn aws_error_from_sdk(err: SdkError<DecodeAuthorizationMessageError, HttpResponse>) -> AwsError {
    let code = err.code().unwrap_or("Unknown").to_string();
    let message = err.message().map_or_else(|| err.to_string(), str::to_string);
    let mut aws = AwsError::new(code, message);

    if let Some(response) = err.raw_response() {
        aws = aws.with_status_code(response.status().as_u16());
    }
    if let Some(request_id) = err.request_id() {
        aws = aws.with_request_id(request_id);
    }
    aws
}
