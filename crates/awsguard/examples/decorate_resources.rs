//! Decorate a resource map and watch an encoded denial get decoded.
//!
//! Run with: cargo run --example decorate_resources --features trace

use async_trait::async_trait;
use awsguard::decode::AuthorizationDecoder;
use awsguard::observability::init_tracing;
use awsguard::schema::{Resource, ResourceData, ResourceMap, crud_fn};
use awsguard::{AwsClient, AwsError, Error, make_authz_message_decoding_resources};
use futures::FutureExt;
use std::sync::Arc;

/// Stands in for the security token service.
struct LocalDecoder;

#[async_trait]
impl AuthorizationDecoder for LocalDecoder {
    async fn decode_authorization_message(&self, encoded_message: &str) -> Result<String, AwsError> {
        Ok(format!(
            r#"{{"allowed":false,"explicitDeny":false,"context":{{"action":"ec2:RunInstances","token":"{encoded_message}"}}}}"#
        ))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut resources = ResourceMap::new();
    resources.insert(
        "aws_instance".to_string(),
        Resource::new().with_create(crud_fn(|_d, _client| {
            async {
                Err(Error::from(AwsError::request_failure(
                    "UnauthorizedOperation",
                    "You are not authorized to perform this operation. Encoded authorization failure message: 8xRz-Q2",
                    403,
                )))
            }
            .boxed()
        })),
    );

    let resources = make_authz_message_decoding_resources(resources);
    let client = AwsClient::new()
        .with_region("us-west-2")
        .with_decoder(Arc::new(LocalDecoder));

    let create = resources["aws_instance"]
        .create
        .clone()
        .ok_or("aws_instance has no create")?;
    let mut state = ResourceData::new();

    match create(&mut state, &client).await {
        Ok(()) => println!("created {:?}", state.id()),
        Err(err) => println!("create failed: {err}"),
    }

    Ok(())
}
