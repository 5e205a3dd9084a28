//! Decode an encoded authorization failure message with real credentials.
//!
//! Run with: cargo run --example sts_decode --features sts,trace -- <encoded message>

use awsguard::decode::AuthorizationDecoder;
use awsguard::observability::init_tracing;
use awsguard::sts::StsDecoder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let encoded = std::env::args()
        .nth(1)
        .ok_or("usage: sts_decode <encoded message>")?;

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let decoder = StsDecoder::new(&sdk_config);

    let decoded = decoder.decode_authorization_message(&encoded).await?;
    println!("{decoded}");

    Ok(())
}
