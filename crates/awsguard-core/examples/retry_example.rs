//! Example: deadline-bounded retry with a caller-supplied predicate
//!
//! This example demonstrates:
//! 1. A transient failure that clears up before the deadline
//! 2. A fatal failure that is returned on the first attempt
//!
//! Run with:
//! ```bash
//! cargo run -p awsguard-core --example retry_example
//! ```

use awsguard_core::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// A simulated API that reports a busy state the first few times
struct FlakyApi {
    attempts: Arc<AtomicU32>,
    busy_for: u32,
}

impl FlakyApi {
    fn new(busy_for: u32) -> Self {
        Self {
            attempts: Arc::new(AtomicU32::new(0)),
            busy_for,
        }
    }

    async fn call(&self) -> Result<String, std::io::Error> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.busy_for {
            println!("  Attempt {}: busy", attempt + 1);
            Err(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "resource busy",
            ))
        } else {
            println!("  Attempt {}: ok", attempt + 1);
            Ok("API response data".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

fn is_busy(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
}

#[tokio::main]
async fn main() {
    let backoff = ExponentialBackoff::builder()
        .timeout(Duration::from_secs(5))
        .initial_delay(Duration::from_millis(50))
        .build();

    println!("Transient failure:");
    let api = FlakyApi::new(3);
    let start = Instant::now();
    let result = backoff.execute(is_busy, || api.call()).await;
    println!(
        "  -> {:?} after {} attempts in {:?}\n",
        result,
        api.total_attempts(),
        start.elapsed()
    );

    println!("Fatal failure:");
    let result = backoff
        .execute(is_busy, || async {
            Err::<(), _>(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "access denied",
            ))
        })
        .await;
    println!("  -> {:?}", result);
}
