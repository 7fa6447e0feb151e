use std::error::Error;
use std::time::Instant;

use support_clock::{CircuitBreaker, ClockApiClient, SupportGateway, SUPPORT_UNAVAILABLE};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // RUST_LOG=support_clock=debug shows the breaker and retry decisions.
    tracing_subscriber::fmt::init();

    // Nothing listens here, so every attempt is refused immediately.
    let client = ClockApiClient::new("http://127.0.0.1:59999")?;
    let gateway = SupportGateway::new(client, CircuitBreaker::new());

    // The first request pays for the failed attempt and one backoff before
    // the breaker rejects the retry; the following requests short-circuit
    // and come back immediately.
    for request in 1..=3 {
        println!("\nRequest {request}:");
        let started = Instant::now();
        let info = gateway.support_info().await;
        let elapsed = started.elapsed();

        if info.support_number == SUPPORT_UNAVAILABLE {
            println!("  support line: {} (circuit open)", info.support_number);
        } else if info.support_number.is_empty() {
            println!("  support line unknown (dependency failing)");
        } else {
            println!("  support line: {}", info.support_number);
        }
        println!("  breaker is {}", gateway.breaker().state());
        println!("  answered in {elapsed:.2?}");
    }

    Ok(())
}
