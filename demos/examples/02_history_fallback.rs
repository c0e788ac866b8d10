use cascata::{Capability, Cascata, CascataError, HistoryRequest};
use cascata_demos::common::{USE_MOCK_ENV, get_connectors};
use cascata_mock::{DynamicMockConnector, MockBehavior};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    cascata_demos::common::init_tracing();

    // A primary that is down, in front of the real (or fixture) connectors.
    let (flaky, ctl) = DynamicMockConnector::new_with_capabilities("flaky", &[Capability::History]);
    ctl.set_history_behavior(
        "AAPL",
        MockBehavior::Fail(CascataError::unavailable("flaky", "HTTP 503")),
    )
    .await;

    let mut builder = Cascata::builder().with_connector(flaky);
    for c in get_connectors() {
        builder = builder.with_connector(c);
    }
    let cascata = builder.build()?;

    let req = HistoryRequest::try_new("AAPL", 30)?;
    let bars = cascata.history(&req).await?;
    println!(
        "{} bars for {} ({}), flaky primary called {} time(s)",
        bars.value.len(),
        req.symbol(),
        bars.status.as_str(),
        ctl.calls(Capability::History).await,
    );
    for b in bars.value.iter().rev().take(5) {
        println!("{}  o={} h={} l={} c={}", b.date, b.open, b.high, b.low, b.close);
    }
    if std::env::var(USE_MOCK_ENV).is_err() {
        println!("(set {USE_MOCK_ENV}=1 for offline fixtures)");
    }

    Ok(())
}
