use cascata::HistoryRequest;
use cascata_demos::common::build_cascata;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Human-friendly subscriber with env-based filtering.
    // Suggested: RUST_LOG=info,cascata=debug,cascata_providers=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    // Mock connector in CI when CASCATA_DEMOS_USE_MOCK is set.
    let cascata = build_cascata()?;

    // First call misses and walks the chain; the second is served from cache.
    let _ = cascata.cached_quotes(&["AAPL", "MSFT"]).await?;
    let _ = cascata.cached_quotes(&["MSFT", "AAPL"]).await?;

    let req = HistoryRequest::try_new("AAPL", 30)?;
    let _ = cascata.history(&req).await?;

    Ok(())
}
