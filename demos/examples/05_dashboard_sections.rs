use std::sync::Arc;
use std::time::Duration;

use cascata::handlers;
use cascata::{CascataError, EmptyDefault, FxPair, SectionRegistry};
use cascata_demos::common::build_cascata;

fn to_json<T: serde::Serialize>(v: &T) -> Result<serde_json::Value, CascataError> {
    serde_json::to_value(v).map_err(|e| CascataError::Data(e.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    cascata_demos::common::init_tracing();
    let cascata = Arc::new(build_cascata()?);

    let quotes_src = Arc::clone(&cascata);
    let fx_src = Arc::clone(&cascata);
    let cal_src = Arc::clone(&cascata);
    let registry = SectionRegistry::builder()
        .section("quotes", Duration::from_secs(60), EmptyDefault::Map, move || {
            let c = Arc::clone(&quotes_src);
            async move {
                let batch = c.quotes(&["AAPL", "MSFT", "SPY"]).await?;
                to_json(&batch.quotes)
            }
        })
        .section("forex", Duration::from_secs(300), EmptyDefault::List, move || {
            let c = Arc::clone(&fx_src);
            async move {
                let pairs: Vec<FxPair> = vec!["EUR/USD".parse()?, "USD/JPY".parse()?];
                to_json(&c.forex(&pairs).await?.value)
            }
        })
        .section("calendar", Duration::from_secs(900), EmptyDefault::List, move || {
            let c = Arc::clone(&cal_src);
            async move { to_json(&c.economic_calendar().await?.value) }
        })
        .build()?;

    let aggregator = cascata.aggregator(registry);

    // Combined report: failing sections degrade to their empty default.
    let all = handlers::aggregate(&aggregator).await;
    println!("GET /sections -> {}", all.status);
    println!("{}", serde_json::to_string_pretty(&all.body)?);

    // Single section and an unknown one.
    let one = handlers::section(&aggregator, "quotes").await;
    println!("GET /sections/quotes -> {} (cache {})", one.status, one.body["meta"]["cache"]);
    let missing = handlers::section(&aggregator, "news").await;
    println!("GET /sections/news -> {} {}", missing.status, missing.body);

    Ok(())
}
