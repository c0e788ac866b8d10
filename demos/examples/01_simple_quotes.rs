use cascata_demos::common::build_cascata;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Build the orchestrator (mock in CI when CASCATA_DEMOS_USE_MOCK is set).
    let cascata = build_cascata()?;

    // 2. Ask for a batch. Unknown or zero-priced symbols are listed as missing.
    let symbols = ["AAPL", "msft", " NVDA ", "BAD", "NOPE"];
    println!("Fetching quotes for {symbols:?}...");
    let batch = cascata.cached_quotes(&symbols).await?;

    // 3. Print what resolved.
    println!("cache: {}", batch.status.as_str());
    for (sym, q) in &batch.value.quotes {
        let price = q.price.map_or_else(|| "-".into(), |p| p.to_string());
        let pct = q
            .change_percent
            .map_or_else(String::new, |p| format!(" ({p}%)"));
        println!("{sym:>8}  {price}{pct}");
    }
    if !batch.value.missing.is_empty() {
        println!("missing: {}", batch.value.missing.join(", "));
    }

    Ok(())
}
