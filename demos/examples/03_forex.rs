use cascata::FxPair;
use cascata_demos::common::build_cascata;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cascata = build_cascata()?;

    let pairs: Vec<FxPair> = ["EUR/USD", "USDJPY", "gbp-usd", "XXX/YYY"]
        .iter()
        .map(|p| p.parse())
        .collect::<Result<_, _>>()?;

    // Pairs no provider can price are omitted rather than failing the call.
    let rates = cascata.forex(&pairs).await?;
    println!("cache: {}", rates.status.as_str());
    for r in &rates.value {
        println!("{:>8}  {}", r.pair, r.price);
    }

    Ok(())
}
