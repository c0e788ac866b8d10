use cascata::{Cascata, StoreConfig};
use cascata_demos::common::get_connectors;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    cascata_demos::common::init_tracing();

    let path = std::env::temp_dir().join("cascata-demo-cache.sqlite3");
    let build = || {
        get_connectors()
            .into_iter()
            .fold(Cascata::builder(), |b, c| b.with_connector(c))
            .store_config(StoreConfig {
                sqlite_path: Some(path.clone()),
                ..StoreConfig::default()
            })
            .build()
    };

    // The first process populates the durable tier.
    let first = build()?;
    let a = first.cached_quotes(&["AAPL", "KO"]).await?;
    println!("first run:  {} (fetched {})", a.status.as_str(), a.fetched_at);
    drop(first);

    // A fresh orchestrator over the same file starts warm.
    let second = build()?;
    let b = second.cached_quotes(&["KO", "AAPL"]).await?;
    println!("second run: {} (fetched {})", b.status.as_str(), b.fetched_at);
    println!("cache file: {}", path.display());

    Ok(())
}
