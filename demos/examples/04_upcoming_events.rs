use cascata::EarningsWindow;
use cascata_demos::common::build_cascata;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cascata = build_cascata()?;

    // 1. Economic calendar for the week.
    println!("## Economic calendar");
    match cascata.economic_calendar().await {
        Ok(cal) => {
            for e in &cal.value {
                let time = e.time.as_deref().unwrap_or("all day");
                println!("{} {:>7}  {:?}  {}", e.date, time, e.importance, e.label);
            }
        }
        Err(e) => println!("calendar unavailable: {e}"),
    }

    // 2. Earnings over the next week.
    let today = chrono::Utc::now().date_naive();
    let window = EarningsWindow::upcoming(today, 7)?;
    println!("\n## Earnings {} .. {}", window.from(), window.to());
    match cascata.earnings(&window).await {
        Ok(rows) => {
            for r in &rows.value {
                println!("{}  {:<6} {}", r.date, r.symbol, r.hour.as_deref().unwrap_or(""));
            }
        }
        Err(e) => println!("earnings unavailable: {e}"),
    }

    // 3. Recent insider filings.
    println!("\n## Insider trades AAPL");
    match cascata.insider_trades("AAPL").await {
        Ok(rows) if rows.value.is_empty() => println!("no recent filings"),
        Ok(rows) => {
            for t in &rows.value {
                println!("{}  {:<24} {:>+10}", t.transaction_date, t.name, t.change);
            }
        }
        Err(e) => println!("insider trades unavailable: {e}"),
    }

    Ok(())
}
