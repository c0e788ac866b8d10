use cascata_core::{Decimal, Quote};

use super::dec;

pub fn by_symbol(s: &str) -> Option<Quote> {
    match s {
        "AAPL" => Some(q("AAPL", dec(19000, 2), dec(18800, 2))),
        "MSFT" => Some(q("MSFT", dec(42000, 2), dec(41800, 2))),
        "NVDA" => Some(q("NVDA", dec(100000, 2), dec(99000, 2))),
        "GOOGL" => Some(q("GOOGL", dec(15000, 2), dec(14800, 2))),
        "KO" => Some(q("KO", dec(6000, 2), dec(5950, 2))),
        "SPY" => Some(q("SPY", dec(51200, 2), dec(51000, 2))),
        "BTC-USD" => Some(q("BTC-USD", dec(6500000, 2), dec(6400000, 2))),
        // Upstreams occasionally answer with a zeroed quote for delisted tickers.
        "BAD" => Some(Quote {
            symbol: "BAD".to_string(),
            price: Some(Decimal::ZERO),
            change: None,
            change_percent: None,
            high: None,
            low: None,
            prev_close: None,
        }),
        _ => None,
    }
}

fn q(symbol: &str, price: Decimal, prev_close: Decimal) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        price: Some(price),
        change: None,
        change_percent: None,
        high: Some(price.max(prev_close)),
        low: Some(price.min(prev_close)),
        prev_close: Some(prev_close),
    }
    .with_derived_change()
}
