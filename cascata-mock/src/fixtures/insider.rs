use cascata_core::InsiderTrade;
use chrono::NaiveDate;

use super::dec;

pub fn by_symbol(s: &str) -> Vec<InsiderTrade> {
    let rows: &[(&str, i64, i64, u32, i64, &str)] = match s {
        "AAPL" => &[
            ("COOK TIMOTHY D", -196_410, 3_280_180, 3, 18540, "S"),
            ("ADAMS KATHERINE L", -9_000, 428_000, 2, 18612, "S"),
        ],
        "MSFT" => &[("NADELLA SATYA", 25_000, 830_000, 4, 0, "A")],
        _ => &[],
    };
    rows.iter()
        .filter_map(|&(name, change, held, day, price, code)| {
            Some(InsiderTrade {
                symbol: s.to_string(),
                name: name.to_string(),
                change,
                shares_held: Some(held),
                transaction_date: NaiveDate::from_ymd_opt(2024, 1, day)?,
                transaction_price: (price != 0).then(|| dec(price, 2)),
                transaction_code: Some(code.to_string()),
            })
        })
        .collect()
}
