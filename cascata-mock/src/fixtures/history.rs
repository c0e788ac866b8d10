use cascata_core::DailyBar;
use chrono::NaiveDate;

use super::dec;

type Row = (u32, i64, i64, i64, i64, u64);

pub fn by_symbol(s: &str) -> Option<Vec<DailyBar>> {
    let rows: &[Row] = match s {
        "AAPL" => &[
            (2, 18500, 18700, 18400, 18600, 41_000_000),
            (3, 18600, 18900, 18550, 18850, 39_500_000),
            (4, 18850, 19050, 18800, 19000, 44_200_000),
        ],
        "MSFT" => &[
            (2, 41000, 41500, 40900, 41400, 18_000_000),
            (3, 41400, 41800, 41300, 41700, 17_100_000),
            (4, 41700, 42100, 41600, 42000, 19_300_000),
        ],
        "SPY" => &[
            (2, 50800, 51000, 50700, 50900, 60_000_000),
            (3, 50900, 51100, 50850, 51000, 58_000_000),
            (4, 51000, 51250, 50950, 51200, 61_000_000),
        ],
        _ => return None,
    };
    rows.iter().map(bar).collect()
}

fn bar(&(day, o, h, l, c, v): &Row) -> Option<DailyBar> {
    Some(DailyBar {
        date: NaiveDate::from_ymd_opt(2024, 1, day)?,
        open: dec(o, 2),
        high: dec(h, 2),
        low: dec(l, 2),
        close: dec(c, 2),
        volume: Some(v),
    })
}
