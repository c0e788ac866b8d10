pub mod calendar;
pub mod earnings;
pub mod forex;
pub mod history;
pub mod insider;
pub mod quotes;

use rust_decimal::Decimal;

/// Fixed-point decimal, e.g. `dec(19050, 2)` is 190.50.
pub fn dec(mantissa: i64, scale: u32) -> Decimal {
    Decimal::new(mantissa, scale)
}
