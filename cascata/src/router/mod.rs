pub mod calendar;
pub mod earnings;
pub mod forex;
pub mod history;
pub mod insider;
pub mod macros;
pub mod quotes;

pub mod util;
