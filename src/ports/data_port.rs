//! Bar data access port trait.

use crate::domain::error::PotraderError;
use crate::domain::ohlcv::Bar;
use chrono::NaiveDateTime;

pub trait DataPort {
    /// Bars for `symbol` within the inclusive bounds, sorted by time.
    fn fetch_bars(
        &self,
        symbol: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<Bar>, PotraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, PotraderError>;

    /// First timestamp, last timestamp and bar count, or None without data.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, PotraderError>;
}
