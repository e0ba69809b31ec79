//! CSV file data adapter.
//!
//! One file per symbol, `<base_path>/<symbol>.csv`, with a header row naming
//! `DateTime,Open,High,Low,Close` (an extra `Volume` column is ignored).
//! Empty price cells load as missing values.

use crate::domain::bar_sequence::remove_market_closed;
use crate::domain::error::PotraderError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

pub struct CsvAdapter {
    base_path: PathBuf,
    drop_market_closed: bool,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            drop_market_closed: false,
        }
    }

    /// Drop bars with open == high == low == close when fetching.
    pub fn with_drop_market_closed(mut self, drop: bool) -> Self {
        self.drop_market_closed = drop;
        self
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Every bar in the file, sorted by time, with no filtering applied.
    pub fn load_raw(&self, symbol: &str) -> Result<Vec<Bar>, PotraderError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PotraderError::NoData {
                    symbol: symbol.to_string(),
                })
            }
            Err(e) => {
                return Err(PotraderError::Data {
                    reason: format!("failed to read {}: {}", path.display(), e),
                })
            }
        };

        let mut bars = parse_bars(&content)?;
        bars.sort_by_key(|b| b.timestamp);

        let missing_close = bars.iter().filter(|b| !b.close.is_finite()).count();
        if missing_close > 0 {
            warn!(symbol, missing_close, "bars without a close price");
        }
        info!(symbol, bars = bars.len(), path = %path.display(), "loaded bars");
        Ok(bars)
    }

    fn apply_filters(&self, symbol: &str, bars: Vec<Bar>) -> Vec<Bar> {
        if !self.drop_market_closed {
            return bars;
        }
        let (kept, removed) = remove_market_closed(bars);
        if removed > 0 {
            info!(symbol, removed, "dropped market-closed bars");
        }
        kept
    }
}

/// Parse CSV text into bars, in file order.
pub fn parse_bars(content: &str) -> Result<Vec<Bar>, PotraderError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| PotraderError::Data {
            reason: format!("CSV header error: {}", e),
        })?
        .clone();

    let column = |names: &[&str]| -> Result<usize, PotraderError> {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
            .ok_or_else(|| PotraderError::Data {
                reason: format!("missing {} column", names[0]),
            })
    };
    let ts_col = column(&["datetime", "date", "timestamp", "time"])?;
    let open_col = column(&["open"])?;
    let high_col = column(&["high"])?;
    let low_col = column(&["low"])?;
    let close_col = column(&["close"])?;

    let mut bars = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let line = row + 2;
        let record = result.map_err(|e| PotraderError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;

        let ts_str = record.get(ts_col).unwrap_or_default();
        let timestamp = parse_timestamp(ts_str).ok_or_else(|| PotraderError::Data {
            reason: format!("invalid datetime '{}' on line {}", ts_str, line),
        })?;

        bars.push(Bar {
            timestamp,
            open: parse_price(record.get(open_col), "open", line)?,
            high: parse_price(record.get(high_col), "high", line)?,
            low: parse_price(record.get(low_col), "low", line)?,
            close: parse_price(record.get(close_col), "close", line)?,
        });
    }

    Ok(bars)
}

/// Accepts ISO-style timestamps, bare dates, and broker exports such as
/// `01.01.2024 00:00:00.000 GMT+0900` (the GMT offset is dropped and the wall
/// time kept).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let value = value.split(" GMT").next().unwrap_or(value).trim();

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_price(field: Option<&str>, name: &str, line: usize) -> Result<f64, PotraderError> {
    match field.map(str::trim) {
        None | Some("") => Ok(f64::NAN),
        Some(s) => s.parse().map_err(|e| PotraderError::Data {
            reason: format!("invalid {} value '{}' on line {}: {}", name, s, line, e),
        }),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<Bar>, PotraderError> {
        let bars: Vec<Bar> = self
            .load_raw(symbol)?
            .into_iter()
            .filter(|b| start.is_none_or(|s| b.timestamp >= s))
            .filter(|b| end.is_none_or(|e| b.timestamp <= e))
            .collect();
        Ok(self.apply_filters(symbol, bars))
    }

    fn list_symbols(&self) -> Result<Vec<String>, PotraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| PotraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| PotraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, PotraderError> {
        let bars = self.apply_filters(symbol, self.load_raw(symbol)?);
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp, bars.len())),
            _ => None,
        })
    }
}
