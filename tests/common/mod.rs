#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
pub use potrader::domain::ohlcv::Bar;
use potrader::domain::error::PotraderError;
use potrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<Bar>, PotraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PotraderError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).ok_or_else(|| PotraderError::NoData {
            symbol: symbol.to_string(),
        })?;
        Ok(bars
            .iter()
            .filter(|b| start.is_none_or(|s| b.timestamp >= s))
            .filter(|b| end.is_none_or(|e| b.timestamp <= e))
            .cloned()
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, PotraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, PotraderError> {
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.timestamp).min().unwrap();
                let max = bars.iter().map(|b| b.timestamp).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Daily bar `index` days after 2024-01-01 with a 0.5 range around `close`.
pub fn make_bar(index: usize, close: f64) -> Bar {
    Bar {
        timestamp: start_time() + Duration::days(index as i64),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect()
}

/// 301 daily closes: a slow uptrend (+0.1/day from 100), a three-bar dip of
/// 2.0 at bars 212..=214, then a 3.0/day slide from bar 261.
///
/// With default settings this produces exactly one bullish trade: entry at bar
/// 215 (close 121.5, the breakout back over MA25) and a stop-loss exit at bar
/// 264 (close 114.0, first close under MA200).
pub fn bullish_scenario_closes() -> Vec<f64> {
    (0..=300)
        .map(|i| {
            let mut close = 100.0 + 0.1 * i as f64;
            if (212..=214).contains(&i) {
                close -= 2.0;
            }
            if i > 260 {
                close = 126.0 - 3.0 * (i - 260) as f64;
            }
            close
        })
        .collect()
}

/// Mirror of [`bullish_scenario_closes`]: a slow downtrend from 200 with a
/// three-bar spike and a late rally. One bearish trade, entry at bar 215
/// (close 178.5), stop-loss exit at bar 264 (close 186.0).
pub fn bearish_scenario_closes() -> Vec<f64> {
    (0..=300)
        .map(|i| {
            let mut close = 200.0 - 0.1 * i as f64;
            if (212..=214).contains(&i) {
                close += 2.0;
            }
            if i > 260 {
                close = 174.0 + 3.0 * (i - 260) as f64;
            }
            close
        })
        .collect()
}

pub fn bullish_scenario() -> Vec<Bar> {
    bars_from_closes(&bullish_scenario_closes())
}

pub fn bearish_scenario() -> Vec<Bar> {
    bars_from_closes(&bearish_scenario_closes())
}

/// CSV text for `bars` in the `DateTime,Open,High,Low,Close,Volume` layout.
pub fn bars_to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("DateTime,Open,High,Low,Close,Volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},100\n",
            b.timestamp.format("%Y-%m-%d %H:%M:%S"),
            b.open,
            b.high,
            b.low,
            b.close
        ));
    }
    out
}
