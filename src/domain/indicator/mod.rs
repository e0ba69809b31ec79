//! Technical indicator series.
//!
//! - `IndicatorPoint`: one bar's value; `None` while the indicator is warming up
//!   or when its inputs are missing
//! - `IndicatorType`: indicator identity + parameters (usable as a map key)
//! - `IndicatorSeries`: a time series aligned one-to-one with the input bars

pub mod atr;
pub mod rsi;
pub mod sma;

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Atr(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at bar `index`; None when undefined or out of range.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    /// Index of the first defined value, if any.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(|p| p.value.is_some())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(day: u32, value: Option<f64>) -> IndicatorPoint {
        IndicatorPoint {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            value,
        }
    }

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Sma(25).to_string(), "SMA(25)");
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
        assert_eq!(IndicatorType::Atr(14).to_string(), "ATR(14)");
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Sma(25), "short");
        map.insert(IndicatorType::Sma(75), "medium");

        assert_eq!(map.get(&IndicatorType::Sma(25)), Some(&"short"));
        assert_eq!(map.get(&IndicatorType::Sma(75)), Some(&"medium"));
        assert_eq!(map.get(&IndicatorType::Rsi(25)), None);
    }

    #[test]
    fn series_value_at_and_first_defined() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Sma(2),
            values: vec![point(1, None), point(2, Some(1.5)), point(3, Some(2.5))],
        };
        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), Some(1.5));
        assert_eq!(series.value_at(9), None);
        assert_eq!(series.first_defined(), Some(1));
        assert_eq!(series.len(), 3);
        assert!(!series.is_empty());
    }
}
