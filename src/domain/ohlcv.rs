//! OHLC bar representation.

use chrono::NaiveDateTime;

/// A single price bar. A missing close is carried as a non-finite value.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    /// The close, or None when it is missing.
    pub fn close_value(&self) -> Option<f64> {
        self.close.is_finite().then_some(self.close)
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    ///
    /// Without a usable previous close this degrades to high - low.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let hl = self.high - self.low;
        match prev_close.filter(|c| c.is_finite()) {
            Some(pc) => {
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => hl,
        }
    }

    /// open == high == low == close: no trading happened during the bar.
    pub fn is_market_closed(&self) -> bool {
        self.open == self.close && self.close == self.high && self.high == self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = sample_bar();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((bar.true_range(Some(100.0)) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((bar.true_range(Some(70.0)) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = sample_bar();
        // high-low=20, |110-130|=20, |90-130|=40 → 40
        assert!((bar.true_range(Some(130.0)) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_without_previous_close() {
        let bar = sample_bar();
        assert!((bar.true_range(None) - 20.0).abs() < f64::EPSILON);
        assert!((bar.true_range(Some(f64::NAN)) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn close_value_missing() {
        let mut bar = sample_bar();
        assert_eq!(bar.close_value(), Some(105.0));
        bar.close = f64::NAN;
        assert_eq!(bar.close_value(), None);
    }

    #[test]
    fn market_closed_flat_bar() {
        let mut bar = sample_bar();
        assert!(!bar.is_market_closed());
        bar.open = 100.0;
        bar.high = 100.0;
        bar.low = 100.0;
        bar.close = 100.0;
        assert!(bar.is_market_closed());
    }
}
