//! ATR (Average True Range).
//!
//! True range uses the previous close; the first bar falls back to high - low.
//! ATR is the simple rolling mean of true range with a minimum window of one
//! bar, so unlike SMA and RSI it is defined from the very first bar.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_atr(bars: &[Bar], period: usize) -> IndicatorSeries {
    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev_close = if i == 0 { None } else { bars[i - 1].close_value() };
            bar.true_range(prev_close)
        })
        .collect();

    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let value = if period == 0 {
            None
        } else {
            let start = (i + 1).saturating_sub(period);
            let finite: Vec<f64> = tr_values[start..=i]
                .iter()
                .copied()
                .filter(|tr| tr.is_finite())
                .collect();
            if finite.is_empty() {
                None
            } else {
                Some(finite.iter().sum::<f64>() / finite.len() as f64)
            }
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
