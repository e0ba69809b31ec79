//! Simple moving average of close.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i])
//! Warmup: first (n-1) bars are undefined. A window containing a missing close
//! is undefined as well.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let value = if period == 0 || i + 1 < period {
            None
        } else {
            let window = &bars[i + 1 - period..=i];
            if window.iter().all(|b| b.close.is_finite()) {
                Some(window.iter().map(|b| b.close).sum::<f64>() / period as f64)
            } else {
                None
            }
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
