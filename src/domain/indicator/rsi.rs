//! RSI (Relative Strength Index).
//!
//! Average gain/loss are simple rolling means of the last n close-to-close
//! changes (no Wilder smoothing):
//! - gain = max(change, 0), loss = max(-change, 0)
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! - If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are undefined (n changes are needed).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let value = if period == 0 || i < period {
            None
        } else {
            rsi_at(&bars[i - period..=i], period)
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

/// RSI over a window of `period + 1` closes.
fn rsi_at(window: &[Bar], period: usize) -> Option<f64> {
    if window.iter().any(|b| !b.close.is_finite()) {
        return None;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let change = pair[1].close - pair[0].close;
        if change > 0.0 {
            gains += change;
        } else if change < 0.0 {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    };
    Some(rsi)
}
