//! Per-bar indicator rows shared by the trend and signal layers.
//!
//! `compute_indicators` runs every indicator once and zips the series into a
//! typed `IndicatorRow` per bar, so downstream code never looks values up by
//! name.

use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::Bar;

/// Indicator periods. `ma_periods` is ordered short, medium, long; the long
/// MA doubles as the stop-loss reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndicatorConfig {
    pub ma_periods: [usize; 3],
    pub rsi_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_periods: [25, 75, 200],
            rsi_period: 14,
            atr_period: 14,
        }
    }
}

impl IndicatorConfig {
    /// Bars needed before every moving average is defined.
    pub fn warmup_bars(&self) -> usize {
        self.ma_periods.iter().copied().max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndicatorRow {
    pub close: Option<f64>,
    pub ma_short: Option<f64>,
    pub ma_medium: Option<f64>,
    pub ma_long: Option<f64>,
    /// MA minus its value one bar earlier.
    pub slope_short: Option<f64>,
    pub slope_medium: Option<f64>,
    pub slope_long: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
}

pub fn compute_indicators(bars: &[Bar], config: &IndicatorConfig) -> Vec<IndicatorRow> {
    let [short, medium, long] = config.ma_periods;
    let ma_short = calculate_sma(bars, short);
    let ma_medium = calculate_sma(bars, medium);
    let ma_long = calculate_sma(bars, long);
    let rsi = calculate_rsi(bars, config.rsi_period);
    let atr = calculate_atr(bars, config.atr_period);

    let mut rows: Vec<IndicatorRow> = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let mut row = IndicatorRow {
            close: bar.close_value(),
            ma_short: ma_short.value_at(i),
            ma_medium: ma_medium.value_at(i),
            ma_long: ma_long.value_at(i),
            rsi: rsi.value_at(i),
            atr: atr.value_at(i),
            ..IndicatorRow::default()
        };
        if let Some(prev) = i.checked_sub(1).and_then(|p| rows.get(p)) {
            row.slope_short = slope_delta(row.ma_short, prev.ma_short);
            row.slope_medium = slope_delta(row.ma_medium, prev.ma_medium);
            row.slope_long = slope_delta(row.ma_long, prev.ma_long);
        }
        rows.push(row);
    }

    rows
}

pub fn slope_delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(c), Some(p)) => Some(c - p),
        _ => None,
    }
}

/// (price - ma) / ma * 100; None when either side is undefined or ma is zero.
pub fn deviation_pct(price: Option<f64>, ma: Option<f64>) -> Option<f64> {
    let price = price.filter(|p| p.is_finite())?;
    let ma = ma.filter(|m| m.is_finite() && *m != 0.0)?;
    Some((price - ma) / ma * 100.0)
}

/// Bars before entry checked for the close-above-medium-MA share.
pub const PRE_ENTRY_WINDOW: usize = 10;
/// How far back the entry MA change is measured.
pub const MA_CHANGE_LOOKBACK: usize = 5;

/// Percent change of each MA from an earlier bar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaChangePct {
    pub short: Option<f64>,
    pub medium: Option<f64>,
    pub long: Option<f64>,
}

/// Percent of the `window` bars before `index` (excluding it) whose close is
/// above the medium MA. Bars missing either value are skipped; None when no
/// bar remains.
pub fn share_above_ma_medium(rows: &[IndicatorRow], index: usize, window: usize) -> Option<f64> {
    let start = index.saturating_sub(window);
    let (above, counted) = rows
        .get(start..index.min(rows.len()))?
        .iter()
        .filter_map(|r| Some(r.close? > r.ma_medium?))
        .fold((0usize, 0usize), |(above, counted), is_above| {
            (above + usize::from(is_above), counted + 1)
        });
    (counted > 0).then(|| above as f64 / counted as f64 * 100.0)
}

/// MA change at `index` relative to `lookback` bars earlier, clamped to the
/// first bar.
pub fn ma_change_pct(rows: &[IndicatorRow], index: usize, lookback: usize) -> MaChangePct {
    let earlier = rows.get(index.saturating_sub(lookback));
    let (Some(current), Some(earlier)) = (rows.get(index), earlier) else {
        return MaChangePct::default();
    };
    MaChangePct {
        short: deviation_pct(current.ma_short, earlier.ma_short),
        medium: deviation_pct(current.ma_medium, earlier.ma_medium),
        long: deviation_pct(current.ma_long, earlier.ma_long),
    }
}
