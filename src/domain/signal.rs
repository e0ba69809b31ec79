//! Entry and exit signal generation.
//!
//! Entry: a perfect-order breakout with RSI inside the admission band and the
//! perfect order held for the continuation window. Exit: MA short/medium
//! crosses (dead cross closes longs, golden cross closes shorts).

use crate::domain::indicator_helpers::IndicatorRow;
use crate::domain::trend::TrendState;

/// How the continuation window length is derived from N.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContinuationRule {
    /// Exactly N preceding bars.
    #[default]
    Exact,
    /// max(N, 3) preceding bars.
    MinimumThree,
}

impl ContinuationRule {
    pub fn window(&self, n_continued: usize) -> usize {
        match self {
            ContinuationRule::Exact => n_continued,
            ContinuationRule::MinimumThree => n_continued.max(3),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContinuationRule::Exact => "exact",
            ContinuationRule::MinimumThree => "minimum_three",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(ContinuationRule::Exact),
            "minimum_three" => Some(ContinuationRule::MinimumThree),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalConfig {
    pub n_continued: usize,
    pub continuation_rule: ContinuationRule,
    pub rsi_lower: f64,
    pub rsi_upper: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            n_continued: 1,
            continuation_rule: ContinuationRule::Exact,
            rsi_lower: 30.0,
            rsi_upper: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalRow {
    pub rsi_in_range: bool,
    pub perfect_order_continued: bool,
    pub entry_signal: bool,
    pub golden_cross: bool,
    pub dead_cross: bool,
    /// Closes a bullish position (dead cross).
    pub exit_signal_bullish: bool,
    /// Closes a bearish position (golden cross).
    pub exit_signal_bearish: bool,
}

/// Counts of each signal condition over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalSummary {
    pub bars: usize,
    pub bullish_perfect_order: usize,
    pub bearish_perfect_order: usize,
    pub perfect_order_continued: usize,
    pub breakout_bullish: usize,
    pub breakout_bearish: usize,
    pub rsi_in_range: usize,
    pub entry_signals: usize,
    pub golden_crosses: usize,
    pub dead_crosses: usize,
}

impl SignalSummary {
    pub fn from_rows(trends: &[TrendState], signals: &[SignalRow]) -> Self {
        let mut summary = SignalSummary {
            bars: trends.len(),
            ..SignalSummary::default()
        };
        for t in trends {
            summary.bullish_perfect_order += usize::from(t.is_bullish_perfect_order);
            summary.bearish_perfect_order += usize::from(t.is_bearish_perfect_order);
            summary.breakout_bullish += usize::from(t.breakout_bullish);
            summary.breakout_bearish += usize::from(t.breakout_bearish);
        }
        for s in signals {
            summary.perfect_order_continued += usize::from(s.perfect_order_continued);
            summary.rsi_in_range += usize::from(s.rsi_in_range);
            summary.entry_signals += usize::from(s.entry_signal);
            summary.golden_crosses += usize::from(s.golden_cross);
            summary.dead_crosses += usize::from(s.dead_cross);
        }
        summary
    }
}

pub fn rsi_in_range(rsi: Option<f64>, lower: f64, upper: f64) -> bool {
    rsi.is_some_and(|r| lower <= r && r <= upper)
}

/// MA short above MA medium; None while either is undefined.
fn short_above_medium(row: &IndicatorRow) -> Option<bool> {
    match (row.ma_short, row.ma_medium) {
        (Some(s), Some(m)) => Some(s > m),
        _ => None,
    }
}

/// MA short crossed above MA medium between `prev` and `curr`.
pub fn is_golden_cross(prev: &IndicatorRow, curr: &IndicatorRow) -> bool {
    matches!(
        (short_above_medium(prev), short_above_medium(curr)),
        (Some(false), Some(true))
    )
}

/// MA short crossed below MA medium between `prev` and `curr`.
pub fn is_dead_cross(prev: &IndicatorRow, curr: &IndicatorRow) -> bool {
    matches!(
        (short_above_medium(prev), short_above_medium(curr)),
        (Some(true), Some(false))
    )
}

/// Perfect order at `index` and at each of the `window` preceding bars.
/// Bars before the start of the series count as not held.
pub fn perfect_order_continued(trends: &[TrendState], index: usize, window: usize) -> bool {
    if index < window || index >= trends.len() {
        return false;
    }
    trends[index - window..=index].iter().all(|t| t.perfect_order)
}

pub fn generate_signals(
    rows: &[IndicatorRow],
    trends: &[TrendState],
    config: &SignalConfig,
) -> Vec<SignalRow> {
    let window = config.continuation_rule.window(config.n_continued);
    let len = rows.len().min(trends.len());
    let mut signals = Vec::with_capacity(len);

    for i in 0..len {
        let row = &rows[i];
        let trend = &trends[i];

        let in_range = rsi_in_range(row.rsi, config.rsi_lower, config.rsi_upper);
        let continued = perfect_order_continued(trends, i, window);
        let breakout = trend.breakout_bullish || trend.breakout_bearish;

        let (golden, dead) = match i.checked_sub(1) {
            Some(p) => (is_golden_cross(&rows[p], row), is_dead_cross(&rows[p], row)),
            None => (false, false),
        };

        signals.push(SignalRow {
            rsi_in_range: in_range,
            perfect_order_continued: continued,
            entry_signal: breakout && in_range && continued,
            golden_cross: golden,
            dead_cross: dead,
            exit_signal_bullish: dead,
            exit_signal_bearish: golden,
        });
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ma_row(short: f64, medium: f64) -> IndicatorRow {
        IndicatorRow {
            ma_short: Some(short),
            ma_medium: Some(medium),
            ..IndicatorRow::default()
        }
    }

    fn trend(perfect: bool, breakout_bullish: bool) -> TrendState {
        TrendState {
            is_bullish_perfect_order: perfect,
            perfect_order: perfect,
            breakout_bullish,
            ..TrendState::default()
        }
    }

    fn rsi_row(rsi: Option<f64>) -> IndicatorRow {
        IndicatorRow {
            rsi,
            ..IndicatorRow::default()
        }
    }

    #[test]
    fn continuation_window_lengths() {
        assert_eq!(ContinuationRule::Exact.window(1), 1);
        assert_eq!(ContinuationRule::Exact.window(5), 5);
        assert_eq!(ContinuationRule::MinimumThree.window(1), 3);
        assert_eq!(ContinuationRule::MinimumThree.window(4), 4);
    }

    #[test]
    fn continuation_rule_parse() {
        assert_eq!(ContinuationRule::parse("exact"), Some(ContinuationRule::Exact));
        assert_eq!(
            ContinuationRule::parse(" Minimum_Three "),
            Some(ContinuationRule::MinimumThree)
        );
        assert_eq!(ContinuationRule::parse("sometimes"), None);
        assert_eq!(ContinuationRule::parse("min3"), None);
        assert_eq!(ContinuationRule::MinimumThree.as_str(), "minimum_three");
    }

    #[test]
    fn rsi_band_inclusive() {
        assert!(rsi_in_range(Some(30.0), 30.0, 70.0));
        assert!(rsi_in_range(Some(70.0), 30.0, 70.0));
        assert!(!rsi_in_range(Some(29.99), 30.0, 70.0));
        assert!(!rsi_in_range(Some(70.01), 30.0, 70.0));
        assert!(!rsi_in_range(None, 30.0, 70.0));
    }

    #[test]
    fn golden_and_dead_cross_edges() {
        let below = ma_row(99.0, 100.0);
        let above = ma_row(101.0, 100.0);

        assert!(is_golden_cross(&below, &above));
        assert!(!is_golden_cross(&above, &above));
        assert!(is_dead_cross(&above, &below));
        assert!(!is_dead_cross(&below, &below));
    }

    #[test]
    fn equal_mas_count_as_not_above() {
        let equal = ma_row(100.0, 100.0);
        let above = ma_row(101.0, 100.0);
        assert!(is_golden_cross(&equal, &above));
        assert!(is_dead_cross(&above, &equal));
    }

    #[test]
    fn cross_needs_both_bars_defined() {
        let undefined = IndicatorRow::default();
        let above = ma_row(101.0, 100.0);
        let below = ma_row(99.0, 100.0);
        assert!(!is_golden_cross(&undefined, &above));
        assert!(!is_dead_cross(&undefined, &below));
        assert!(!is_dead_cross(&above, &undefined));
    }

    #[test]
    fn continued_counts_preceding_bars() {
        let trends = vec![
            trend(false, false),
            trend(true, false),
            trend(true, false),
            trend(true, false),
        ];
        assert!(!perfect_order_continued(&trends, 1, 1));
        assert!(perfect_order_continued(&trends, 2, 1));
        assert!(perfect_order_continued(&trends, 3, 2));
        assert!(!perfect_order_continued(&trends, 3, 3));
    }

    #[test]
    fn continued_before_series_start_is_false() {
        let trends = vec![trend(true, false), trend(true, false)];
        assert!(!perfect_order_continued(&trends, 0, 1));
        assert!(perfect_order_continued(&trends, 1, 1));
        assert!(!perfect_order_continued(&trends, 1, 2));
    }

    #[test]
    fn entry_requires_all_three_conditions() {
        let rows = vec![rsi_row(Some(50.0)), rsi_row(Some(50.0)), rsi_row(Some(50.0))];
        let trends = vec![trend(true, false), trend(true, false), trend(true, true)];
        let signals = generate_signals(&rows, &trends, &SignalConfig::default());

        assert!(signals[2].entry_signal);
        assert!(!signals[1].entry_signal, "no breakout at bar 1");
    }

    #[test]
    fn entry_blocked_by_rsi() {
        let rows = vec![rsi_row(Some(50.0)), rsi_row(Some(80.0))];
        let trends = vec![trend(true, false), trend(true, true)];
        let signals = generate_signals(&rows, &trends, &SignalConfig::default());
        assert!(!signals[1].rsi_in_range);
        assert!(!signals[1].entry_signal);
    }

    #[test]
    fn entry_blocked_by_undefined_rsi() {
        let rows = vec![rsi_row(None), rsi_row(None)];
        let trends = vec![trend(true, false), trend(true, true)];
        let signals = generate_signals(&rows, &trends, &SignalConfig::default());
        assert!(!signals[1].entry_signal);
    }

    #[test]
    fn entry_blocked_by_short_continuation() {
        let rows = vec![rsi_row(Some(50.0)); 3];
        let trends = vec![trend(false, false), trend(true, false), trend(true, true)];

        let exact = generate_signals(&rows, &trends, &SignalConfig::default());
        assert!(exact[2].entry_signal);

        let config = SignalConfig {
            continuation_rule: ContinuationRule::MinimumThree,
            ..SignalConfig::default()
        };
        let min_three = generate_signals(&rows, &trends, &config);
        assert!(!min_three[2].perfect_order_continued);
        assert!(!min_three[2].entry_signal);
    }

    #[test]
    fn exit_signals_map_to_crosses() {
        let rows = vec![ma_row(101.0, 100.0), ma_row(99.0, 100.0), ma_row(101.0, 100.0)];
        let trends = vec![TrendState::default(); 3];
        let signals = generate_signals(&rows, &trends, &SignalConfig::default());

        assert!(!signals[0].exit_signal_bullish && !signals[0].exit_signal_bearish);
        assert!(signals[1].exit_signal_bullish);
        assert!(signals[1].dead_cross);
        assert!(signals[2].exit_signal_bearish);
        assert!(signals[2].golden_cross);
    }

    #[test]
    fn summary_counts() {
        let rows = vec![rsi_row(Some(50.0)), rsi_row(Some(50.0)), rsi_row(Some(90.0))];
        let trends = vec![trend(true, false), trend(true, true), trend(false, false)];
        let signals = generate_signals(&rows, &trends, &SignalConfig::default());
        let summary = SignalSummary::from_rows(&trends, &signals);

        assert_eq!(summary.bars, 3);
        assert_eq!(summary.bullish_perfect_order, 2);
        assert_eq!(summary.bearish_perfect_order, 0);
        assert_eq!(summary.perfect_order_continued, 1);
        assert_eq!(summary.breakout_bullish, 1);
        assert_eq!(summary.rsi_in_range, 2);
        assert_eq!(summary.entry_signals, 1);
    }
}
