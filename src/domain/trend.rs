//! Perfect-order trend classification.
//!
//! A bar is in bullish perfect order when MA short > medium > long and all
//! three slopes share a sign; bearish is the mirror ordering with the same
//! slope rule. Undefined inputs never satisfy a condition.

use crate::domain::indicator_helpers::IndicatorRow;

/// Sign of a moving-average slope. A zero slope counts as non-positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slope {
    Positive,
    NonPositive,
}

impl Slope {
    /// None for an undefined (or NaN) slope.
    pub fn from_delta(delta: Option<f64>) -> Option<Slope> {
        match delta {
            Some(d) if d.is_nan() => None,
            Some(d) if d > 0.0 => Some(Slope::Positive),
            Some(_) => Some(Slope::NonPositive),
            None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrendState {
    pub is_bullish_perfect_order: bool,
    pub is_bearish_perfect_order: bool,
    pub perfect_order: bool,
    pub perfect_order_started: bool,
    pub perfect_order_ended: bool,
    pub breakout_bullish: bool,
    pub breakout_bearish: bool,
}

/// All three slopes defined and of equal sign.
pub fn slopes_aligned(row: &IndicatorRow) -> bool {
    let short = Slope::from_delta(row.slope_short);
    let medium = Slope::from_delta(row.slope_medium);
    let long = Slope::from_delta(row.slope_long);
    match (short, medium, long) {
        (Some(s), Some(m), Some(l)) => s == m && m == l,
        _ => false,
    }
}

pub fn is_bullish_perfect_order(row: &IndicatorRow) -> bool {
    match (row.ma_short, row.ma_medium, row.ma_long) {
        (Some(s), Some(m), Some(l)) => s > m && m > l && slopes_aligned(row),
        _ => false,
    }
}

pub fn is_bearish_perfect_order(row: &IndicatorRow) -> bool {
    match (row.ma_short, row.ma_medium, row.ma_long) {
        (Some(s), Some(m), Some(l)) => s < m && m < l && slopes_aligned(row),
        _ => false,
    }
}

/// close crossed above MA short between `prev` and `curr`.
fn crossed_above_short(prev: &IndicatorRow, curr: &IndicatorRow) -> bool {
    match (curr.close, curr.ma_short, prev.close, prev.ma_short) {
        (Some(c), Some(ma), Some(pc), Some(pma)) => c > ma && pc <= pma,
        _ => false,
    }
}

/// close crossed below MA short between `prev` and `curr`.
fn crossed_below_short(prev: &IndicatorRow, curr: &IndicatorRow) -> bool {
    match (curr.close, curr.ma_short, prev.close, prev.ma_short) {
        (Some(c), Some(ma), Some(pc), Some(pma)) => c < ma && pc >= pma,
        _ => false,
    }
}

pub fn classify_trends(rows: &[IndicatorRow]) -> Vec<TrendState> {
    let mut states: Vec<TrendState> = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let bullish = is_bullish_perfect_order(row);
        let bearish = is_bearish_perfect_order(row);
        let perfect_order = bullish || bearish;

        let prev_perfect = i > 0 && states[i - 1].perfect_order;
        let prev_row = i.checked_sub(1).map(|p| &rows[p]);

        states.push(TrendState {
            is_bullish_perfect_order: bullish,
            is_bearish_perfect_order: bearish,
            perfect_order,
            perfect_order_started: perfect_order && !prev_perfect,
            perfect_order_ended: !perfect_order && prev_perfect,
            breakout_bullish: bullish && prev_row.is_some_and(|p| crossed_above_short(p, row)),
            breakout_bearish: bearish && prev_row.is_some_and(|p| crossed_below_short(p, row)),
        });
    }

    states
}
