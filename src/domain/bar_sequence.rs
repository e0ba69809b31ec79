//! Caller-side preconditions on a bar sequence.
//!
//! The pipeline assumes strictly increasing, unique timestamps with
//! market-closed bars already removed. Loaders call these before a run.

use crate::domain::error::PotraderError;
use crate::domain::ohlcv::Bar;

/// Reject duplicate or non-increasing timestamps.
pub fn validate_bar_sequence(bars: &[Bar]) -> Result<(), PotraderError> {
    for (i, pair) in bars.windows(2).enumerate() {
        let (prev, curr) = (&pair[0], &pair[1]);
        if curr.timestamp == prev.timestamp {
            return Err(PotraderError::DuplicateTimestamp {
                index: i + 1,
                timestamp: curr.timestamp,
            });
        }
        if curr.timestamp < prev.timestamp {
            return Err(PotraderError::UnorderedBars {
                index: i + 1,
                timestamp: curr.timestamp,
            });
        }
    }
    Ok(())
}

/// Drop bars where open == high == low == close. Returns the kept bars and
/// the number removed.
pub fn remove_market_closed(bars: Vec<Bar>) -> (Vec<Bar>, usize) {
    let before = bars.len();
    let kept: Vec<Bar> = bars.into_iter().filter(|b| !b.is_market_closed()).collect();
    let removed = before - kept.len();
    (kept, removed)
}
