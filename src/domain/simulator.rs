//! Single-position trade simulator.
//!
//! One forward pass over the bars with a FLAT/OPEN state machine:
//! - FLAT: an entry signal on a bar with a defined close opens a position at
//!   that close. Exits are not evaluated on the entry bar.
//! - OPEN: entry signals are ignored; the position closes on the first bar
//!   with a trend-matching MA cross or a close beyond the long MA.
//!
//! A position still open after the last bar is returned separately and never
//! becomes a `Trade`.

use tracing::{debug, warn};

use crate::domain::indicator_helpers::{
    ma_change_pct, share_above_ma_medium, IndicatorRow, MA_CHANGE_LOOKBACK, PRE_ENTRY_WINDOW,
};
use crate::domain::ohlcv::Bar;
use crate::domain::position::{ExitFill, ExitReason, OpenPosition, Trade, Trend};
use crate::domain::signal::SignalRow;
use crate::domain::strategy::ExitPrecedence;
use crate::domain::trend::TrendState;

#[derive(Debug, Clone, PartialEq)]
pub enum PositionState {
    Flat,
    Open(OpenPosition),
}

/// Exit rules for an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitPolicy {
    pub precedence: ExitPrecedence,
}

impl ExitPolicy {
    pub fn new(precedence: ExitPrecedence) -> Self {
        Self { precedence }
    }

    /// Dead cross closes a bullish position, golden cross a bearish one.
    pub fn cross_exit(trend: Trend, signal: &SignalRow) -> bool {
        match trend {
            Trend::Bullish => signal.exit_signal_bullish,
            Trend::Bearish => signal.exit_signal_bearish,
        }
    }

    /// Close below the long MA for bullish, above it for bearish.
    pub fn stop_loss_breached(trend: Trend, row: &IndicatorRow) -> bool {
        match (row.close, row.ma_long) {
            (Some(close), Some(ma)) => match trend {
                Trend::Bullish => close < ma,
                Trend::Bearish => close > ma,
            },
            _ => false,
        }
    }

    /// Exit reason for this bar, if the position should close. A bar without
    /// a close never exits.
    pub fn check(
        &self,
        trend: Trend,
        signal: &SignalRow,
        row: &IndicatorRow,
    ) -> Option<ExitReason> {
        row.close?;
        let cross = Self::cross_exit(trend, signal);
        let stop = Self::stop_loss_breached(trend, row);
        match self.precedence {
            ExitPrecedence::CrossExitFirst if cross => Some(ExitReason::CrossExit),
            ExitPrecedence::CrossExitFirst if stop => Some(ExitReason::StopLoss),
            ExitPrecedence::StopLossFirst if stop => Some(ExitReason::StopLoss),
            ExitPrecedence::StopLossFirst if cross => Some(ExitReason::CrossExit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationOutcome {
    pub trades: Vec<Trade>,
    pub open_position: Option<OpenPosition>,
}

pub fn simulate_trades(
    bars: &[Bar],
    rows: &[IndicatorRow],
    trends: &[TrendState],
    signals: &[SignalRow],
    policy: &ExitPolicy,
    initial_capital: f64,
    leverage: f64,
) -> SimulationOutcome {
    let len = bars.len().min(rows.len()).min(trends.len()).min(signals.len());
    let mut state = PositionState::Flat;
    let mut trades: Vec<Trade> = Vec::new();

    for i in 0..len {
        let row = &rows[i];
        let signal = &signals[i];

        state = match state {
            PositionState::Flat => match row.close {
                Some(close) if signal.entry_signal => {
                    let trend = if trends[i].breakout_bullish {
                        Trend::Bullish
                    } else {
                        Trend::Bearish
                    };
                    debug!(
                        index = i,
                        time = %bars[i].timestamp,
                        trend = trend.as_str(),
                        price = close,
                        "position opened"
                    );
                    PositionState::Open(OpenPosition {
                        trend,
                        entry_index: i,
                        entry_time: bars[i].timestamp,
                        entry_price: close,
                        entry_rsi: row.rsi,
                        entry_atr: row.atr,
                        entry_ma_short: row.ma_short,
                        entry_ma_medium: row.ma_medium,
                        pre_entry_above_ma_medium_pct: share_above_ma_medium(
                            rows,
                            i,
                            PRE_ENTRY_WINDOW,
                        ),
                        ma_change_pct: ma_change_pct(rows, i, MA_CHANGE_LOOKBACK),
                    })
                }
                _ => PositionState::Flat,
            },
            PositionState::Open(position) => {
                match (policy.check(position.trend, signal, row), row.close) {
                    (Some(reason), Some(price)) => {
                        let exit = ExitFill {
                            index: i,
                            time: bars[i].timestamp,
                            price,
                            reason,
                            rsi: row.rsi,
                        };
                        match Trade::close(&position, exit, initial_capital, leverage) {
                            Some(trade) => {
                                debug!(
                                    entry_index = trade.entry_index,
                                    exit_index = i,
                                    reason = reason.as_str(),
                                    profit_loss = trade.profit_loss,
                                    "position closed"
                                );
                                trades.push(trade);
                            }
                            None => warn!(
                                entry_index = position.entry_index,
                                entry_price = position.entry_price,
                                "dropping trade with unusable entry price"
                            ),
                        }
                        PositionState::Flat
                    }
                    _ => PositionState::Open(position),
                }
            }
        };
    }

    let open_position = match state {
        PositionState::Open(position) => Some(position),
        PositionState::Flat => None,
    };

    SimulationOutcome {
        trades,
        open_position,
    }
}
