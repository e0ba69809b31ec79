//! Open positions and closed trades.
//!
//! A `Trade` only exists once a position is closed; it is built at the exit
//! bar by `Trade::close` and never mutated afterwards.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::indicator_helpers::{deviation_pct, MaChangePct};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Bullish => "bullish",
            Trend::Bearish => "bearish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    CrossExit,
    StopLoss,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::CrossExit => "cross_exit",
            ExitReason::StopLoss => "stop_loss",
        }
    }
}

/// Entry snapshot of a position that has not been closed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub trend: Trend,
    pub entry_index: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub entry_rsi: Option<f64>,
    pub entry_atr: Option<f64>,
    pub entry_ma_short: Option<f64>,
    pub entry_ma_medium: Option<f64>,
    /// Share of the bars before entry that closed above the medium MA.
    pub pre_entry_above_ma_medium_pct: Option<f64>,
    pub ma_change_pct: MaChangePct,
}

/// Where and why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitFill {
    pub index: usize,
    pub time: NaiveDateTime,
    pub price: f64,
    pub reason: ExitReason,
    pub rsi: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub trend: Trend,
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub price_change: f64,
    pub price_change_pct: f64,
    pub profit_loss: f64,
    pub profit_loss_pct: f64,
    /// Whole calendar days between entry and exit.
    pub duration_days: i64,
    pub entry_rsi: Option<f64>,
    pub exit_rsi: Option<f64>,
    pub entry_atr: Option<f64>,
    /// Entry price deviation from the short MA (MA25 by default), in percent.
    pub entry_ma_short_deviation_pct: Option<f64>,
    /// Entry price deviation from the medium MA (MA75 by default), in percent.
    pub entry_ma_medium_deviation_pct: Option<f64>,
    pub pre_entry_above_ma_medium_pct: Option<f64>,
    /// Change of each MA over the bars leading into entry, in percent.
    pub ma_change_pct: MaChangePct,
}

impl Trade {
    /// Close `position` at `exit`.
    ///
    /// position_size = capital * leverage;
    /// bullish P&L = (exit - entry) * position_size / entry, bearish is negated.
    /// Returns None when the entry or exit price cannot produce a trade.
    pub fn close(
        position: &OpenPosition,
        exit: ExitFill,
        initial_capital: f64,
        leverage: f64,
    ) -> Option<Trade> {
        let entry_price = position.entry_price;
        if !entry_price.is_finite() || entry_price == 0.0 || !exit.price.is_finite() {
            return None;
        }

        let position_size = initial_capital * leverage;
        let price_change = exit.price - entry_price;
        let price_change_pct = price_change / entry_price * 100.0;

        let direction = match position.trend {
            Trend::Bullish => 1.0,
            Trend::Bearish => -1.0,
        };
        let profit_loss = direction * price_change * position_size / entry_price;
        let profit_loss_pct = direction * price_change_pct * leverage;

        Some(Trade {
            trend: position.trend,
            entry_index: position.entry_index,
            exit_index: exit.index,
            entry_time: position.entry_time,
            exit_time: exit.time,
            entry_price,
            exit_price: exit.price,
            exit_reason: exit.reason,
            price_change,
            price_change_pct,
            profit_loss,
            profit_loss_pct,
            duration_days: (exit.time - position.entry_time).num_days(),
            entry_rsi: position.entry_rsi,
            exit_rsi: exit.rsi,
            entry_atr: position.entry_atr,
            entry_ma_short_deviation_pct: deviation_pct(
                Some(entry_price),
                position.entry_ma_short,
            ),
            entry_ma_medium_deviation_pct: deviation_pct(
                Some(entry_price),
                position.entry_ma_medium,
            ),
            pre_entry_above_ma_medium_pct: position.pre_entry_above_ma_medium_pct,
            ma_change_pct: position.ma_change_pct,
        })
    }

    pub fn is_win(&self) -> bool {
        self.profit_loss > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.profit_loss < 0.0
    }
}
