//! Performance statistics over a closed-trade list.
//!
//! Pure reduction: an empty trade list yields zero counts and undefined
//! (None) means/extremes, never an error.

use super::backtest::BacktestConfig;
use super::position::{ExitReason, Trade, Trend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitReasonCounts {
    pub cross_exit: usize,
    pub stop_loss: usize,
}

impl ExitReasonCounts {
    pub fn get(&self, reason: ExitReason) -> usize {
        match reason {
            ExitReason::CrossExit => self.cross_exit,
            ExitReason::StopLoss => self.stop_loss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrendCounts {
    pub bullish: usize,
    pub bearish: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    /// Percent, 0 when there are no trades.
    pub win_rate: f64,
    pub total_profit_loss: f64,
    pub total_profit_loss_pct: f64,
    pub avg_profit_loss: Option<f64>,
    pub max_profit_loss: Option<f64>,
    pub min_profit_loss: Option<f64>,
    pub avg_profit_loss_pct: Option<f64>,
    pub max_profit_loss_pct: Option<f64>,
    pub min_profit_loss_pct: Option<f64>,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_factor: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub avg_duration_days: Option<f64>,
    pub max_duration_days: Option<i64>,
    pub min_duration_days: Option<i64>,
    pub exit_reasons: ExitReasonCounts,
    pub trends: TrendCounts,
    /// sum(profit_loss) / initial_capital * 100
    pub total_return_pct: f64,
    pub initial_capital: f64,
    pub leverage: f64,
    pub position_size: f64,
}

impl PerformanceStats {
    pub fn compute(trades: &[Trade], config: &BacktestConfig) -> Self {
        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut breakeven_trades = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut win_streak = 0usize;
        let mut loss_streak = 0usize;
        let mut max_consecutive_wins = 0usize;
        let mut max_consecutive_losses = 0usize;
        let mut exit_reasons = ExitReasonCounts::default();
        let mut trends = TrendCounts::default();

        for trade in trades {
            let pnl = trade.profit_loss;
            if pnl > 0.0 {
                winning_trades += 1;
                total_wins += pnl;
                win_streak += 1;
                loss_streak = 0;
            } else if pnl < 0.0 {
                losing_trades += 1;
                total_losses += pnl.abs();
                loss_streak += 1;
                win_streak = 0;
            } else {
                breakeven_trades += 1;
                win_streak = 0;
                loss_streak = 0;
            }
            max_consecutive_wins = max_consecutive_wins.max(win_streak);
            max_consecutive_losses = max_consecutive_losses.max(loss_streak);

            match trade.exit_reason {
                ExitReason::CrossExit => exit_reasons.cross_exit += 1,
                ExitReason::StopLoss => exit_reasons.stop_loss += 1,
            }
            match trade.trend {
                Trend::Bullish => trends.bullish += 1,
                Trend::Bearish => trends.bearish += 1,
            }
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let pnl: Vec<f64> = trades.iter().map(|t| t.profit_loss).collect();
        let pnl_pct: Vec<f64> = trades.iter().map(|t| t.profit_loss_pct).collect();
        let durations: Vec<i64> = trades.iter().map(|t| t.duration_days).collect();

        let total_profit_loss: f64 = pnl.iter().sum();
        let total_profit_loss_pct: f64 = pnl_pct.iter().sum();

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if winning_trades > 0 {
            total_wins / winning_trades as f64
        } else {
            0.0
        };

        let avg_loss = if losing_trades > 0 {
            total_losses / losing_trades as f64
        } else {
            0.0
        };

        let total_return_pct = if config.initial_capital != 0.0 {
            total_profit_loss / config.initial_capital * 100.0
        } else {
            0.0
        };

        PerformanceStats {
            total_trades,
            winning_trades,
            losing_trades,
            breakeven_trades,
            win_rate,
            total_profit_loss,
            total_profit_loss_pct,
            avg_profit_loss: mean(&pnl),
            max_profit_loss: pnl.iter().copied().reduce(f64::max),
            min_profit_loss: pnl.iter().copied().reduce(f64::min),
            avg_profit_loss_pct: mean(&pnl_pct),
            max_profit_loss_pct: pnl_pct.iter().copied().reduce(f64::max),
            min_profit_loss_pct: pnl_pct.iter().copied().reduce(f64::min),
            avg_win,
            avg_loss,
            profit_factor,
            max_consecutive_wins,
            max_consecutive_losses,
            avg_duration_days: if durations.is_empty() {
                None
            } else {
                Some(durations.iter().sum::<i64>() as f64 / durations.len() as f64)
            },
            max_duration_days: durations.iter().copied().max(),
            min_duration_days: durations.iter().copied().min(),
            exit_reasons,
            trends,
            total_return_pct,
            initial_capital: config.initial_capital,
            leverage: config.leverage,
            position_size: config.position_size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_trades == 0
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
