//! Backtest pipeline.
//!
//! bars → indicators → trend state → signals → trades → statistics, each stage
//! computed once in a forward pass. `run_backtest` is a pure function of its
//! inputs: no I/O, no clock, no randomness.

use tracing::debug;

use super::indicator_helpers::{compute_indicators, IndicatorRow};
use super::metrics::PerformanceStats;
use super::ohlcv::Bar;
use super::position::{OpenPosition, Trade};
use super::signal::{generate_signals, SignalRow, SignalSummary};
use super::simulator::{simulate_trades, ExitPolicy};
use super::strategy::StrategyConfig;
use super::trend::{classify_trends, TrendState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub leverage: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            leverage: 25.0,
        }
    }
}

impl BacktestConfig {
    /// Notional exposure: capital * leverage.
    pub fn position_size(&self) -> f64 {
        self.initial_capital * self.leverage
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub indicators: Vec<IndicatorRow>,
    pub trends: Vec<TrendState>,
    pub signals: Vec<SignalRow>,
    pub trades: Vec<Trade>,
    /// Position left open at the last bar; excluded from `trades`.
    pub open_position: Option<OpenPosition>,
    pub stats: PerformanceStats,
    pub signal_summary: SignalSummary,
}

pub fn run_backtest(
    bars: &[Bar],
    strategy: &StrategyConfig,
    config: &BacktestConfig,
) -> BacktestResult {
    let indicators = compute_indicators(bars, &strategy.indicators);
    let trends = classify_trends(&indicators);
    let signals = generate_signals(&indicators, &trends, &strategy.signals);

    let signal_summary = SignalSummary::from_rows(&trends, &signals);
    debug!(
        bars = signal_summary.bars,
        bullish_perfect_order = signal_summary.bullish_perfect_order,
        bearish_perfect_order = signal_summary.bearish_perfect_order,
        continued = signal_summary.perfect_order_continued,
        breakout_bullish = signal_summary.breakout_bullish,
        breakout_bearish = signal_summary.breakout_bearish,
        rsi_in_range = signal_summary.rsi_in_range,
        entry_signals = signal_summary.entry_signals,
        "signal conditions"
    );

    let policy = ExitPolicy::new(strategy.exit_precedence);
    let outcome = simulate_trades(
        bars,
        &indicators,
        &trends,
        &signals,
        &policy,
        config.initial_capital,
        config.leverage,
    );

    let stats = PerformanceStats::compute(&outcome.trades, config);
    debug!(
        trades = stats.total_trades,
        win_rate = stats.win_rate,
        total_profit_loss = stats.total_profit_loss,
        open = outcome.open_position.is_some(),
        "backtest complete"
    );

    BacktestResult {
        indicators,
        trends,
        signals,
        trades: outcome.trades,
        open_position: outcome.open_position,
        stats,
        signal_summary,
    }
}
