//! Memoization of backtest results.
//!
//! `run_backtest` is a pure function of (bars, strategy, config), so a result
//! can be reused for an identical request. The caller owns the cache and its
//! invalidation; the domain never consults it. Floats in the key are stored as
//! bit patterns so the key is `Eq + Hash`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::ohlcv::Bar;
use crate::domain::signal::ContinuationRule;
use crate::domain::strategy::{ExitPrecedence, StrategyConfig};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunKey {
    /// Identity of the bar sequence, e.g. "USDJPY:2024-01-01..2024-12-31".
    pub dataset: String,
    pub ma_periods: [usize; 3],
    pub rsi_period: usize,
    pub atr_period: usize,
    pub n_continued: usize,
    pub continuation_rule: ContinuationRule,
    pub exit_precedence: ExitPrecedence,
    pub rsi_lower_bits: u64,
    pub rsi_upper_bits: u64,
    pub leverage_bits: u64,
    pub initial_capital_bits: u64,
}

impl RunKey {
    pub fn new(
        dataset: impl Into<String>,
        strategy: &StrategyConfig,
        config: &BacktestConfig,
    ) -> Self {
        RunKey {
            dataset: dataset.into(),
            ma_periods: strategy.indicators.ma_periods,
            rsi_period: strategy.indicators.rsi_period,
            atr_period: strategy.indicators.atr_period,
            n_continued: strategy.signals.n_continued,
            continuation_rule: strategy.signals.continuation_rule,
            exit_precedence: strategy.exit_precedence,
            rsi_lower_bits: strategy.signals.rsi_lower.to_bits(),
            rsi_upper_bits: strategy.signals.rsi_upper.to_bits(),
            leverage_bits: config.leverage.to_bits(),
            initial_capital_bits: config.initial_capital.to_bits(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BacktestCache {
    entries: HashMap<RunKey, Arc<BacktestResult>>,
}

impl BacktestCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Cached result for `dataset` under this strategy/config, running the
    /// backtest on a miss.
    pub fn get_or_run(
        &mut self,
        dataset: &str,
        bars: &[Bar],
        strategy: &StrategyConfig,
        config: &BacktestConfig,
    ) -> Arc<BacktestResult> {
        let key = RunKey::new(dataset, strategy, config);
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                debug!(dataset, "backtest cache hit");
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => {
                debug!(dataset, "backtest cache miss");
                let result = Arc::new(run_backtest(bars, strategy, config));
                Arc::clone(entry.insert(result))
            }
        }
    }

    pub fn get(&self, key: &RunKey) -> Option<Arc<BacktestResult>> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: RunKey, result: BacktestResult) -> Arc<BacktestResult> {
        let result = Arc::new(result);
        self.entries.insert(key, Arc::clone(&result));
        result
    }

    /// Drop every entry computed from `dataset`. Returns how many were removed.
    pub fn invalidate_dataset(&mut self, dataset: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.dataset != dataset);
        let removed = before - self.entries.len();
        debug!(dataset, removed, "backtest cache invalidated");
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
