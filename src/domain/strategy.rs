//! Strategy configuration for the perfect-order rule set.

use crate::domain::indicator_helpers::IndicatorConfig;
use crate::domain::signal::{ContinuationRule, SignalConfig};

/// Which exit is recorded when a cross and a stop-loss breach land on the
/// same bar. Both exit at that bar's close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExitPrecedence {
    #[default]
    CrossExitFirst,
    StopLossFirst,
}

impl ExitPrecedence {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitPrecedence::CrossExitFirst => "cross_exit_first",
            ExitPrecedence::StopLossFirst => "stop_loss_first",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cross_exit_first" => Some(ExitPrecedence::CrossExitFirst),
            "stop_loss_first" => Some(ExitPrecedence::StopLossFirst),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrategyConfig {
    pub indicators: IndicatorConfig,
    pub signals: SignalConfig,
    pub exit_precedence: ExitPrecedence,
}

impl StrategyConfig {
    pub fn with_n_continued(mut self, n: usize) -> Self {
        self.signals.n_continued = n;
        self
    }

    pub fn with_continuation_rule(mut self, rule: ContinuationRule) -> Self {
        self.signals.continuation_rule = rule;
        self
    }

    pub fn with_exit_precedence(mut self, precedence: ExitPrecedence) -> Self {
        self.exit_precedence = precedence;
        self
    }
}
