//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::PotraderError;

/// Port for writing backtest results.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), PotraderError>;
}
