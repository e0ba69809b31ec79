//! CSV trade report adapter implementing ReportPort.
//!
//! One row per closed trade; undefined snapshot values are written as empty
//! cells.

use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::PotraderError;
use crate::domain::position::{ExitReason, Trade, Trend};
use crate::ports::report_port::ReportPort;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
struct TradeRow {
    entry_time: String,
    exit_time: String,
    trend: Trend,
    entry_price: f64,
    exit_price: f64,
    exit_reason: ExitReason,
    price_change: f64,
    price_change_pct: f64,
    profit_loss: f64,
    profit_loss_pct: f64,
    duration_days: i64,
    entry_rsi: Option<f64>,
    exit_rsi: Option<f64>,
    entry_atr: Option<f64>,
    entry_ma_short_deviation_pct: Option<f64>,
    entry_ma_medium_deviation_pct: Option<f64>,
    pre_entry_above_ma_medium_pct: Option<f64>,
    ma_short_change_pct: Option<f64>,
    ma_medium_change_pct: Option<f64>,
    ma_long_change_pct: Option<f64>,
}

impl From<&Trade> for TradeRow {
    fn from(t: &Trade) -> Self {
        TradeRow {
            entry_time: t.entry_time.format(TIME_FORMAT).to_string(),
            exit_time: t.exit_time.format(TIME_FORMAT).to_string(),
            trend: t.trend,
            entry_price: t.entry_price,
            exit_price: t.exit_price,
            exit_reason: t.exit_reason,
            price_change: t.price_change,
            price_change_pct: t.price_change_pct,
            profit_loss: t.profit_loss,
            profit_loss_pct: t.profit_loss_pct,
            duration_days: t.duration_days,
            entry_rsi: t.entry_rsi,
            exit_rsi: t.exit_rsi,
            entry_atr: t.entry_atr,
            entry_ma_short_deviation_pct: t.entry_ma_short_deviation_pct,
            entry_ma_medium_deviation_pct: t.entry_ma_medium_deviation_pct,
            pre_entry_above_ma_medium_pct: t.pre_entry_above_ma_medium_pct,
            ma_short_change_pct: t.ma_change_pct.short,
            ma_medium_change_pct: t.ma_change_pct.medium,
            ma_long_change_pct: t.ma_change_pct.long,
        }
    }
}

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize trades to any writer.
    pub fn write_trades<W: std::io::Write>(
        trades: &[Trade],
        writer: W,
    ) -> Result<(), PotraderError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for trade in trades {
            wtr.serialize(TradeRow::from(trade))
                .map_err(|e| PotraderError::Report {
                    reason: format!("failed to write trade row: {}", e),
                })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), PotraderError> {
        let file = std::fs::File::create(output_path).map_err(|e| PotraderError::Report {
            reason: format!("failed to create {}: {}", output_path, e),
        })?;
        Self::write_trades(&result.trades, file)?;
        tracing::info!(
            path = output_path,
            trades = result.trades.len(),
            "trade report written"
        );
        Ok(())
    }
}
