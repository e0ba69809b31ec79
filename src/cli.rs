//! CLI definition and dispatch.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::bar_sequence::validate_bar_sequence;
use crate::domain::breakdown::TradeBreakdown;
use crate::domain::config_validation::{
    parse_continuation_rule, parse_exit_precedence, parse_ma_periods, parse_time_bound, read_f64,
    read_usize, validate_config, MAX_N_CONTINUED,
};
use crate::domain::error::PotraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator_helpers::IndicatorConfig;
use crate::domain::signal::SignalConfig;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "potrader", about = "Perfect-order moving-average backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [data] symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Override [strategy] n_continued
        #[arg(long)]
        n_continued: Option<usize>,
        /// Write the trade list as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for a symbol, or list symbols
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

/// Where bars come from, as read from `[data]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub symbol: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub drop_market_closed: bool,
}

impl DataSettings {
    pub fn adapter(&self) -> CsvAdapter {
        CsvAdapter::new(self.dir.clone()).with_drop_market_closed(self.drop_market_closed)
    }

    pub fn require_symbol(&self) -> Result<&str, PotraderError> {
        self.symbol
            .as_deref()
            .ok_or_else(|| PotraderError::ConfigMissing {
                section: "data".into(),
                key: "symbol".into(),
            })
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            symbol,
            n_continued,
            output,
        } => run_backtest_command(&config, symbol.as_deref(), n_continued, output.as_deref())
            .map(|_| ()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PotraderError> {
    FileConfigAdapter::from_file(path).map_err(|e| PotraderError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_indicator_config(adapter: &dyn ConfigPort) -> Result<IndicatorConfig, PotraderError> {
    let defaults = IndicatorConfig::default();
    let ma_periods = match adapter.get_string("indicators", "ma_periods") {
        Some(value) => parse_ma_periods(&value)?,
        None => defaults.ma_periods,
    };
    Ok(IndicatorConfig {
        ma_periods,
        rsi_period: read_usize(adapter, "indicators", "rsi_period", defaults.rsi_period)?,
        atr_period: read_usize(adapter, "indicators", "atr_period", defaults.atr_period)?,
    })
}

pub fn build_strategy_config(adapter: &dyn ConfigPort) -> Result<StrategyConfig, PotraderError> {
    let defaults = SignalConfig::default();
    let continuation_rule = match adapter.get_string("strategy", "continuation_rule") {
        Some(value) => parse_continuation_rule(&value)?,
        None => defaults.continuation_rule,
    };
    let exit_precedence = match adapter.get_string("strategy", "exit_precedence") {
        Some(value) => parse_exit_precedence(&value)?,
        None => Default::default(),
    };

    Ok(StrategyConfig {
        indicators: build_indicator_config(adapter)?,
        signals: SignalConfig {
            n_continued: read_usize(adapter, "strategy", "n_continued", defaults.n_continued)?,
            continuation_rule,
            rsi_lower: read_f64(adapter, "strategy", "rsi_lower", defaults.rsi_lower)?,
            rsi_upper: read_f64(adapter, "strategy", "rsi_upper", defaults.rsi_upper)?,
        },
        exit_precedence,
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, PotraderError> {
    let defaults = BacktestConfig::default();
    Ok(BacktestConfig {
        initial_capital: read_f64(
            adapter,
            "backtest",
            "initial_capital",
            defaults.initial_capital,
        )?,
        leverage: read_f64(adapter, "backtest", "leverage", defaults.leverage)?,
    })
}

pub fn build_data_settings(
    adapter: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<DataSettings, PotraderError> {
    let symbol = symbol_override
        .map(str::to_string)
        .or_else(|| adapter.get_string("data", "symbol"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let start = adapter
        .get_string("data", "start")
        .map(|s| parse_time_bound(&s, "start", false))
        .transpose()?;
    let end = adapter
        .get_string("data", "end")
        .map(|s| parse_time_bound(&s, "end", true))
        .transpose()?;

    Ok(DataSettings {
        dir: PathBuf::from(
            adapter
                .get_string("data", "dir")
                .unwrap_or_else(|| "data".to_string()),
        ),
        symbol,
        start,
        end,
        drop_market_closed: adapter.get_bool("data", "drop_market_closed", true),
    })
}

/// Load, validate, run and report. Returns the result for callers that want
/// to inspect it.
pub fn run_backtest_command(
    config_path: &Path,
    symbol_override: Option<&str>,
    n_continued_override: Option<usize>,
    output_path: Option<&Path>,
) -> Result<BacktestResult, PotraderError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_config(&adapter)?;

    let mut strategy = build_strategy_config(&adapter)?;
    if let Some(n) = n_continued_override {
        if !(1..=MAX_N_CONTINUED).contains(&n) {
            return Err(PotraderError::invalid(
                "strategy",
                "n_continued",
                format!("n_continued must be between 1 and {MAX_N_CONTINUED}"),
            ));
        }
        strategy = strategy.with_n_continued(n);
    }
    let bt_config = build_backtest_config(&adapter)?;
    let settings = build_data_settings(&adapter, symbol_override)?;

    let data_port = settings.adapter();
    let report = output_path.map(|_| CsvReportAdapter::new());
    let result = run_backtest_pipeline(
        &data_port,
        &settings,
        &strategy,
        &bt_config,
        report.as_ref().map(|r| r as &dyn ReportPort),
        output_path,
    )?;
    Ok(result)
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    settings: &DataSettings,
    strategy: &StrategyConfig,
    bt_config: &BacktestConfig,
    report_port: Option<&dyn ReportPort>,
    output_path: Option<&Path>,
) -> Result<BacktestResult, PotraderError> {
    let symbol = settings.require_symbol()?;
    let bars = data_port.fetch_bars(symbol, settings.start, settings.end)?;
    if bars.is_empty() {
        return Err(PotraderError::NoData {
            symbol: symbol.to_string(),
        });
    }
    validate_bar_sequence(&bars)?;

    let warmup = strategy.indicators.warmup_bars();
    if bars.len() <= warmup {
        warn!(
            symbol,
            bars = bars.len(),
            warmup,
            "series too short for the long MA, no trades possible"
        );
    }

    let [short, medium, long] = strategy.indicators.ma_periods;
    eprintln!(
        "Running backtest: {} ({} bars, {} to {})",
        symbol,
        bars.len(),
        bars[0].timestamp,
        bars[bars.len() - 1].timestamp,
    );
    eprintln!(
        "  {} / {} / {}, {}, {}, N = {} ({}), exit precedence {}",
        IndicatorType::Sma(short),
        IndicatorType::Sma(medium),
        IndicatorType::Sma(long),
        IndicatorType::Rsi(strategy.indicators.rsi_period),
        IndicatorType::Atr(strategy.indicators.atr_period),
        strategy.signals.n_continued,
        strategy.signals.continuation_rule.as_str(),
        strategy.exit_precedence.as_str(),
    );

    let result = run_backtest(&bars, strategy, bt_config);
    print_summary(&result);

    if let (Some(port), Some(path)) = (report_port, output_path) {
        let path_str = path.to_str().ok_or_else(|| PotraderError::Report {
            reason: format!("output path is not valid UTF-8: {}", path.display()),
        })?;
        port.write(&result, path_str)?;
        eprintln!("\nTrades written to: {}", path.display());
    }
    Ok(result)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn print_summary(result: &BacktestResult) {
    let stats = &result.stats;
    let signals = &result.signal_summary;

    eprintln!("\n=== Signal Conditions ===");
    eprintln!("Bars:                   {}", signals.bars);
    eprintln!("Bullish perfect order:  {}", signals.bullish_perfect_order);
    eprintln!("Bearish perfect order:  {}", signals.bearish_perfect_order);
    eprintln!("Perfect order continued:{}", signals.perfect_order_continued);
    eprintln!("RSI in range:           {}", signals.rsi_in_range);
    eprintln!("Entry signals:          {}", signals.entry_signals);

    eprintln!("\n=== Results ===");
    eprintln!("Total Trades:     {}", stats.total_trades);
    eprintln!(
        "Wins / Losses:    {} / {} ({} breakeven)",
        stats.winning_trades, stats.losing_trades, stats.breakeven_trades
    );
    eprintln!("Win Rate:         {:.1}%", stats.win_rate);
    eprintln!("Total P&L:        {:.0}", stats.total_profit_loss);
    eprintln!("Total Return:     {:.2}%", stats.total_return_pct);
    eprintln!("Avg P&L:          {}", fmt_opt(stats.avg_profit_loss));
    eprintln!(
        "Max / Min P&L:    {} / {}",
        fmt_opt(stats.max_profit_loss),
        fmt_opt(stats.min_profit_loss)
    );
    eprintln!("Profit Factor:    {:.2}", stats.profit_factor);
    eprintln!("Avg Duration:     {} days", fmt_opt(stats.avg_duration_days));
    eprintln!(
        "Exit Reasons:     cross {} / stop loss {}",
        stats.exit_reasons.cross_exit, stats.exit_reasons.stop_loss
    );

    if stats.is_empty() {
        return;
    }

    let breakdown = TradeBreakdown::compute(&result.trades);
    eprintln!("\n=== By Trend ===");
    for t in breakdown.by_trend.iter().filter(|t| t.trades > 0) {
        eprintln!(
            "  {}:  {} trades, {:.1}% win rate, avg {}",
            t.trend.as_str(),
            t.trades,
            t.win_rate,
            fmt_opt(t.avg_profit_loss),
        );
    }
    eprintln!("\n=== By Entry RSI ===");
    for band in breakdown.by_rsi_band.iter().filter(|b| b.trades > 0) {
        eprintln!(
            "  ({:.0}, {:.0}]:  {} trades, {:.1}% win rate, avg {}",
            band.lower,
            band.upper,
            band.trades,
            band.win_rate,
            fmt_opt(band.avg_profit_loss),
        );
    }

    eprintln!("\n=== Entry Context (profit / loss mean) ===");
    let (profit, loss) = (&breakdown.profit_group, &breakdown.loss_group);
    let rows = [
        ("RSI", profit.entry_rsi, loss.entry_rsi),
        ("ATR", profit.entry_atr, loss.entry_atr),
        ("MA short dev %", profit.ma_short_deviation_pct, loss.ma_short_deviation_pct),
        ("MA medium dev %", profit.ma_medium_deviation_pct, loss.ma_medium_deviation_pct),
        (
            "Above MA medium %",
            profit.pre_entry_above_ma_medium_pct,
            loss.pre_entry_above_ma_medium_pct,
        ),
        ("MA short chg %", profit.ma_short_change_pct, loss.ma_short_change_pct),
        ("MA medium chg %", profit.ma_medium_change_pct, loss.ma_medium_change_pct),
        ("MA long chg %", profit.ma_long_change_pct, loss.ma_long_change_pct),
        ("Duration days", profit.duration_days, loss.duration_days),
    ];
    for (label, p, l) in rows {
        eprintln!("  {:<18} {} / {}", label, fmt_opt(p.mean), fmt_opt(l.mean));
    }
}

fn run_validate(config_path: &Path) -> Result<(), PotraderError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_config(&adapter)?;

    let strategy = build_strategy_config(&adapter)?;
    let bt_config = build_backtest_config(&adapter)?;
    let [short, medium, long] = strategy.indicators.ma_periods;
    eprintln!("  ma_periods:        {}, {}, {}", short, medium, long);
    eprintln!("  rsi_period:        {}", strategy.indicators.rsi_period);
    eprintln!("  atr_period:        {}", strategy.indicators.atr_period);
    eprintln!(
        "  n_continued:       {} ({})",
        strategy.signals.n_continued,
        strategy.signals.continuation_rule.as_str()
    );
    eprintln!(
        "  rsi band:          {} to {}",
        strategy.signals.rsi_lower, strategy.signals.rsi_upper
    );
    eprintln!("  exit_precedence:   {}", strategy.exit_precedence.as_str());
    eprintln!("  initial_capital:   {}", bt_config.initial_capital);
    eprintln!("  leverage:          {}", bt_config.leverage);
    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn run_info(config_path: &Path, symbol_override: Option<&str>) -> Result<(), PotraderError> {
    let adapter = load_config(config_path)?;
    let settings = build_data_settings(&adapter, symbol_override)?;
    let port = settings.adapter();

    let Some(symbol) = settings.symbol.as_deref() else {
        let symbols = port.list_symbols()?;
        if symbols.is_empty() {
            eprintln!("No symbols found in {}", settings.dir.display());
        } else {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found", symbols.len());
        }
        return Ok(());
    };

    match describe_range(&port, symbol)? {
        Some(line) => println!("{}", line),
        None => eprintln!("{}: no data found", symbol),
    }
    Ok(())
}

/// One-line summary of the bars available for `symbol`.
pub fn describe_range(
    port: &dyn DataPort,
    symbol: &str,
) -> Result<Option<String>, PotraderError> {
    let range = port.get_data_range(symbol)?;
    Ok(range.map(|(first, last, count)| {
        format!("{}: {} bars, {} to {}", symbol, count, first, last)
    }))
}
