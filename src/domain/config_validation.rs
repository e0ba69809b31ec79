//! Configuration validation.
//!
//! Validates every section before a run. Missing keys fall back to their
//! defaults; present keys must parse and be in range.

use crate::domain::error::PotraderError;
use crate::domain::signal::ContinuationRule;
use crate::domain::strategy::ExitPrecedence;
use crate::ports::config_port::ConfigPort;
use chrono::{NaiveDate, NaiveDateTime};

pub const MAX_N_CONTINUED: usize = 5;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), PotraderError> {
    validate_data_config(config)?;
    validate_indicator_config(config)?;
    validate_strategy_config(config)?;
    validate_backtest_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), PotraderError> {
    if let Some(symbol) = config.get_string("data", "symbol") {
        if symbol.trim().is_empty() {
            return Err(PotraderError::invalid("data", "symbol", "symbol must not be empty"));
        }
    }

    let start = config
        .get_string("data", "start")
        .map(|s| parse_time_bound(&s, "start", false))
        .transpose()?;
    let end = config
        .get_string("data", "end")
        .map(|s| parse_time_bound(&s, "end", true))
        .transpose()?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(PotraderError::invalid("data", "start", "start must be before end"));
        }
    }
    Ok(())
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), PotraderError> {
    if let Some(value) = config.get_string("indicators", "ma_periods") {
        parse_ma_periods(&value)?;
    }
    for key in ["rsi_period", "atr_period"] {
        let period = read_usize(config, "indicators", key, 14)?;
        if period < 1 {
            return Err(PotraderError::invalid(
                "indicators",
                key,
                format!("{key} must be at least 1"),
            ));
        }
    }
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), PotraderError> {
    let n = read_usize(config, "strategy", "n_continued", 1)?;
    if !(1..=MAX_N_CONTINUED).contains(&n) {
        return Err(PotraderError::invalid(
            "strategy",
            "n_continued",
            format!("n_continued must be between 1 and {MAX_N_CONTINUED}"),
        ));
    }

    if let Some(value) = config.get_string("strategy", "continuation_rule") {
        parse_continuation_rule(&value)?;
    }
    if let Some(value) = config.get_string("strategy", "exit_precedence") {
        parse_exit_precedence(&value)?;
    }

    let lower = read_f64(config, "strategy", "rsi_lower", 30.0)?;
    let upper = read_f64(config, "strategy", "rsi_upper", 70.0)?;
    for (key, value) in [("rsi_lower", lower), ("rsi_upper", upper)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(PotraderError::invalid(
                "strategy",
                key,
                format!("{key} must be between 0 and 100"),
            ));
        }
    }
    if lower > upper {
        return Err(PotraderError::invalid(
            "strategy",
            "rsi_lower",
            "rsi_lower must not exceed rsi_upper",
        ));
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), PotraderError> {
    let capital = read_f64(config, "backtest", "initial_capital", 10_000.0)?;
    if capital <= 0.0 || !capital.is_finite() {
        return Err(PotraderError::invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    let leverage = read_f64(config, "backtest", "leverage", 25.0)?;
    if leverage <= 0.0 || !leverage.is_finite() {
        return Err(PotraderError::invalid(
            "backtest",
            "leverage",
            "leverage must be positive",
        ));
    }
    Ok(())
}

/// "25,75,200" → [25, 75, 200]; exactly three strictly increasing periods.
pub fn parse_ma_periods(value: &str) -> Result<[usize; 3], PotraderError> {
    let invalid = |reason: &str| PotraderError::invalid("indicators", "ma_periods", reason);

    let periods = value
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<Result<Vec<usize>, _>>()
        .map_err(|_| invalid("ma_periods must be comma-separated integers"))?;

    let periods: [usize; 3] = periods
        .try_into()
        .map_err(|_| invalid("ma_periods must list exactly three periods"))?;

    if periods[0] < 1 {
        return Err(invalid("ma_periods must be at least 1"));
    }
    if !(periods[0] < periods[1] && periods[1] < periods[2]) {
        return Err(invalid("ma_periods must be strictly increasing"));
    }
    Ok(periods)
}

pub fn parse_continuation_rule(value: &str) -> Result<ContinuationRule, PotraderError> {
    ContinuationRule::parse(value).ok_or_else(|| {
        PotraderError::invalid(
            "strategy",
            "continuation_rule",
            format!("unknown continuation_rule '{value}' (expected exact or minimum_three)"),
        )
    })
}

pub fn parse_exit_precedence(value: &str) -> Result<ExitPrecedence, PotraderError> {
    ExitPrecedence::parse(value).ok_or_else(|| {
        PotraderError::invalid(
            "strategy",
            "exit_precedence",
            format!(
                "unknown exit_precedence '{value}' (expected cross_exit_first or stop_loss_first)"
            ),
        )
    })
}

/// Parse a `[data]` start/end bound. A bare date covers the whole day:
/// midnight for a start bound, the last millisecond for an end bound.
pub fn parse_time_bound(value: &str, key: &str, end: bool) -> Result<NaiveDateTime, PotraderError> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        PotraderError::invalid(
            "data",
            key,
            format!("invalid {key} format, expected YYYY-MM-DD[ HH:MM[:SS]]"),
        )
    })?;
    let time = if end {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.ok_or_else(|| PotraderError::invalid("data", key, "date out of range"))
}

/// A present key must parse as an unsigned integer; a missing key yields
/// `default`.
pub fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, PotraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s.trim().parse::<usize>().map_err(|_| {
            PotraderError::invalid(section, key, format!("{key} must be a non-negative integer"))
        }),
    }
}

/// A present key must parse as a number; a missing key yields `default`.
pub fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, PotraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| PotraderError::invalid(section, key, format!("{key} must be a number"))),
    }
}
