//! Core domain types and logic.

pub mod ohlcv;
pub mod bar_sequence;
pub mod indicator;
pub mod indicator_helpers;
pub mod trend;
pub mod signal;
pub mod strategy;
pub mod position;
pub mod simulator;
pub mod backtest;
pub mod metrics;
pub mod breakdown;
pub mod config_validation;
pub mod error;
