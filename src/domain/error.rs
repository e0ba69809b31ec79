//! Domain error types.
//!
//! The backtest pipeline itself is infallible: missing history and degenerate
//! arithmetic surface as undefined values, not errors. These variants cover the
//! layers around it (configuration, data loading, precondition checks, reports).

use chrono::NaiveDateTime;

/// Top-level error type for potrader.
#[derive(Debug, thiserror::Error)]
pub enum PotraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("bars out of order at index {index}: {timestamp} is not after the previous bar")]
    UnorderedBars {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("duplicate timestamp {timestamp} at index {index}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PotraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        PotraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&PotraderError> for std::process::ExitCode {
    fn from(err: &PotraderError) -> Self {
        let code: u8 = match err {
            PotraderError::Io(_) => 1,
            PotraderError::ConfigParse { .. }
            | PotraderError::ConfigMissing { .. }
            | PotraderError::ConfigInvalid { .. } => 2,
            PotraderError::Data { .. }
            | PotraderError::NoData { .. }
            | PotraderError::UnorderedBars { .. }
            | PotraderError::DuplicateTimestamp { .. } => 5,
            PotraderError::Report { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn config_invalid_message() {
        let err = PotraderError::invalid("strategy", "n_continued", "must be between 1 and 5");
        assert_eq!(
            err.to_string(),
            "invalid config value [strategy] n_continued: must be between 1 and 5"
        );
    }

    #[test]
    fn unordered_bars_message_names_timestamp() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        let err = PotraderError::UnorderedBars {
            index: 7,
            timestamp: ts,
        };
        let msg = err.to_string();
        assert!(msg.contains("index 7"));
        assert!(msg.contains("2024-03-01 09:15:00"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PotraderError = io.into();
        assert!(matches!(err, PotraderError::Io(_)));
    }
}
