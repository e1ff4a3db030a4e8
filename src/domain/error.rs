//! Domain error types.

/// Top-level error type for oco-backtest.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
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

    #[error("failed to read {file}: {reason}")]
    DataRead { file: String, reason: String },

    #[error("{file}, line {line}: {reason}")]
    DataParse {
        file: String,
        line: u64,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktestError {
    /// Process exit status for this error kind.
    pub fn exit_status(&self) -> u8 {
        match self {
            BacktestError::Io(_) | BacktestError::Report { .. } => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. } => 2,
            BacktestError::DataRead { .. } | BacktestError::DataParse { .. } => 3,
        }
    }
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

impl From<arrow::error::ArrowError> for BacktestError {
    fn from(err: arrow::error::ArrowError) -> Self {
        BacktestError::Report {
            reason: err.to_string(),
        }
    }
}

impl From<parquet::errors::ParquetError> for BacktestError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        BacktestError::Report {
            reason: err.to_string(),
        }
    }
}
