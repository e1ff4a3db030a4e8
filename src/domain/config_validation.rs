//! Configuration validation and conversion.
//!
//! Validates the `[backtest]` section before anything is read from disk.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::BacktestError;
use crate::domain::metrics::{
    WindowConfig, DEFAULT_BASELINE_WINDOW_SECS, DEFAULT_VOLATILITY_WINDOW_SECS,
};
use crate::ports::config_port::ConfigPort;
use chrono::Duration;

const SECTION: &str = "backtest";
const MAX_WINDOW_SECS: i64 = 86_400;
pub const MAX_LATENCY_MS: i64 = MAX_WINDOW_SECS * 1_000;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    ensure_integer(config, "latency_ms", "latency_ms must be a whole number of milliseconds")?;
    validate_latency(config.get_int(SECTION, "latency_ms", 0))?;
    validate_window(config, "baseline_window_secs", DEFAULT_BASELINE_WINDOW_SECS)?;
    validate_window(config, "volatility_window_secs", DEFAULT_VOLATILITY_WINDOW_SECS)?;
    Ok(())
}

pub fn validate_latency(latency_ms: i64) -> Result<(), BacktestError> {
    let reason = if latency_ms < 0 {
        "latency_ms must be non-negative".to_string()
    } else if latency_ms > MAX_LATENCY_MS {
        format!("latency_ms must be at most {MAX_LATENCY_MS}")
    } else {
        return Ok(());
    };
    Err(BacktestError::ConfigInvalid {
        section: SECTION.to_string(),
        key: "latency_ms".to_string(),
        reason,
    })
}

fn ensure_integer(config: &dyn ConfigPort, key: &str, reason: &str) -> Result<(), BacktestError> {
    match config.get_string(SECTION, key) {
        Some(raw) if raw.trim().parse::<i64>().is_err() => Err(BacktestError::ConfigInvalid {
            section: SECTION.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_window(config: &dyn ConfigPort, key: &str, default: i64) -> Result<(), BacktestError> {
    ensure_integer(config, key, &format!("{key} must be a whole number of seconds"))?;
    let value = config.get_int(SECTION, key, default);
    if value <= 0 || value > MAX_WINDOW_SECS {
        return Err(BacktestError::ConfigInvalid {
            section: SECTION.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be between 1 and {MAX_WINDOW_SECS}"),
        });
    }
    Ok(())
}

/// Build the run configuration. `latency_override` (from the command line)
/// wins over `[backtest] latency_ms`.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    latency_override: Option<i64>,
) -> Result<BacktestConfig, BacktestError> {
    validate_backtest_config(config)?;
    let latency_ms = match latency_override {
        Some(ms) => {
            validate_latency(ms)?;
            ms
        }
        None => config.get_int(SECTION, "latency_ms", 0),
    };

    Ok(BacktestConfig {
        latency: Duration::milliseconds(latency_ms),
        windows: WindowConfig {
            baseline: Duration::seconds(config.get_int(
                SECTION,
                "baseline_window_secs",
                DEFAULT_BASELINE_WINDOW_SECS,
            )),
            volatility: Duration::seconds(config.get_int(
                SECTION,
                "volatility_window_secs",
                DEFAULT_VOLATILITY_WINDOW_SECS,
            )),
        },
    })
}
