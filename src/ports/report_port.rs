//! Result writing port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use std::path::Path;

/// Column names shared by every report format, in output order.
/// Pass-through book columns are inserted after `price`.
pub const LEADING_COLUMNS: [&str; 2] = ["timestamp", "price"];
pub const METRIC_COLUMNS: [&str; 4] = [
    "baseline_high",
    "baseline_low",
    "rolling_1s_stdev_bp",
    "post_count",
];

/// Port for writing the aligned result table.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), BacktestError>;
}

/// Full header for `result`, pass-through columns included.
pub fn column_names(result: &BacktestResult) -> Vec<String> {
    LEADING_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(result.extra_columns.iter().cloned())
        .chain(METRIC_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}
