//! CSV result writer. Same columns as the Parquet report.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use crate::ports::report_port::{column_names, ReportPort};
use chrono::SecondsFormat;
use std::path::Path;

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), BacktestError> {
        let report_err = |e: csv::Error| BacktestError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        };

        let mut wtr = csv::Writer::from_path(output_path).map_err(report_err)?;
        wtr.write_record(column_names(result)).map_err(report_err)?;

        for row in &result.rows {
            let m = &row.metrics;
            let mut record = Vec::with_capacity(6 + m.tick.extra.len());
            record.push(m.tick.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true));
            record.push(m.tick.price.to_string());
            record.extend(m.tick.extra.iter().cloned());
            record.push(m.baseline_high.to_string());
            record.push(m.baseline_low.to_string());
            record.push(m.stdev_bp.to_string());
            record.push(row.post_count.to_string());
            wtr.write_record(&record).map_err(report_err)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
