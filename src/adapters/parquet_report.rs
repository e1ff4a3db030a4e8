//! Parquet result writer (arrow record batch, single row group).

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use crate::ports::report_port::{column_names, ReportPort};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, TimestampNanosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetReportAdapter;

impl ParquetReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn schema(result: &BacktestResult) -> Schema {
        let names = column_names(result);
        let extra_count = result.extra_columns.len();
        let fields: Vec<Field> = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let data_type = match i {
                    0 => DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
                    i if i >= 2 && i < 2 + extra_count => DataType::Utf8,
                    _ if name == "post_count" => DataType::Int64,
                    _ => DataType::Float64,
                };
                Field::new(name, data_type, false)
            })
            .collect();
        Schema::new(fields)
    }

    pub fn to_record_batch(result: &BacktestResult) -> Result<RecordBatch, BacktestError> {
        let rows = &result.rows;
        let schema = Arc::new(Self::schema(result));

        let nanos = rows
            .iter()
            .map(|r| {
                let ts = r.metrics.tick.timestamp;
                ts.timestamp_nanos_opt().ok_or_else(|| BacktestError::Report {
                    reason: format!("timestamp {ts} is outside the nanosecond range"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let timestamps = TimestampNanosecondArray::from(nanos).with_timezone("UTC");

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(timestamps),
            Arc::new(Float64Array::from_iter_values(
                rows.iter().map(|r| r.metrics.tick.price),
            )),
        ];
        for col in 0..result.extra_columns.len() {
            columns.push(Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.metrics.tick.extra[col].as_str()),
            )));
        }
        columns.push(Arc::new(Float64Array::from_iter_values(
            rows.iter().map(|r| r.metrics.baseline_high),
        )));
        columns.push(Arc::new(Float64Array::from_iter_values(
            rows.iter().map(|r| r.metrics.baseline_low),
        )));
        columns.push(Arc::new(Float64Array::from_iter_values(
            rows.iter().map(|r| r.metrics.stdev_bp),
        )));
        columns.push(Arc::new(Int64Array::from_iter_values(
            rows.iter().map(|r| r.post_count as i64),
        )));

        Ok(RecordBatch::try_new(schema, columns)?)
    }
}

impl Default for ParquetReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for ParquetReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), BacktestError> {
        let batch = Self::to_record_batch(result)?;
        let file = File::create(output_path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }
}
