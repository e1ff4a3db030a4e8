//! CSV file data adapter.
//!
//! Posts need a `timestamp` column. The book needs `timestamp` and `price`;
//! its other columns are carried through as text and must not reuse the name
//! of a computed output column.

use crate::domain::book::{BookFrame, BookTick};
use crate::domain::error::BacktestError;
use crate::domain::post::Post;
use crate::domain::timestamp::parse_timestamp;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::METRIC_COLUMNS;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    posts_path: PathBuf,
    book_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PostRecord {
    timestamp: String,
}

impl CsvAdapter {
    pub fn new(posts_path: PathBuf, book_path: PathBuf) -> Self {
        Self {
            posts_path,
            book_path,
        }
    }

    fn open(path: &Path) -> Result<csv::Reader<File>, BacktestError> {
        csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| BacktestError::DataRead {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn parse_error(path: &Path, line: u64, reason: impl Into<String>) -> BacktestError {
        BacktestError::DataParse {
            file: path.display().to_string(),
            line,
            reason: reason.into(),
        }
    }

    fn header_index(
        path: &Path,
        headers: &csv::StringRecord,
        name: &str,
    ) -> Result<usize, BacktestError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Self::parse_error(path, 1, format!("missing {name} column")))
    }
}

fn record_line(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

impl DataPort for CsvAdapter {
    fn fetch_posts(&self) -> Result<Vec<Post>, BacktestError> {
        let path = self.posts_path.as_path();
        let mut rdr = Self::open(path)?;
        let headers = rdr
            .headers()
            .map_err(|e| Self::parse_error(path, 1, e.to_string()))?
            .clone();
        Self::header_index(path, &headers, "timestamp")?;

        let mut posts = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| {
                let line = e.position().map_or(0, |p| p.line());
                Self::parse_error(path, line, e.to_string())
            })?;
            let line = record_line(&record);
            let row: PostRecord = record
                .deserialize(Some(&headers))
                .map_err(|e| Self::parse_error(path, line, e.to_string()))?;
            let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
                Self::parse_error(path, line, format!("invalid timestamp {:?}", row.timestamp))
            })?;
            posts.push(Post { timestamp });
        }
        Ok(posts)
    }

    fn fetch_book(&self) -> Result<BookFrame, BacktestError> {
        let path = self.book_path.as_path();
        let mut rdr = Self::open(path)?;
        let headers = rdr
            .headers()
            .map_err(|e| Self::parse_error(path, 1, e.to_string()))?
            .clone();
        let ts_idx = Self::header_index(path, &headers, "timestamp")?;
        let price_idx = Self::header_index(path, &headers, "price")?;

        let extra_idx: Vec<usize> = (0..headers.len())
            .filter(|&i| i != ts_idx && i != price_idx)
            .collect();
        if let Some(clash) = extra_idx
            .iter()
            .map(|&i| &headers[i])
            .find(|name| METRIC_COLUMNS.contains(name))
        {
            return Err(Self::parse_error(
                path,
                1,
                format!("column {clash} collides with a computed output column"),
            ));
        }
        let extra_columns = extra_idx.iter().map(|&i| headers[i].to_string()).collect();

        let mut ticks = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| {
                let line = e.position().map_or(0, |p| p.line());
                Self::parse_error(path, line, e.to_string())
            })?;
            let line = record_line(&record);

            let ts_str = record.get(ts_idx).unwrap_or_default();
            let timestamp = parse_timestamp(ts_str).ok_or_else(|| {
                Self::parse_error(path, line, format!("invalid timestamp {:?}", ts_str))
            })?;

            let price_str = record.get(price_idx).unwrap_or_default();
            let price: f64 = price_str.parse().map_err(|_| {
                Self::parse_error(path, line, format!("invalid price {:?}", price_str))
            })?;
            if !price.is_finite() || price <= 0.0 {
                return Err(Self::parse_error(
                    path,
                    line,
                    format!("price must be positive, got {}", price_str),
                ));
            }

            let extra = extra_idx
                .iter()
                .map(|&i| record.get(i).unwrap_or_default().to_string())
                .collect();

            ticks.push(BookTick {
                timestamp,
                price,
                extra,
            });
        }

        Ok(BookFrame::new(extra_columns, ticks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup(posts: &str, book: &str) -> (TempDir, CsvAdapter) {
        let dir = TempDir::new().unwrap();
        let posts_path = dir.path().join("posts.csv");
        let book_path = dir.path().join("book.csv");
        fs::write(&posts_path, posts).unwrap();
        fs::write(&book_path, book).unwrap();
        (dir, CsvAdapter::new(posts_path, book_path))
    }

    #[test]
    fn fetch_posts_ignores_other_columns() {
        let (_dir, adapter) = setup(
            "id,timestamp,text\n1,2020-01-01T00:00:59Z,hello\n2,2020-01-01T00:01:00Z,\"a, b\"\n",
            "timestamp,price\n",
        );
        let posts = adapter.fetch_posts().unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(
            posts[1].timestamp,
            parse_timestamp("2020-01-01T00:01:00Z").unwrap()
        );
    }

    #[test]
    fn fetch_posts_missing_column() {
        let (_dir, adapter) = setup("id,text\n1,hello\n", "timestamp,price\n");
        let err = adapter.fetch_posts().unwrap_err();
        assert!(matches!(err, BacktestError::DataParse { line: 1, .. }));
    }

    #[test]
    fn fetch_posts_bad_timestamp_reports_line() {
        let (_dir, adapter) = setup(
            "timestamp\n2020-01-01T00:00:00Z\nnot-a-time\n",
            "timestamp,price\n",
        );
        let err = adapter.fetch_posts().unwrap_err();
        match err {
            BacktestError::DataParse { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("not-a-time"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fetch_book_keeps_extra_columns_in_order() {
        let (_dir, adapter) = setup(
            "timestamp\n",
            "venue,timestamp,size,price\nX,2020-01-01T00:00:00Z,5,100.5\nY,2020-01-01T00:00:01Z,7,101\n",
        );
        let frame = adapter.fetch_book().unwrap();

        assert_eq!(frame.extra_columns, vec!["venue", "size"]);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.ticks[0].price, 100.5);
        assert_eq!(frame.ticks[1].extra, vec!["Y", "7"]);
    }

    #[test]
    fn fetch_book_keeps_input_order() {
        let (_dir, adapter) = setup(
            "timestamp\n",
            "timestamp,price\n2020-01-01T00:00:02Z,1\n2020-01-01T00:00:01Z,2\n",
        );
        let frame = adapter.fetch_book().unwrap();
        assert!(!frame.is_sorted());
    }

    #[test]
    fn fetch_book_rejects_non_positive_price() {
        let (_dir, adapter) = setup("timestamp\n", "timestamp,price\n2020-01-01T00:00:00Z,0\n");
        assert!(matches!(
            adapter.fetch_book().unwrap_err(),
            BacktestError::DataParse { line: 2, .. }
        ));
    }

    #[test]
    fn fetch_book_rejects_non_numeric_price() {
        let (_dir, adapter) = setup("timestamp\n", "timestamp,price\n2020-01-01T00:00:00Z,abc\n");
        assert!(matches!(
            adapter.fetch_book().unwrap_err(),
            BacktestError::DataParse { .. }
        ));
    }

    #[test]
    fn fetch_book_rejects_empty_price() {
        let (_dir, adapter) = setup("timestamp\n", "timestamp,price\n2020-01-01T00:00:00Z,\n");
        assert!(matches!(
            adapter.fetch_book().unwrap_err(),
            BacktestError::DataParse { line: 2, .. }
        ));
    }

    #[test]
    fn fetch_book_rejects_column_named_like_output() {
        let (_dir, adapter) = setup(
            "timestamp\n",
            "timestamp,price,post_count\n2020-01-01T00:00:00Z,1,3\n",
        );
        match adapter.fetch_book().unwrap_err() {
            BacktestError::DataParse { line, reason, .. } => {
                assert_eq!(line, 1);
                assert!(reason.contains("post_count"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fetch_book_missing_price_column() {
        let (_dir, adapter) = setup("timestamp\n", "timestamp,bid\n2020-01-01T00:00:00Z,1\n");
        let err = adapter.fetch_book().unwrap_err();
        assert!(err.to_string().contains("missing price column"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let adapter = CsvAdapter::new(
            PathBuf::from("/nonexistent/posts.csv"),
            PathBuf::from("/nonexistent/book.csv"),
        );
        assert!(matches!(
            adapter.fetch_posts().unwrap_err(),
            BacktestError::DataRead { .. }
        ));
        assert!(matches!(
            adapter.fetch_book().unwrap_err(),
            BacktestError::DataRead { .. }
        ));
    }
}
