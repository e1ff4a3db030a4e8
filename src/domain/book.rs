//! Order book price observations.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct BookTick {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    /// Values for `BookFrame::extra_columns`, same order.
    pub extra: Vec<String>,
}

/// Book rows plus the names of the columns carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFrame {
    pub extra_columns: Vec<String>,
    pub ticks: Vec<BookTick>,
}

impl BookFrame {
    pub fn new(extra_columns: Vec<String>, ticks: Vec<BookTick>) -> Self {
        Self {
            extra_columns,
            ticks,
        }
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Stable: rows sharing a timestamp keep their input order.
    pub fn sort_by_time(&mut self) {
        self.ticks.sort_by_key(|t| t.timestamp);
    }

    pub fn is_sorted(&self) -> bool {
        self.ticks
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    }

    /// Earliest and latest timestamps, regardless of row order.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let min = self.ticks.iter().map(|t| t.timestamp).min()?;
        let max = self.ticks.iter().map(|t| t.timestamp).max()?;
        Some((min, max))
    }
}
