//! Post/book alignment run.
//!
//! Joins every book row with the number of posts observed in its second.
//! Book rows drive the output: one result row per book row, in time order.

use super::book::BookFrame;
use super::metrics::{compute_book_metrics, BookMetrics, WindowConfig};
use super::post::{align_posts, Post};
use chrono::Duration;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    /// Delay between a post being published and it being actionable.
    pub latency: Duration,
    pub windows: WindowConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            latency: Duration::zero(),
            windows: WindowConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub metrics: BookMetrics,
    pub post_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub extra_columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    /// Posts read from input.
    pub posts_total: u64,
    /// Posts whose aligned second matches at least one book row.
    pub posts_matched: u64,
}

impl BacktestResult {
    pub fn rows_with_posts(&self) -> usize {
        self.rows.iter().filter(|r| r.post_count > 0).count()
    }

    pub fn posts_unmatched(&self) -> u64 {
        self.posts_total - self.posts_matched
    }

    pub fn max_stdev_bp(&self) -> f64 {
        self.rows
            .iter()
            .map(|r| r.metrics.stdev_bp)
            .fold(0.0, f64::max)
    }
}

pub fn run_backtest(posts: &[Post], book: BookFrame, config: &BacktestConfig) -> BacktestResult {
    let counts = align_posts(posts, config.latency);
    let extra_columns = book.extra_columns.clone();
    let metrics = compute_book_metrics(book, &config.windows);

    let book_seconds: BTreeSet<_> = metrics.iter().map(|m| m.timestamp()).collect();
    let posts_matched = counts
        .iter()
        .filter(|(second, _)| book_seconds.contains(second))
        .map(|(_, count)| count)
        .sum();

    let rows = metrics
        .into_iter()
        .map(|m| {
            let post_count = counts.get(m.timestamp());
            ResultRow {
                metrics: m,
                post_count,
            }
        })
        .collect();

    BacktestResult {
        extra_columns,
        rows,
        posts_total: posts.len() as u64,
        posts_matched,
    }
}
