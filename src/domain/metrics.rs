//! Per-row book statistics: breakout baseline and short-horizon volatility.

use super::book::{BookFrame, BookTick};
use super::window::{rolling_max, rolling_min, rolling_std};
use chrono::{DateTime, Duration, Utc};

const BASIS_POINTS: f64 = 10_000.0;

pub const DEFAULT_BASELINE_WINDOW_SECS: i64 = 60;
pub const DEFAULT_VOLATILITY_WINDOW_SECS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    /// Width of the high/low baseline window.
    pub baseline: Duration,
    /// Width of the standard deviation window.
    pub volatility: Duration,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            baseline: Duration::seconds(DEFAULT_BASELINE_WINDOW_SECS),
            volatility: Duration::seconds(DEFAULT_VOLATILITY_WINDOW_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookMetrics {
    pub tick: BookTick,
    pub baseline_high: f64,
    pub baseline_low: f64,
    /// Rolling price stdev as basis points of the row's price. 0 where the
    /// window holds a single observation.
    pub stdev_bp: f64,
}

impl BookMetrics {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.tick.timestamp
    }
}

/// Sort the book by time and attach rolling statistics to every row.
pub fn compute_book_metrics(mut frame: BookFrame, windows: &WindowConfig) -> Vec<BookMetrics> {
    frame.sort_by_time();

    let times: Vec<DateTime<Utc>> = frame.ticks.iter().map(|t| t.timestamp).collect();
    let prices: Vec<f64> = frame.ticks.iter().map(|t| t.price).collect();

    let highs = rolling_max(&times, &prices, windows.baseline);
    let lows = rolling_min(&times, &prices, windows.baseline);
    let stdevs = rolling_std(&times, &prices, windows.volatility);

    frame
        .ticks
        .into_iter()
        .zip(highs)
        .zip(lows)
        .zip(stdevs)
        .map(|(((tick, baseline_high), baseline_low), stdev)| {
            let stdev_bp = stdev.unwrap_or(0.0) / tick.price * BASIS_POINTS;
            BookMetrics {
                tick,
                baseline_high,
                baseline_low,
                stdev_bp,
            }
        })
        .collect()
}
