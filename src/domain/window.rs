//! Trailing time-based rolling windows.
//!
//! For row `i` the window holds every row `j <= i` with
//! `times[j] > times[i] - width`: left-open, right-closed, and limited to rows
//! already seen, so later rows sharing `times[i]` are not part of it.
//! Inputs must be sorted by time.

use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// Rolling maximum. Monotonic deque, O(n).
pub fn rolling_max(times: &[DateTime<Utc>], values: &[f64], width: Duration) -> Vec<f64> {
    rolling_extreme(times, values, width, |kept, new| kept <= new)
}

/// Rolling minimum. Monotonic deque, O(n).
pub fn rolling_min(times: &[DateTime<Utc>], values: &[f64], width: Duration) -> Vec<f64> {
    rolling_extreme(times, values, width, |kept, new| kept >= new)
}

/// `dominated(kept, new)` is true when `kept` can never again be the extreme
/// once `new` has entered the window.
fn rolling_extreme<F>(
    times: &[DateTime<Utc>],
    values: &[f64],
    width: Duration,
    dominated: F,
) -> Vec<f64>
where
    F: Fn(f64, f64) -> bool,
{
    debug_assert_eq!(times.len(), values.len());
    debug_assert!(times.windows(2).all(|w| w[0] <= w[1]));

    let mut out = Vec::with_capacity(values.len());
    let mut deque: VecDeque<usize> = VecDeque::new();
    let mut start = 0;

    for i in 0..values.len() {
        start = advance_start(times, start, i, width);

        while let Some(&back) = deque.back() {
            if dominated(values[back], values[i]) {
                deque.pop_back();
            } else {
                break;
            }
        }
        deque.push_back(i);

        while let Some(&front) = deque.front() {
            if front < start {
                deque.pop_front();
            } else {
                break;
            }
        }

        // i itself was just pushed, so the deque is never empty here.
        out.push(deque.front().map_or(values[i], |&idx| values[idx]));
    }
    out
}

/// Rolling sample standard deviation (ddof = 1).
///
/// `None` where the window holds fewer than two observations.
pub fn rolling_std(
    times: &[DateTime<Utc>],
    values: &[f64],
    width: Duration,
) -> Vec<Option<f64>> {
    debug_assert_eq!(times.len(), values.len());
    debug_assert!(times.windows(2).all(|w| w[0] <= w[1]));

    let mut out = Vec::with_capacity(values.len());
    let mut acc = Welford::default();
    let mut start = 0;

    for i in 0..values.len() {
        let next_start = advance_start(times, start, i, width);
        if next_start == i {
            // Window is just row i: drop accumulated rounding error.
            acc = Welford::default();
        } else {
            for &old in &values[start..next_start] {
                acc.remove(old);
            }
        }
        acc.add(values[i]);
        start = next_start;
        out.push(acc.sample_std());
    }
    out
}

/// First index still inside the window ending at `i`.
fn advance_start(times: &[DateTime<Utc>], mut start: usize, i: usize, width: Duration) -> usize {
    let cutoff = times[i] - width;
    while start < i && times[start] <= cutoff {
        start += 1;
    }
    start
}

/// Running mean and sum of squared deviations with add and remove.
#[derive(Debug, Default)]
struct Welford {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Welford {
    fn add(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    fn remove(&mut self, x: f64) {
        if self.count <= 1 {
            *self = Self::default();
            return;
        }
        self.count -= 1;
        let n = self.count as f64;
        let delta = x - self.mean;
        self.mean -= delta / n;
        self.m2 -= (n + 1.0) * delta * delta / n;
    }

    fn sample_std(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        let variance = (self.m2 / (self.count - 1) as f64).max(0.0);
        Some(variance.sqrt())
    }
}
