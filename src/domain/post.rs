//! Post events and their alignment onto whole seconds.
//!
//! A post only becomes tradeable once it is observed. Alignment therefore
//! shifts each post by the observation latency and floors to the second, so
//! a count never shows up in a second earlier than the post was visible.

use super::timestamp::floor_to_second;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub timestamp: DateTime<Utc>,
}

/// Number of posts per whole UTC second.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostCounts {
    counts: BTreeMap<DateTime<Utc>, u64>,
}

impl PostCounts {
    /// Count for `second`, zero when nothing was posted in it.
    pub fn get(&self, second: DateTime<Utc>) -> u64 {
        self.counts.get(&second).copied().unwrap_or(0)
    }

    pub fn contains(&self, second: DateTime<Utc>) -> bool {
        self.counts.contains_key(&second)
    }

    /// Total number of aligned posts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct seconds that received at least one post.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, u64)> + '_ {
        self.counts.iter().map(|(ts, count)| (*ts, *count))
    }
}

/// Count posts per second after shifting them by `latency`. A shift past the
/// representable range saturates at the last representable instant.
pub fn align_posts(posts: &[Post], latency: Duration) -> PostCounts {
    let mut counts = BTreeMap::new();
    for post in posts {
        let shifted = post
            .timestamp
            .checked_add_signed(latency)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let effective = floor_to_second(shifted);
        *counts.entry(effective).or_insert(0) += 1;
    }
    PostCounts { counts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timestamp::parse_timestamp;
    use chrono::Timelike;

    fn post(ts: &str) -> Post {
        Post {
            timestamp: parse_timestamp(ts).unwrap(),
        }
    }

    fn ts(s: &str) -> DateTime<Utc> {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn empty_input() {
        let counts = align_posts(&[], Duration::zero());
        assert!(counts.is_empty());
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.get(ts("2020-01-01T00:00:00Z")), 0);
    }

    #[test]
    fn groups_within_same_second() {
        let posts = vec![
            post("2020-01-01T00:00:10.100Z"),
            post("2020-01-01T00:00:10.900Z"),
            post("2020-01-01T00:00:11Z"),
        ];
        let counts = align_posts(&posts, Duration::zero());

        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get(ts("2020-01-01T00:00:10Z")), 2);
        assert_eq!(counts.get(ts("2020-01-01T00:00:11Z")), 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn minute_boundary_is_not_merged() {
        let posts = vec![
            post("2020-01-01T00:00:59Z"),
            post("2020-01-01T00:01:00Z"),
        ];
        let counts = align_posts(&posts, Duration::zero());

        assert_eq!(counts.get(ts("2020-01-01T00:00:59Z")), 1);
        assert_eq!(counts.get(ts("2020-01-01T00:01:00Z")), 1);
    }

    #[test]
    fn never_rounds_up() {
        let counts = align_posts(&[post("2020-01-01T00:00:59.999Z")], Duration::zero());
        assert!(counts.contains(ts("2020-01-01T00:00:59Z")));
        assert!(!counts.contains(ts("2020-01-01T00:01:00Z")));
    }

    #[test]
    fn latency_shifts_into_later_second() {
        let posts = vec![post("2020-01-01T00:00:59.800Z")];
        let counts = align_posts(&posts, Duration::milliseconds(250));

        assert_eq!(counts.get(ts("2020-01-01T00:00:59Z")), 0);
        assert_eq!(counts.get(ts("2020-01-01T00:01:00Z")), 1);
    }

    #[test]
    fn latency_within_second_keeps_bucket() {
        let posts = vec![post("2020-01-01T00:00:30.100Z")];
        let counts = align_posts(&posts, Duration::milliseconds(500));
        assert_eq!(counts.get(ts("2020-01-01T00:00:30Z")), 1);
    }

    #[test]
    fn out_of_range_latency_does_not_panic() {
        let posts = vec![post("2020-01-01T00:00:00Z")];
        let counts = align_posts(&posts, Duration::milliseconds(9_000_000_000_000_000));

        assert_eq!(counts.total(), 1);
        assert_eq!(counts.get(ts("2020-01-01T00:00:00Z")), 0);
    }

    #[test]
    fn keys_are_whole_seconds_in_order() {
        let posts = vec![
            post("2020-01-01T00:00:03.5Z"),
            post("2020-01-01T00:00:01.25Z"),
            post("2020-01-01T00:00:02.75Z"),
        ];
        let counts = align_posts(&posts, Duration::zero());
        let keys: Vec<_> = counts.iter().map(|(ts, _)| ts).collect();

        assert!(keys.iter().all(|k| k.nanosecond() == 0));
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }
}
