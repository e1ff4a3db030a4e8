#![allow(dead_code)]

use chrono::{DateTime, Utc};
use oco_backtest::domain::book::{BookFrame, BookTick};
use oco_backtest::domain::error::BacktestError;
use oco_backtest::domain::post::Post;
use oco_backtest::domain::timestamp::parse_timestamp;
use oco_backtest::ports::data_port::DataPort;
use std::path::PathBuf;

pub struct MockDataPort {
    pub posts: Vec<Post>,
    pub book: BookFrame,
    pub posts_error: Option<String>,
    pub book_error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            book: BookFrame::default(),
            posts_error: None,
            book_error: None,
        }
    }

    pub fn with_posts(mut self, timestamps: &[&str]) -> Self {
        self.posts = timestamps.iter().map(|ts| make_post(ts)).collect();
        self
    }

    pub fn with_book(mut self, rows: &[(&str, f64)]) -> Self {
        self.book = make_book(rows);
        self
    }

    pub fn with_posts_error(mut self, reason: &str) -> Self {
        self.posts_error = Some(reason.to_string());
        self
    }

    pub fn with_book_error(mut self, reason: &str) -> Self {
        self.book_error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_posts(&self) -> Result<Vec<Post>, BacktestError> {
        if let Some(reason) = &self.posts_error {
            return Err(BacktestError::DataRead {
                file: "posts".into(),
                reason: reason.clone(),
            });
        }
        Ok(self.posts.clone())
    }

    fn fetch_book(&self) -> Result<BookFrame, BacktestError> {
        if let Some(reason) = &self.book_error {
            return Err(BacktestError::DataRead {
                file: "book".into(),
                reason: reason.clone(),
            });
        }
        Ok(self.book.clone())
    }
}

pub fn ts(s: &str) -> DateTime<Utc> {
    parse_timestamp(s).unwrap()
}

pub fn make_post(s: &str) -> Post {
    Post { timestamp: ts(s) }
}

pub fn make_book(rows: &[(&str, f64)]) -> BookFrame {
    BookFrame::new(
        Vec::new(),
        rows.iter()
            .map(|(s, price)| BookTick {
                timestamp: ts(s),
                price: *price,
                extra: Vec::new(),
            })
            .collect(),
    )
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
