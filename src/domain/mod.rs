//! Core domain types and logic.

pub mod timestamp;
pub mod post;
pub mod book;
pub mod window;
pub mod metrics;
pub mod backtest;
pub mod config_validation;
pub mod error;
