//! Input data access port trait.

use crate::domain::book::BookFrame;
use crate::domain::error::BacktestError;
use crate::domain::post::Post;

pub trait DataPort {
    fn fetch_posts(&self) -> Result<Vec<Post>, BacktestError>;

    /// Book rows in input order; sorting is left to the domain.
    fn fetch_book(&self) -> Result<BookFrame, BacktestError>;
}
