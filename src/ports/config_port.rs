//! Configuration access port trait.
//!
//! Keys live in named sections. Values that are absent or fail to parse fall
//! back to the caller's default; validation catches the latter separately.

pub trait ConfigPort {
    /// Raw value, trimmed.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
