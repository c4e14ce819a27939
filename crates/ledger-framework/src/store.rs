//! # RecordStore Trait
//!
//! The key-value contract that contract code is written against. Keys are strings and
//! values are opaque bytes. Range scans are half-open and ascending in byte order.
//!
//! Contract code never talks to the ledger actor directly: it receives a
//! [`Transaction`](crate::Transaction), which implements this trait by staging writes
//! until the host commits them as one unit.

use crate::error::Result;
use async_trait::async_trait;

/// A key together with its stored bytes, as produced by range scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Key-value storage with ordered range scans.
///
/// An empty `end` in [`RecordStore::scan`] means "no upper bound", so `scan("", "")`
/// visits every key.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the bytes stored under `key`, or `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&mut self, key: &str) -> Result<()>;

    /// All entries with `start <= key < end`, ascending.
    async fn scan(&self, start: &str, end: &str) -> Result<Vec<KeyValue>>;

    /// All entries whose key starts with `prefix`, ascending.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<KeyValue>> {
        let (start, end) = prefix_range(prefix);
        self.scan(&start, &end).await
    }
}

/// The half-open range `[prefix, successor)` covering exactly the keys that start with `prefix`.
///
/// The upper bound is the prefix with its last character bumped by one code point.
/// An empty upper bound is returned when no successor exists (unbounded scan).
pub fn prefix_range(prefix: &str) -> (String, String) {
    let mut end: Vec<char> = prefix.chars().collect();
    while let Some(last) = end.pop() {
        if let Some(next) = next_char(last) {
            end.push(next);
            return (prefix.to_string(), end.into_iter().collect());
        }
    }
    (prefix.to_string(), String::new())
}

/// Whether `key` falls inside the half-open range `[start, end)`; an empty `end` is unbounded.
pub fn in_range(key: &str, start: &str, end: &str) -> bool {
    key >= start && (end.is_empty() || key < end)
}

fn next_char(c: char) -> Option<char> {
    match c {
        '\u{D7FF}' => Some('\u{E000}'),
        _ => char::from_u32(c as u32 + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_range_bumps_last_char() {
        assert_eq!(prefix_range("car"), ("car".to_string(), "cas".to_string()));
        assert_eq!(
            prefix_range("travelLog"),
            ("travelLog".to_string(), "travelLoh".to_string())
        );
    }

    #[test]
    fn test_prefix_range_empty_prefix_is_unbounded() {
        assert_eq!(prefix_range(""), (String::new(), String::new()));
    }

    #[test]
    fn test_prefix_range_skips_surrogate_gap() {
        let (_, end) = prefix_range("a\u{D7FF}");
        assert_eq!(end, "a\u{E000}");
    }

    #[test]
    fn test_in_range() {
        let (start, end) = prefix_range("car");
        assert!(in_range("car1", &start, &end));
        assert!(in_range("car10", &start, &end));
        assert!(!in_range("counterB", &start, &end));
        assert!(!in_range("borrow1", &start, &end));
        assert!(in_range("zzz", "a", ""));
    }
}
