//! # Records
//!
//! The [`Record`] trait ties a serde type to its place in the key space: every record of
//! one kind lives under `KIND` followed by its decimal id (`car1`, `travelLog12`).

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;

/// A persisted entity stored as JSON under `KIND + id`.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Key prefix for this kind of record.
    const KIND: &'static str;

    type Id: Copy + Into<u64> + From<u64> + Display + Send + Sync;

    fn id(&self) -> Self::Id;

    fn key_for(id: Self::Id) -> String {
        let raw: u64 = id.into();
        format!("{}{}", Self::KIND, raw)
    }

    fn key(&self) -> String {
        Self::key_for(self.id())
    }

    /// Recovers the id from a key of this kind.
    ///
    /// Only the exact form [`Record::key_for`] writes is accepted: a non-empty run of ASCII
    /// digits without a leading zero, so `car12` and `car0` parse while `car`, `car01`,
    /// `car-1` and `carX` do not. Values that overflow `u64` are rejected.
    fn parse_key(key: &str) -> Option<Self::Id> {
        let suffix = key.strip_prefix(Self::KIND)?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if suffix.len() > 1 && suffix.starts_with('0') {
            return None;
        }
        suffix.parse::<u64>().ok().map(<Self::Id as From<u64>>::from)
    }

    fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::Codec(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
    }
}
