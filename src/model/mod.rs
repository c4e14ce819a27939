//! Persisted entities of the lending ledger and their wire encoding.
//!
//! Every entity implements [`Record`](ledger_framework::Record), which fixes its key
//! (`car7`, `user3`, `borrow12`, `travelLog12`) and its JSON encoding.

pub mod borrow;
pub mod car;
pub mod ids;
pub mod timestamp;
pub mod travel_log;
pub mod user;

pub use borrow::*;
pub use car::*;
pub use ids::*;
pub use timestamp::*;
pub use travel_log::*;
pub use user::*;

/// Stored `borrowId` of an entity that is not lent out.
///
/// Zero on the wire, `None` in memory.
pub(crate) mod active_borrow {
    use super::BorrowId;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<BorrowId>, s: S) -> Result<S::Ok, S::Error> {
        value.map_or(0, |id| id.get()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BorrowId>, D::Error> {
        let raw = u64::deserialize(d)?;
        Ok((raw != 0).then_some(BorrowId(raw)))
    }
}
