use crate::model::{BorrowId, CarId, UserId};
use ledger_framework::EventSink;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const BORROWED_TAG: &str = "Borrow a car";
pub const RETURNED_TAG: &str = "User returned Car";

/// Detail of a [`BORROWED_TAG`] event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarBorrowed {
    pub user_id: UserId,
    pub car_id: CarId,
    pub borrow_id: BorrowId,
}

/// Detail of a [`RETURNED_TAG`] event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarReturned {
    pub user_id: UserId,
    pub car_id: CarId,
    pub travel_log_id: BorrowId,
    pub driven_km: u64,
}

/// Publishes `detail` as JSON under `tag`.
pub fn publish_json<S, E>(sink: &S, tag: &str, detail: &E)
where
    S: EventSink + ?Sized,
    E: Serialize,
{
    match serde_json::to_vec(detail) {
        Ok(bytes) => sink.publish(tag, bytes),
        Err(e) => warn!(tag, error = %e, "Event detail not serializable, dropped"),
    }
}
