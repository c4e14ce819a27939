use crate::model::{BorrowId, CarId, Timestamp, UserId};
use ledger_framework::Record;
use serde::{Deserialize, Serialize};

/// Usage report produced when a car is returned.
///
/// Shares its id with the [`CarBorrow`](crate::model::CarBorrow) it closes. Created
/// once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelLog {
    pub id: BorrowId,
    pub user_id: UserId,
    pub car_id: CarId,
    pub usage: String,
    pub start_km: u64,
    pub end_km: u64,
    pub driven_km: u64,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

impl Record for TravelLog {
    const KIND: &'static str = "travelLog";
    type Id = BorrowId;

    fn id(&self) -> BorrowId {
        self.id
    }
}
