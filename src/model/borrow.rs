use crate::model::{BorrowId, CarId, Timestamp, UserId};
use ledger_framework::Record;
use serde::{Deserialize, Serialize};

/// The record of a car being handed to a user. Written once and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarBorrow {
    pub id: BorrowId,
    pub car_id: CarId,
    pub user_id: UserId,
    pub start_time: Timestamp,
}

impl Record for CarBorrow {
    const KIND: &'static str = "borrow";
    type Id = BorrowId;

    fn id(&self) -> BorrowId {
        self.id
    }
}
