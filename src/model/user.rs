use crate::model::{active_borrow, BorrowId, UserId};
use ledger_framework::Record;
use serde::{Deserialize, Serialize};

/// A person allowed to borrow cars, one at a time.
///
/// Wire format: `{"id":1,"name":"Alice","borrowId":0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(rename = "borrowId", with = "active_borrow", default)]
    pub active_borrow: Option<BorrowId>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active_borrow: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.active_borrow.is_none()
    }
}

impl Record for User {
    const KIND: &'static str = "user";
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}
