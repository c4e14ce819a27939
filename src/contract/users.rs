use crate::contract::crud::{bad_request, Provisioned};
use crate::model::{BorrowId, User, UserId};
use ledger_framework::Response;
use serde::Deserialize;

/// Request body of `createUser` / `updateUser`: `{"id":6,"name":"Frank","borrowId":0}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserBody {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    borrow_id: Option<u64>,
}

impl Provisioned for User {
    const LABEL: &'static str = "User";

    fn active_borrow(&self) -> Option<BorrowId> {
        self.active_borrow
    }

    fn from_body(path_id: UserId, body: &str) -> Result<Self, Response> {
        let body: UserBody = serde_json::from_str(body)
            .map_err(|e| bad_request(format!("User body is not valid JSON: {e}")))?;
        let id = match body.id {
            Some(id) if id != 0 => UserId(id),
            _ => return Err(bad_request("User id is missing")),
        };
        let name = match body.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(bad_request("User name must not be empty")),
        };
        if body.borrow_id.unwrap_or(0) != 0 {
            return Err(bad_request("borrowId cannot be set directly"));
        }
        if id != path_id {
            return Err(bad_request("id of path and id of user are different"));
        }
        Ok(User::new(id, name))
    }
}
