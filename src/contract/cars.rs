use crate::contract::crud::{bad_request, Provisioned};
use crate::model::{BorrowId, Car, CarId};
use ledger_framework::Response;
use serde::Deserialize;

/// Request body of `createCar` / `updateCar`: `{"id":7,"km":7777,"borrowId":0}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CarBody {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    km: Option<u64>,
    #[serde(default)]
    borrow_id: Option<u64>,
}

impl Provisioned for Car {
    const LABEL: &'static str = "Car";

    fn active_borrow(&self) -> Option<BorrowId> {
        self.active_borrow
    }

    fn from_body(path_id: CarId, body: &str) -> Result<Self, Response> {
        let body: CarBody = serde_json::from_str(body)
            .map_err(|e| bad_request(format!("Car body is not valid JSON: {e}")))?;
        let id = match body.id {
            Some(id) if id != 0 => CarId(id),
            _ => return Err(bad_request("Car id is missing")),
        };
        let Some(km) = body.km else {
            return Err(bad_request("Car km is missing"));
        };
        if body.borrow_id.unwrap_or(0) != 0 {
            return Err(bad_request("borrowId cannot be set directly"));
        }
        if id != path_id {
            return Err(bad_request("id of path and id of car are different"));
        }
        Ok(Car::new(id, km))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_validation() {
        let car = Car::from_body(CarId(7), r#"{"id":7,"km":7777,"borrowId":0}"#).unwrap();
        assert_eq!(car, Car::new(CarId(7), 7777));
        assert!(Car::from_body(CarId(7), r#"{"id":7,"km":0}"#).is_ok());

        for body in [
            r#"{"id":8,"km":1}"#,
            r#"{"id":7}"#,
            r#"{"km":1}"#,
            r#"{"id":7,"km":1,"borrowId":3}"#,
            r#"{"id":"7","km":1}"#,
        ] {
            assert_eq!(Car::from_body(CarId(7), body).unwrap_err().status, 400, "{body}");
        }
    }
}
