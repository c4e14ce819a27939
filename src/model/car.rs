use crate::model::{active_borrow, BorrowId, CarId};
use ledger_framework::Record;
use serde::{Deserialize, Serialize};

/// A lendable car.
///
/// Wire format: `{"id":3,"km":1800,"borrowId":0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    #[serde(rename = "km")]
    pub odometer: u64,
    /// The borrow currently holding this car.
    #[serde(rename = "borrowId", with = "active_borrow", default)]
    pub active_borrow: Option<BorrowId>,
}

impl Car {
    pub fn new(id: CarId, odometer: u64) -> Self {
        Self {
            id,
            odometer,
            active_borrow: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.active_borrow.is_none()
    }
}

impl Record for Car {
    const KIND: &'static str = "car";
    type Id = CarId;

    fn id(&self) -> CarId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let mut car = Car::new(CarId(3), 1800);
        assert_eq!(
            serde_json::to_string(&car).unwrap(),
            r#"{"id":3,"km":1800,"borrowId":0}"#
        );

        car.active_borrow = Some(BorrowId(9));
        let json = serde_json::to_string(&car).unwrap();
        assert_eq!(json, r#"{"id":3,"km":1800,"borrowId":9}"#);
        assert_eq!(serde_json::from_str::<Car>(&json).unwrap(), car);
    }

    #[test]
    fn test_missing_borrow_id_means_available() {
        let car: Car = serde_json::from_str(r#"{"id":1,"km":5}"#).unwrap();
        assert!(car.is_available());
        assert_eq!(car.key(), "car1");
    }
}
