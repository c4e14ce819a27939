//! Typed inputs of the two transitions, validated at the boundary.
//!
//! Payloads arrive as JSON text. Parsing never fails by itself: a payload that is not a
//! JSON object of the expected shape is kept as [`Payload::Malformed`] and reported as
//! `InvalidArgument` when the transition reaches its validation step. That keeps the
//! error order of the return transition (user checks first, then payload).

use crate::lending::LendingError;
use crate::model::{CarId, UserId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Raw fields of a request payload, or the reason they could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<T> {
    Fields(T),
    Malformed(String),
}

impl<T: DeserializeOwned + Serialize> Payload<T> {
    pub fn parse(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(fields) => Payload::Fields(fields),
            Err(e) => Payload::Malformed(e.to_string()),
        }
    }

    /// JSON text of the fields. A malformed payload has none.
    pub fn to_json(&self) -> Option<String> {
        match self {
            Payload::Fields(fields) => serde_json::to_string(fields).ok(),
            Payload::Malformed(_) => None,
        }
    }

    fn fields(&self) -> Result<&T, LendingError> {
        match self {
            Payload::Fields(fields) => Ok(fields),
            Payload::Malformed(reason) => Err(LendingError::InvalidArgument(format!(
                "payload is not valid JSON: {reason}"
            ))),
        }
    }
}

/// Body of `userBorrowACar`: `{"carId": 3}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowFields {
    #[serde(default)]
    pub car_id: Option<u64>,
}

/// Body of `userReturnACar`: `{"newKm": 1850, "usage": "commute"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnFields {
    #[serde(default)]
    pub new_km: Option<u64>,
    #[serde(default)]
    pub usage: Option<String>,
}

pub type BorrowPayload = Payload<BorrowFields>;
pub type ReturnPayload = Payload<ReturnFields>;

/// A borrow request with both ids checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowRequest {
    pub user_id: UserId,
    pub car_id: CarId,
}

/// A return request with the reading present and the usage non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnRequest {
    pub end_reading: u64,
    pub usage: String,
}

impl BorrowPayload {
    pub fn new(car_id: CarId) -> Self {
        Payload::Fields(BorrowFields {
            car_id: Some(car_id.get()),
        })
    }

    pub fn validate(&self, user_id: UserId) -> Result<BorrowRequest, LendingError> {
        let fields = self.fields()?;
        if !user_id.is_valid() {
            return Err(LendingError::InvalidArgument(
                "user id must be greater than 0".into(),
            ));
        }
        match fields.car_id {
            Some(id) if id != 0 => Ok(BorrowRequest {
                user_id,
                car_id: CarId(id),
            }),
            Some(_) => Err(LendingError::InvalidArgument(
                "carId must be greater than 0".into(),
            )),
            None => Err(LendingError::InvalidArgument("carId is missing".into())),
        }
    }
}

impl ReturnPayload {
    pub fn new(new_km: u64, usage: impl Into<String>) -> Self {
        Payload::Fields(ReturnFields {
            new_km: Some(new_km),
            usage: Some(usage.into()),
        })
    }

    pub fn validate(&self) -> Result<ReturnRequest, LendingError> {
        let fields = self.fields()?;
        // Zero doubles as "unset" in stored records, so it is no reading either.
        let end_reading = match fields.new_km {
            Some(km) if km != 0 => km,
            Some(_) => {
                return Err(LendingError::InvalidArgument(
                    "newKm must be greater than 0".into(),
                ))
            }
            None => return Err(LendingError::InvalidArgument("newKm is missing".into())),
        };
        let usage = match fields.usage.as_deref() {
            Some(usage) if !usage.trim().is_empty() => usage.to_string(),
            _ => {
                return Err(LendingError::InvalidArgument(
                    "usage must not be empty".into(),
                ))
            }
        };
        Ok(ReturnRequest { end_reading, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lending::ErrorKind;

    fn kind<T>(result: Result<T, LendingError>) -> Option<ErrorKind> {
        result.err().map(|e| e.kind())
    }

    #[test]
    fn test_borrow_payload() {
        let payload = BorrowPayload::parse(r#"{"carId": 3}"#);
        assert_eq!(
            payload.validate(UserId(1)).unwrap(),
            BorrowRequest {
                user_id: UserId(1),
                car_id: CarId(3)
            }
        );

        assert_eq!(
            kind(BorrowPayload::parse(r#"{"carId": 0}"#).validate(UserId(1))),
            Some(ErrorKind::InvalidArgument)
        );
        assert_eq!(
            kind(BorrowPayload::parse("{}").validate(UserId(1))),
            Some(ErrorKind::InvalidArgument)
        );
        assert_eq!(
            kind(BorrowPayload::new(CarId(3)).validate(UserId(0))),
            Some(ErrorKind::InvalidArgument)
        );
        assert_eq!(
            kind(BorrowPayload::parse("carId=3").validate(UserId(1))),
            Some(ErrorKind::InvalidArgument)
        );
    }

    #[test]
    fn test_return_payload_rejects_zero_reading() {
        assert_eq!(
            kind(ReturnPayload::parse(r#"{"newKm": 0, "usage": "tow"}"#).validate()),
            Some(ErrorKind::InvalidArgument)
        );
        assert_eq!(
            kind(ReturnPayload::new(0, "tow").validate()),
            Some(ErrorKind::InvalidArgument)
        );
        let request = ReturnPayload::parse(r#"{"newKm": 1, "usage": "tow"}"#)
            .validate()
            .unwrap();
        assert_eq!(request.end_reading, 1);
    }

    #[test]
    fn test_return_payload_rejections() {
        for json in [
            r#"{"usage": "commute"}"#,
            r#"{"newKm": 10}"#,
            r#"{"newKm": 10, "usage": "  "}"#,
            r#"{"newKm": -10, "usage": "commute"}"#,
            r#"[1, 2]"#,
        ] {
            assert_eq!(
                kind(ReturnPayload::parse(json).validate()),
                Some(ErrorKind::InvalidArgument),
                "{json}"
            );
        }
    }

    #[test]
    fn test_constructed_payload_serializes_to_wire_names() {
        assert_eq!(
            ReturnPayload::new(1850, "commute").to_json().unwrap(),
            r#"{"newKm":1850,"usage":"commute"}"#
        );
        assert_eq!(
            BorrowPayload::new(CarId(2)).to_json().unwrap(),
            r#"{"carId":2}"#
        );
    }
}
