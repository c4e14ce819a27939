//! Argument checks and response helpers shared by all handlers.

use crate::lending::LendingError;
use crate::repository::RepositoryError;
use ledger_framework::{status, Response};
use serde::Serialize;
use std::str::FromStr;
use tracing::{error, warn};

/// Handlers return the rejection as `Err` so `?` can short-circuit.
pub type HandlerResult = Result<Response, Response>;

pub const PARAMETER_MISMATCH: &str = "Parameter Mismatch";

pub fn expect_args(args: &[String], count: usize) -> Result<(), Response> {
    if args.len() == count {
        Ok(())
    } else {
        Err(Response::error(status::BAD_REQUEST, PARAMETER_MISMATCH))
    }
}

/// Parses a positive decimal id out of a path argument.
pub fn parse_id<T>(arg: &str, what: &str) -> Result<T, Response>
where
    T: FromStr + Into<u64> + Copy,
{
    match arg.parse::<T>() {
        Ok(id) if Into::<u64>::into(id) != 0 => Ok(id),
        _ => Err(Response::error(
            status::BAD_REQUEST,
            format!("{what} must be a positive integer, got {arg:?}"),
        )),
    }
}

pub fn json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, Response> {
    serde_json::to_vec(value).map_err(|e| {
        error!(error = %e, "Serializing response failed");
        Response::error(status::INTERNAL_ERROR, e.to_string())
    })
}

pub fn ok_json<T: Serialize>(value: &T) -> HandlerResult {
    Ok(Response::ok(json_bytes(value)?))
}

pub fn storage_failure(e: RepositoryError) -> Response {
    error!(error = %e, "Storage failure");
    Response::error(status::INTERNAL_ERROR, e.to_string())
}

pub fn rejected(e: LendingError) -> Response {
    if e.is_integrity_failure() {
        error!(error = %e, kind = ?e.kind(), "Ledger data is inconsistent");
    } else {
        warn!(error = %e, kind = ?e.kind(), "Rejected");
    }
    e.to_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CarId;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id::<CarId>("4", "car id").unwrap(), CarId(4));
        assert_eq!(
            parse_id::<CarId>("0", "car id").unwrap_err().status,
            status::BAD_REQUEST
        );
        assert!(parse_id::<CarId>("car4", "car id").is_err());
    }

    #[test]
    fn test_expect_args() {
        let args = vec!["1".to_string()];
        assert!(expect_args(&args, 1).is_ok());
        let err = expect_args(&args, 2).unwrap_err();
        assert_eq!(err.message, PARAMETER_MISMATCH);
    }
}
