//! # Contracts
//!
//! A [`Contract`] is the business logic the host runs against a [`Transaction`]. It is
//! stateless between invocations: everything it knows comes from the records it reads.
//!
//! Every call produces a [`Response`]. Statuses below 400 mean success and the host
//! commits the transaction. Anything else is a rejection and the staged writes are
//! thrown away.

use crate::transaction::Transaction;
use async_trait::async_trait;

/// Status codes carried by [`Response`].
pub mod status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const NO_CONTENT: u16 = 204;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const CONFLICT: u16 = 409;
    pub const INTERNAL_ERROR: u16 = 500;
    pub const NOT_IMPLEMENTED: u16 = 501;
}

/// Result of one contract invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub message: String,
    pub payload: Vec<u8>,
}

impl Response {
    pub fn success(status: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            message: String::new(),
            payload: payload.into(),
        }
    }

    pub fn ok(payload: impl Into<Vec<u8>>) -> Self {
        Self::success(status::OK, payload)
    }

    pub fn no_content() -> Self {
        Self::success(status::NO_CONTENT, Vec::new())
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.status < status::BAD_REQUEST
    }
}

/// Business logic executed by a [`LedgerHost`](crate::LedgerHost).
///
/// Implementations may be invoked concurrently and re-executed after a conflict, so
/// they must not keep state of their own.
#[async_trait]
pub trait Contract: Send + Sync + 'static {
    /// Runs once when the ledger is started.
    async fn init(&self, _tx: &mut Transaction) -> Response {
        Response::no_content()
    }

    /// Dispatches `function` with its positional string arguments.
    async fn invoke(&self, tx: &mut Transaction, function: &str, args: &[String]) -> Response;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_boundary() {
        assert!(Response::ok(Vec::new()).is_success());
        assert!(Response::no_content().is_success());
        assert!(Response::success(status::CREATED, b"1".to_vec()).is_success());
        assert!(!Response::error(status::BAD_REQUEST, "Parameter Mismatch").is_success());
        assert!(!Response::error(status::INTERNAL_ERROR, "boom").is_success());
    }
}
