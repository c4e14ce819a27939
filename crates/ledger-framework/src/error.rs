//! # Ledger Errors
//!
//! This module defines the error type shared by the ledger actor, its client and the
//! transaction layer. Contracts see these errors as opaque storage failures.

/// Errors that can occur while reading from or committing to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Ledger actor closed")]
    ActorClosed,
    #[error("Ledger actor dropped response channel")]
    ActorDropped,
    /// A key read by the transaction was changed by another commit before this one landed.
    #[error("Read conflict on {key}: read version {expected}, ledger has {found}")]
    Conflict {
        key: String,
        expected: u64,
        found: u64,
    },
    #[error("Codec error: {0}")]
    Codec(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether re-executing the whole invocation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
