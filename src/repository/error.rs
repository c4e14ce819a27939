use ledger_framework::StoreError;

/// Errors raised by typed record access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("Record {key} is not valid: {reason}")]
    Codec { key: String, reason: String },
    #[error("Cannot allocate borrow id: {0}")]
    Allocation(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}
