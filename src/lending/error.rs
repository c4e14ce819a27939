use crate::model::{BorrowId, CarId, UserId};
use crate::repository::RepositoryError;
use ledger_framework::{status, Response, StoreError};
use serde::{Deserialize, Serialize};

/// Machine-readable classification of a [`LendingError`].
///
/// Sent to callers in the payload of a rejected response as `{"kind":"..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidArgument,
    UserNotFound,
    ResourceNotFound,
    UserAlreadyBorrowing,
    ResourceAlreadyBorrowed,
    NoActiveBorrow,
    ReadingRegressed,
    BorrowRecordCorrupt,
    InvariantViolation,
    AllocationError,
    StorageError,
}

/// Why a borrow or return was refused.
///
/// Every variant aborts the transition before anything is committed.
/// [`BorrowRecordCorrupt`](Self::BorrowRecordCorrupt) and
/// [`InvariantViolation`](Self::InvariantViolation) mean the stored data was already
/// inconsistent before the call; they are reported, never repaired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LendingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("User {0} not found")]
    UserNotFound(UserId),
    #[error("Car {0} not found")]
    ResourceNotFound(CarId),
    #[error("User {user} is already borrowing a car (borrow {borrow})")]
    UserAlreadyBorrowing { user: UserId, borrow: BorrowId },
    #[error("Car {car} is already borrowed (borrow {borrow})")]
    ResourceAlreadyBorrowed { car: CarId, borrow: BorrowId },
    #[error("User {0} has no borrowed car")]
    NoActiveBorrow(UserId),
    #[error("Reading {reading} km is lower than the odometer of car {car} ({odometer} km)")]
    ReadingRegressed {
        car: CarId,
        odometer: u64,
        reading: u64,
    },
    #[error("Borrow record {borrow} is corrupt: {reason}")]
    BorrowRecordCorrupt { borrow: BorrowId, reason: String },
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    #[error("Allocation error: {0}")]
    Allocation(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LendingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LendingError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            LendingError::UserNotFound(_) => ErrorKind::UserNotFound,
            LendingError::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
            LendingError::UserAlreadyBorrowing { .. } => ErrorKind::UserAlreadyBorrowing,
            LendingError::ResourceAlreadyBorrowed { .. } => ErrorKind::ResourceAlreadyBorrowed,
            LendingError::NoActiveBorrow(_) => ErrorKind::NoActiveBorrow,
            LendingError::ReadingRegressed { .. } => ErrorKind::ReadingRegressed,
            LendingError::BorrowRecordCorrupt { .. } => ErrorKind::BorrowRecordCorrupt,
            LendingError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            LendingError::Allocation(_) => ErrorKind::AllocationError,
            LendingError::Storage(_) => ErrorKind::StorageError,
        }
    }

    pub fn status(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidArgument | ErrorKind::NoActiveBorrow | ErrorKind::ReadingRegressed => {
                status::BAD_REQUEST
            }
            ErrorKind::UserNotFound | ErrorKind::ResourceNotFound => status::NOT_FOUND,
            ErrorKind::UserAlreadyBorrowing | ErrorKind::ResourceAlreadyBorrowed => {
                status::CONFLICT
            }
            ErrorKind::BorrowRecordCorrupt
            | ErrorKind::InvariantViolation
            | ErrorKind::AllocationError
            | ErrorKind::StorageError => status::INTERNAL_ERROR,
        }
    }

    /// Whether the stored data was found inconsistent.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::BorrowRecordCorrupt | ErrorKind::InvariantViolation
        )
    }

    pub fn to_response(&self) -> Response {
        #[derive(Serialize)]
        struct Body {
            kind: ErrorKind,
        }
        let payload = serde_json::to_vec(&Body { kind: self.kind() }).unwrap_or_default();
        Response::error(self.status(), self.to_string()).with_payload(payload)
    }
}

impl From<RepositoryError> for LendingError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound { kind, id } => {
                LendingError::InvariantViolation(format!("{kind} {id} is referenced but missing"))
            }
            RepositoryError::Storage(e) => e.into(),
            RepositoryError::Codec { key, reason } => {
                LendingError::Storage(format!("record {key} is not valid: {reason}"))
            }
            RepositoryError::Allocation(reason) => LendingError::Allocation(reason),
        }
    }
}

impl From<StoreError> for LendingError {
    fn from(e: StoreError) -> Self {
        LendingError::Storage(e.to_string())
    }
}

/// Pulls the [`ErrorKind`] back out of a rejected response's payload.
pub fn kind_of(response: &Response) -> Option<ErrorKind> {
    #[derive(Deserialize)]
    struct Body {
        kind: ErrorKind,
    }
    serde_json::from_slice::<Body>(&response.payload)
        .ok()
        .map(|body| body.kind)
}
