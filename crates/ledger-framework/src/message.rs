//! # Ledger Messages
//!
//! This module defines the message types exchanged between the [`LedgerClient`](crate::LedgerClient)
//! and the [`LedgerActor`](crate::LedgerActor).

use crate::error::StoreError;
use crate::store::KeyValue;
use tokio::sync::oneshot;

/// Type alias for the one-shot reply channel used by the ledger actor.
pub type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

/// A stored value and the ledger height of the commit that last wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: Vec<u8>,
    pub version: u64,
}

/// A single staged mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

impl WriteOp {
    pub fn key(&self) -> &str {
        match self {
            WriteOp::Put { key, .. } | WriteOp::Delete { key } => key,
        }
    }
}

/// Everything one invocation wants to apply, validated and written as one unit.
///
/// `reads` holds the version observed for every key the invocation read (0 for a key
/// that was absent). The commit is rejected if any of them moved in the meantime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub reads: Vec<(String, u64)>,
    pub writes: Vec<WriteOp>,
}

/// Requests processed sequentially by the ledger actor.
///
/// Only three operations exist: point reads, range scans and atomic commits. Single-key
/// writes are commits with one [`WriteOp`] and an empty read set.
#[derive(Debug)]
pub enum LedgerRequest {
    Get {
        key: String,
        respond_to: Reply<Option<Versioned>>,
    },
    Scan {
        start: String,
        end: String,
        respond_to: Reply<Vec<KeyValue>>,
    },
    Commit {
        changes: ChangeSet,
        respond_to: Reply<u64>,
    },
}
