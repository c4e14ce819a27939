//! # Ledger Actor
//!
//! This module defines the `LedgerActor`, the in-process ledger backend. It owns the
//! ordered record map and processes [`LedgerRequest`]s one at a time, which is what
//! makes each commit atomic and isolated from every other.

use crate::client::LedgerClient;
use crate::error::StoreError;
use crate::message::{ChangeSet, LedgerRequest, Versioned, WriteOp};
use crate::store::KeyValue;
use std::collections::BTreeMap;
use std::ops::Bound;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The actor that owns the ledger state.
///
/// # Architecture Note
/// This struct is the "Server" half of the ledger. It owns the records and the receiver
/// end of the channel. Because requests are handled sequentially, a commit is validated
/// and applied without any interleaving, so no `Mutex` is needed around `records`.
///
/// # Versioning
///
/// The actor keeps a ledger `height` that increases by one for every commit that
/// writes something. Each record remembers the height of the commit that last wrote
/// it. A commit carries the versions its transaction read; if any of them no longer
/// matches, the whole commit is refused with [`StoreError::Conflict`] and nothing is
/// applied. The host then re-executes the invocation against fresh state.
///
/// # Usage Pattern
///
/// ```rust
/// use ledger_framework::{LedgerActor, RecordStore};
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, mut client) = LedgerActor::new(16);
///     tokio::spawn(actor.run());
///
///     client.put("greeting", b"hello".to_vec()).await.unwrap();
///     assert_eq!(client.get("greeting").await.unwrap(), Some(b"hello".to_vec()));
/// }
/// ```
pub struct LedgerActor {
    receiver: mpsc::Receiver<LedgerRequest>,
    records: BTreeMap<String, Versioned>,
    height: u64,
}

impl LedgerActor {
    /// Creates a new `LedgerActor` and its associated `LedgerClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; callers wait for space
    /// when it is full.
    pub fn new(buffer_size: usize) -> (Self, LedgerClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            records: BTreeMap::new(),
            height: 0,
        };
        (actor, LedgerClient::new(sender))
    }

    /// Runs the actor's event loop until every client has been dropped.
    pub async fn run(mut self) {
        info!(records = self.records.len(), "Ledger started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                LedgerRequest::Get { key, respond_to } => {
                    let record = self.records.get(&key).cloned();
                    debug!(%key, found = record.is_some(), "Get");
                    let _ = respond_to.send(Ok(record));
                }
                LedgerRequest::Scan {
                    start,
                    end,
                    respond_to,
                } => {
                    let entries = self.scan(&start, &end);
                    debug!(%start, %end, entries = entries.len(), "Scan");
                    let _ = respond_to.send(Ok(entries));
                }
                LedgerRequest::Commit {
                    changes,
                    respond_to,
                } => {
                    let writes = changes.writes.len();
                    let result = self.commit(changes);
                    match &result {
                        Ok(height) => {
                            info!(height, writes, records = self.records.len(), "Committed")
                        }
                        Err(e) => warn!(error = %e, "Commit refused"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(height = self.height, records = self.records.len(), "Shutdown");
    }

    fn scan(&self, start: &str, end: &str) -> Vec<KeyValue> {
        if !end.is_empty() && start >= end {
            return Vec::new();
        }
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };
        self.records
            .range::<str, _>((Bound::Included(start), upper))
            .map(|(key, record)| KeyValue::new(key.clone(), record.value.clone()))
            .collect()
    }

    fn commit(&mut self, changes: ChangeSet) -> Result<u64, StoreError> {
        for (key, expected) in &changes.reads {
            let found = self.records.get(key).map_or(0, |record| record.version);
            if found != *expected {
                return Err(StoreError::Conflict {
                    key: key.clone(),
                    expected: *expected,
                    found,
                });
            }
        }

        if changes.writes.is_empty() {
            return Ok(self.height);
        }

        self.height += 1;
        for op in changes.writes {
            match op {
                WriteOp::Put { key, value } => {
                    self.records.insert(
                        key,
                        Versioned {
                            value,
                            version: self.height,
                        },
                    );
                }
                WriteOp::Delete { key } => {
                    self.records.remove(&key);
                }
            }
        }
        Ok(self.height)
    }
}
