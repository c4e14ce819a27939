//! # Ledger Client
//!
//! This module defines the cloneable handle used to talk to the [`LedgerActor`](crate::LedgerActor).

use crate::error::{Result, StoreError};
use crate::message::{ChangeSet, LedgerRequest, Versioned, WriteOp};
use crate::store::{KeyValue, RecordStore};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// ## LedgerClient
///
/// The `LedgerClient` forwards reads, scans and commits to the ledger actor over a Tokio
/// mpsc channel and waits for each answer on a oneshot channel.
///
/// * **Cloneable**: holds only a sender, so cloning is inexpensive.
/// * **Auto-commit store**: the [`RecordStore`] impl commits every `put`/`delete`
///   immediately. Contract code should use a [`Transaction`](crate::Transaction) instead.
#[derive(Clone)]
pub struct LedgerClient {
    sender: mpsc::Sender<LedgerRequest>,
}

impl LedgerClient {
    pub fn new(sender: mpsc::Sender<LedgerRequest>) -> Self {
        Self { sender }
    }

    /// Reads a record together with its version.
    pub async fn get_versioned(&self, key: &str) -> Result<Option<Versioned>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(LedgerRequest::Get {
                key: key.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    pub async fn scan(&self, start: &str, end: &str) -> Result<Vec<KeyValue>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(LedgerRequest::Scan {
                start: start.to_string(),
                end: end.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    /// Submits a change set. Returns the ledger height after the commit.
    pub async fn commit(&self, changes: ChangeSet) -> Result<u64> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(LedgerRequest::Commit {
                changes,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    async fn write(&self, op: WriteOp) -> Result<()> {
        self.commit(ChangeSet {
            reads: Vec::new(),
            writes: vec![op],
        })
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl RecordStore for LedgerClient {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.get_versioned(key).await?.map(|record| record.value))
    }

    async fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.write(WriteOp::Put {
            key: key.to_string(),
            value,
        })
        .await
    }

    async fn delete(&mut self, key: &str) -> Result<()> {
        self.write(WriteOp::Delete {
            key: key.to_string(),
        })
        .await
    }

    async fn scan(&self, start: &str, end: &str) -> Result<Vec<KeyValue>> {
        LedgerClient::scan(self, start, end).await
    }
}
