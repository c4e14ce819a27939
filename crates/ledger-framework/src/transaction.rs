//! # Transactions
//!
//! A [`Transaction`] is the [`RecordStore`] a contract sees during one invocation. Reads go
//! to the ledger and remember the version they observed. Writes and events stay local
//! until [`Transaction::commit`] sends them to the ledger as one [`ChangeSet`].
//!
//! Dropping a transaction without committing discards everything it staged.
//!
//! ## Isolation
//!
//! Point reads are validated at commit time: if any key read by this transaction was
//! rewritten by another commit, the ledger refuses with [`StoreError::Conflict`]. Range
//! scans are not validated, so a scan may miss a key that is inserted concurrently.

use crate::client::LedgerClient;
use crate::error::Result;
use crate::event::{EventSink, LedgerEvent};
use crate::message::{ChangeSet, WriteOp};
use crate::store::{in_range, KeyValue, RecordStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    /// Ledger height after the commit, `None` when nothing was written.
    pub height: Option<u64>,
    /// Events the invocation published, in publication order.
    pub events: Vec<LedgerEvent>,
}

/// Staged view over the ledger for a single invocation.
pub struct Transaction {
    ledger: LedgerClient,
    reads: Mutex<BTreeMap<String, u64>>,
    writes: BTreeMap<String, Option<Vec<u8>>>,
    events: Mutex<Vec<LedgerEvent>>,
}

impl Transaction {
    pub fn begin(ledger: LedgerClient) -> Self {
        Self {
            ledger,
            reads: Mutex::new(BTreeMap::new()),
            writes: BTreeMap::new(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Number of keys written or deleted so far.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Events published so far, not yet delivered anywhere.
    pub fn pending_events(&self) -> Vec<LedgerEvent> {
        lock(&self.events).clone()
    }

    /// Sends the staged writes to the ledger.
    ///
    /// A read-only transaction does not contact the ledger at all. On error nothing was
    /// applied and the buffered events are dropped with the transaction.
    pub async fn commit(self) -> Result<Committed> {
        let Transaction {
            ledger,
            reads,
            writes,
            events,
        } = self;
        let events = events.into_inner().unwrap_or_else(PoisonError::into_inner);

        if writes.is_empty() {
            return Ok(Committed {
                height: None,
                events,
            });
        }

        let reads: Vec<(String, u64)> = reads
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .collect();
        let writes: Vec<WriteOp> = writes
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => WriteOp::Put { key, value },
                None => WriteOp::Delete { key },
            })
            .collect();

        debug!(reads = reads.len(), writes = writes.len(), "Submitting change set");
        let height = ledger.commit(ChangeSet { reads, writes }).await?;
        Ok(Committed {
            height: Some(height),
            events,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl RecordStore for Transaction {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(staged) = self.writes.get(key) {
            return Ok(staged.clone());
        }
        let record = self.ledger.get_versioned(key).await?;
        let version = record.as_ref().map_or(0, |r| r.version);
        lock(&self.reads).entry(key.to_string()).or_insert(version);
        Ok(record.map(|r| r.value))
    }

    async fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    async fn delete(&mut self, key: &str) -> Result<()> {
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    async fn scan(&self, start: &str, end: &str) -> Result<Vec<KeyValue>> {
        let mut merged: BTreeMap<String, Vec<u8>> = self
            .ledger
            .scan(start, end)
            .await?
            .into_iter()
            .map(|kv| (kv.key, kv.value))
            .collect();
        for (key, staged) in &self.writes {
            if !in_range(key, start, end) {
                continue;
            }
            match staged {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged
            .into_iter()
            .map(|(key, value)| KeyValue::new(key, value))
            .collect())
    }
}

impl EventSink for Transaction {
    fn publish(&self, tag: &str, detail: Vec<u8>) {
        lock(&self.events).push(LedgerEvent::new(tag, detail));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::LedgerActor;
    use crate::error::StoreError;

    fn ledger() -> LedgerClient {
        let (actor, client) = LedgerActor::new(10);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_writes_are_invisible_until_commit() {
        let client = ledger();
        let mut tx = Transaction::begin(client.clone());

        tx.put("car1", b"a".to_vec()).await.unwrap();
        assert_eq!(tx.get("car1").await.unwrap(), Some(b"a".to_vec()));
        assert_eq!(RecordStore::get(&client, "car1").await.unwrap(), None);

        let committed = tx.commit().await.unwrap();
        assert_eq!(committed.height, Some(1));
        assert_eq!(
            RecordStore::get(&client, "car1").await.unwrap(),
            Some(b"a".to_vec())
        );
    }

    #[tokio::test]
    async fn test_dropped_transaction_leaves_no_trace() {
        let client = ledger();
        {
            let mut tx = Transaction::begin(client.clone());
            tx.put("car1", b"a".to_vec()).await.unwrap();
            tx.publish("Car created", Vec::new());
        }
        assert!(client.scan("", "").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_overlays_staged_writes() {
        let mut client = ledger();
        client.put("car1", b"1".to_vec()).await.unwrap();
        client.put("car2", b"2".to_vec()).await.unwrap();

        let mut tx = Transaction::begin(client.clone());
        tx.delete("car1").await.unwrap();
        tx.put("car3", b"3".to_vec()).await.unwrap();
        tx.put("user1", b"u".to_vec()).await.unwrap();

        let keys: Vec<String> = tx
            .scan_prefix("car")
            .await
            .unwrap()
            .into_iter()
            .map(|kv| kv.key)
            .collect();
        assert_eq!(keys, vec!["car2", "car3"]);
    }

    #[tokio::test]
    async fn test_concurrent_writer_causes_conflict() {
        let mut client = ledger();
        client.put("counterB", b"0".to_vec()).await.unwrap();

        let mut first = Transaction::begin(client.clone());
        let mut second = Transaction::begin(client.clone());
        first.get("counterB").await.unwrap();
        second.get("counterB").await.unwrap();
        first.put("counterB", b"1".to_vec()).await.unwrap();
        second.put("counterB", b"1".to_vec()).await.unwrap();

        assert!(first.commit().await.is_ok());
        let err = second.commit().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, StoreError::Conflict { ref key, .. } if key == "counterB"));
    }

    #[tokio::test]
    async fn test_read_only_commit_skips_ledger() {
        let client = ledger();
        let tx = Transaction::begin(client);
        tx.get("missing").await.unwrap();
        tx.publish("looked", Vec::new());

        let committed = tx.commit().await.unwrap();
        assert_eq!(committed.height, None);
        assert_eq!(committed.events.len(), 1);
    }
}
