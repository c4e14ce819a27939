//! # Mock Ledger & Testing Guide
//!
//! [`MockLedger`] hands out a real [`LedgerClient`] whose requests are answered from a
//! queue of expectations instead of a [`LedgerActor`](crate::LedgerActor). It makes
//! storage failures easy to produce, which a real ledger never does on its own.
//!
//! ## When to use Mocks vs the Real Ledger
//!
//! | Feature | MockLedger | LedgerActor |
//! |---------|------------|-------------|
//! | **State** | None (scripted answers) | Real versioned records |
//! | **Error Injection** | Easy (`return_err`) | Only conflicts |
//! | **Use Case** | Failure paths, exact request order | Behaviour of whole flows |
//!
//! ## Example
//!
//! ```rust
//! use ledger_framework::mock::MockLedger;
//! use ledger_framework::{RecordStore, StoreError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockLedger::new();
//!     mock.expect_get("user1").return_ok(Some(b"{}".to_vec()));
//!     mock.expect_get("car1").return_err(StoreError::Backend("disk on fire".into()));
//!
//!     let client = mock.client();
//!     assert!(client.get("user1").await.unwrap().is_some());
//!     assert!(client.get("car1").await.is_err());
//!
//!     mock.verify();
//! }
//! ```
//!
//! For full control over timing use [`create_mock_ledger`] and answer each request by hand.

use crate::client::LedgerClient;
use crate::error::StoreError;
use crate::message::{ChangeSet, LedgerRequest, Reply, Versioned};
use crate::store::KeyValue;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

enum Expectation {
    Get {
        key: String,
        response: Result<Option<Versioned>, StoreError>,
    },
    Scan {
        response: Result<Vec<KeyValue>, StoreError>,
    },
    Commit {
        response: Result<u64, StoreError>,
    },
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    commits: Vec<ChangeSet>,
    failures: Vec<String>,
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A ledger stand-in that answers from queued expectations, in order.
///
/// A request that does not match the next expectation is answered with
/// [`StoreError::Backend`] and recorded; [`MockLedger::verify`] then fails.
pub struct MockLedger {
    client: LedgerClient,
    state: Shared,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<LedgerRequest>(100);
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let task_state = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let mut guard = lock(&task_state);
                let expectation = guard.expectations.pop_front();

                match (request, expectation) {
                    (
                        LedgerRequest::Get { key, respond_to },
                        Some(Expectation::Get {
                            key: expected,
                            response,
                        }),
                    ) if key == expected => {
                        let _ = respond_to.send(response);
                    }
                    (LedgerRequest::Scan { respond_to, .. }, Some(Expectation::Scan { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        LedgerRequest::Commit {
                            changes,
                            respond_to,
                        },
                        Some(Expectation::Commit { response }),
                    ) => {
                        if response.is_ok() {
                            guard.commits.push(changes);
                        }
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        let description = describe(&request);
                        guard.failures.push(description.clone());
                        reject(request, description);
                    }
                }
            }
        });

        Self {
            client: LedgerClient::new(sender),
            state,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> LedgerClient {
        self.client.clone()
    }

    /// Expects a point read of `key`.
    pub fn expect_get(&mut self, key: impl Into<String>) -> GetExpectationBuilder {
        GetExpectationBuilder {
            key: key.into(),
            state: self.state.clone(),
        }
    }

    /// Expects a range scan.
    pub fn expect_scan(&mut self) -> ScanExpectationBuilder {
        ScanExpectationBuilder {
            state: self.state.clone(),
        }
    }

    /// Expects a commit.
    pub fn expect_commit(&mut self) -> CommitExpectationBuilder {
        CommitExpectationBuilder {
            state: self.state.clone(),
        }
    }

    /// Change sets accepted so far.
    pub fn commits(&self) -> Vec<ChangeSet> {
        lock(&self.state).commits.clone()
    }

    /// Verifies that all expectations were met and no unexpected request arrived.
    pub fn verify(&self) {
        let state = lock(&self.state);
        if !state.failures.is_empty() {
            panic!("Unexpected requests: {:?}", state.failures);
        }
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

fn describe(request: &LedgerRequest) -> String {
    match request {
        LedgerRequest::Get { key, .. } => format!("get {key}"),
        LedgerRequest::Scan { start, end, .. } => format!("scan {start}..{end}"),
        LedgerRequest::Commit { changes, .. } => {
            format!("commit of {} writes", changes.writes.len())
        }
    }
}

fn reject(request: LedgerRequest, description: String) {
    let error = StoreError::Backend(format!("unexpected request: {description}"));
    match request {
        LedgerRequest::Get { respond_to, .. } => {
            let _ = respond_to.send(Err(error));
        }
        LedgerRequest::Scan { respond_to, .. } => {
            let _ = respond_to.send(Err(error));
        }
        LedgerRequest::Commit { respond_to, .. } => {
            let _ = respond_to.send(Err(error));
        }
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder {
    key: String,
    state: Shared,
}

impl GetExpectationBuilder {
    /// Answers with `value`, reported at version 1 when present.
    pub fn return_ok(self, value: Option<Vec<u8>>) {
        let response = Ok(value.map(|value| Versioned { value, version: 1 }));
        lock(&self.state).expectations.push_back(Expectation::Get {
            key: self.key,
            response,
        });
    }

    pub fn return_err(self, error: StoreError) {
        lock(&self.state).expectations.push_back(Expectation::Get {
            key: self.key,
            response: Err(error),
        });
    }
}

/// Builder for `scan` expectations.
pub struct ScanExpectationBuilder {
    state: Shared,
}

impl ScanExpectationBuilder {
    pub fn return_ok(self, entries: Vec<KeyValue>) {
        lock(&self.state).expectations.push_back(Expectation::Scan {
            response: Ok(entries),
        });
    }

    pub fn return_err(self, error: StoreError) {
        lock(&self.state).expectations.push_back(Expectation::Scan {
            response: Err(error),
        });
    }
}

/// Builder for `commit` expectations.
pub struct CommitExpectationBuilder {
    state: Shared,
}

impl CommitExpectationBuilder {
    /// Accepts the commit and reports `height`.
    pub fn return_ok(self, height: u64) {
        lock(&self.state).expectations.push_back(Expectation::Commit {
            response: Ok(height),
        });
    }

    pub fn return_err(self, error: StoreError) {
        lock(&self.state).expectations.push_back(Expectation::Commit {
            response: Err(error),
        });
    }
}

// =============================================================================
// MANUAL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// Nothing answers unless the test does, which lets it hold a request while other
/// things happen, or drop the reply channel to simulate a crashed ledger.
pub fn create_mock_ledger(buffer_size: usize) -> (LedgerClient, mpsc::Receiver<LedgerRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (LedgerClient::new(sender), receiver)
}

/// Waits for the next request and returns it if it is a `Get`.
pub async fn next_get(
    receiver: &mut mpsc::Receiver<LedgerRequest>,
) -> Option<(String, Reply<Option<Versioned>>)> {
    match receiver.recv().await {
        Some(LedgerRequest::Get { key, respond_to }) => Some((key, respond_to)),
        _ => None,
    }
}

/// Waits for the next request and returns it if it is a `Commit`.
pub async fn next_commit(
    receiver: &mut mpsc::Receiver<LedgerRequest>,
) -> Option<(ChangeSet, Reply<u64>)> {
    match receiver.recv().await {
        Some(LedgerRequest::Commit {
            changes,
            respond_to,
        }) => Some((changes, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;

    #[tokio::test]
    async fn test_mismatch_is_reported_not_panicked() {
        let mut mock = MockLedger::new();
        mock.expect_get("car1").return_ok(None);

        let client = mock.client();
        let result = client.get("user1").await;
        assert!(matches!(result, Err(StoreError::Backend(_))));

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| mock.verify()));
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn test_accepted_commits_are_recorded() {
        let mut mock = MockLedger::new();
        mock.expect_commit().return_ok(5);

        let mut client = mock.client();
        client.put("car1", b"{}".to_vec()).await.unwrap();

        let commits = mock.commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].writes[0].key(), "car1");
        mock.verify();
    }

    #[tokio::test]
    async fn test_dropped_reply_is_actor_dropped() {
        let (client, mut receiver) = create_mock_ledger(1);
        let pending = tokio::spawn(async move { client.get_versioned("car1").await });

        let (key, respond_to) = next_get(&mut receiver).await.unwrap();
        assert_eq!(key, "car1");
        drop(respond_to);

        assert_eq!(pending.await.unwrap(), Err(StoreError::ActorDropped));
    }
}
