//! # Ledger Framework
//!
//! This crate provides a small transactional key-value ledger and a host that runs
//! stateless business logic ("contracts") against it.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Storage Layer** ([`LedgerActor`]) - one actor owns every record and applies
//!    commits one at a time, so each commit is atomic.
//! 2. **Transaction Layer** ([`Transaction`]) - the [`RecordStore`] a contract sees.
//!    Reads go through, writes and events are staged until commit.
//! 3. **Execution Layer** ([`LedgerHost`]) - runs a [`Contract`] call inside a
//!    transaction, commits on success, discards on rejection and re-executes on conflict.
//!
//! Business logic is written once against [`RecordStore`] and [`EventSink`] and never
//! sees the actor or the channels.
//!
//! ## Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use ledger_framework::{
//!     BroadcastSink, Contract, EventSink, LedgerActor, LedgerHost, RecordStore, Response,
//!     Transaction,
//! };
//! use std::sync::Arc;
//!
//! struct Counter;
//!
//! #[async_trait]
//! impl Contract for Counter {
//!     async fn invoke(&self, tx: &mut Transaction, _function: &str, _args: &[String]) -> Response {
//!         let current = match tx.get("count").await {
//!             Ok(Some(bytes)) => String::from_utf8_lossy(&bytes).parse::<u64>().unwrap_or(0),
//!             Ok(None) => 0,
//!             Err(e) => return Response::error(500, e.to_string()),
//!         };
//!         let next = (current + 1).to_string();
//!         if let Err(e) = tx.put("count", next.clone().into_bytes()).await {
//!             return Response::error(500, e.to_string());
//!         }
//!         tx.publish("Counted", next.clone().into_bytes());
//!         Response::ok(next.into_bytes())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, ledger) = LedgerActor::new(16);
//!     tokio::spawn(actor.run());
//!
//!     let events = BroadcastSink::new(16);
//!     let mut rx = events.subscribe();
//!     let host = LedgerHost::new(Counter, ledger, Arc::new(events));
//!
//!     let response = host.invoke("increment", &[]).await;
//!     assert_eq!(response.payload, b"1".to_vec());
//!     assert_eq!(rx.recv().await.unwrap().tag, "Counted");
//! }
//! ```

pub mod actor;
pub mod client;
pub mod contract;
pub mod error;
pub mod event;
pub mod host;
pub mod message;
pub mod mock;
pub mod record;
pub mod store;
pub mod tracing;
pub mod transaction;

pub use actor::LedgerActor;
pub use client::LedgerClient;
pub use contract::{status, Contract, Response};
pub use error::StoreError;
pub use event::{BroadcastSink, EventSink, Fanout, LedgerEvent, TracingSink};
pub use host::{LedgerHost, DEFAULT_MAX_RETRIES};
pub use message::{ChangeSet, LedgerRequest, Versioned, WriteOp};
pub use record::Record;
pub use store::{prefix_range, KeyValue, RecordStore};
pub use transaction::{Committed, Transaction};
