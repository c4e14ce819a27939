//! # Ledger Host
//!
//! The [`LedgerHost`] runs a [`Contract`] against the ledger. Each invocation gets a fresh
//! [`Transaction`]; a successful response commits it and only then releases the events
//! the contract published. When the commit loses a race with another invocation the
//! whole call is executed again on fresh state, up to `max_retries` extra attempts.

use crate::client::LedgerClient;
use crate::contract::{status, Contract, Response};
use crate::event::EventSink;
use crate::transaction::Transaction;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Default number of re-executions after a commit conflict.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy)]
enum Call<'a> {
    Init,
    Invoke {
        function: &'a str,
        args: &'a [String],
    },
}

/// Executes contract calls as atomic, isolated units.
///
/// Cheap to clone; clones share the contract, the ledger client and the event sink.
pub struct LedgerHost<C> {
    contract: Arc<C>,
    ledger: LedgerClient,
    sink: Arc<dyn EventSink>,
    max_retries: u32,
}

impl<C> Clone for LedgerHost<C> {
    fn clone(&self) -> Self {
        Self {
            contract: Arc::clone(&self.contract),
            ledger: self.ledger.clone(),
            sink: Arc::clone(&self.sink),
            max_retries: self.max_retries,
        }
    }
}

impl<C: Contract> LedgerHost<C> {
    pub fn new(contract: C, ledger: LedgerClient, sink: Arc<dyn EventSink>) -> Self {
        Self {
            contract: Arc::new(contract),
            ledger,
            sink,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn ledger(&self) -> &LedgerClient {
        &self.ledger
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    /// Runs the contract's `init` hook.
    #[instrument(skip(self))]
    pub async fn init(&self) -> Response {
        self.execute(Call::Init).await
    }

    /// Invokes `function` with positional arguments.
    #[instrument(skip(self, args), fields(args = args.len()))]
    pub async fn invoke(&self, function: &str, args: &[String]) -> Response {
        self.execute(Call::Invoke { function, args }).await
    }

    async fn execute(&self, call: Call<'_>) -> Response {
        let mut attempt: u32 = 0;
        loop {
            let mut tx = Transaction::begin(self.ledger.clone());
            let response = match call {
                Call::Init => self.contract.init(&mut tx).await,
                Call::Invoke { function, args } => {
                    self.contract.invoke(&mut tx, function, args).await
                }
            };

            if !response.is_success() {
                debug!(
                    status = response.status,
                    message = %response.message,
                    staged = tx.pending_writes(),
                    "Rejected, discarding staged writes"
                );
                return response;
            }

            match tx.commit().await {
                Ok(committed) => {
                    debug!(
                        status = response.status,
                        height = ?committed.height,
                        events = committed.events.len(),
                        "Committed"
                    );
                    for event in committed.events {
                        self.sink.publish(&event.tag, event.detail);
                    }
                    return response;
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "Commit conflict, retrying");
                }
                Err(e) => {
                    error!(error = %e, attempt, "Commit failed");
                    return Response::error(status::INTERNAL_ERROR, e.to_string());
                }
            }
        }
    }
}
