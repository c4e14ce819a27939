//! Runtime orchestration: starting the ledger, wiring the contract and shutting down.
//!
//! - [`LendingSystem`] spawns the ledger actor, builds the host around [`CarLedger`]
//!   and hands out [`LendingClient`]s.
//! - [`setup_tracing`] initializes logging for binaries and tests.
//!
//! [`CarLedger`]: crate::contract::CarLedger
//! [`LendingClient`]: crate::clients::LendingClient

pub mod lending_system;

pub use ledger_framework::tracing::setup_tracing;
pub use lending_system::*;
