//! Typed wrappers around [`LedgerHost`](ledger_framework::LedgerHost).

pub mod error;
pub mod lending_client;

pub use error::*;
pub use lending_client::*;
