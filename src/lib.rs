//! # Car Ledger
//!
//! > **Car lending on a transactional ledger.**
//!
//! Users borrow cars one at a time and return them with an odometer reading. Every
//! return leaves a travel log. Cars and users live as JSON records on the ledger run by
//! [`ledger_framework`]; each operation is a contract call that commits all of its writes
//! and events, or none of them.
//!
//! ## Invariants
//!
//! - A user holds at most one car and a car is held by at most one user.
//! - `car.borrowId == user.borrowId` for a linked pair, and the borrow record with that
//!   id names both of them.
//! - Odometers never decrease.
//! - Borrow ids come from the `counterB` record and are never reused.
//!
//! ## Module Tour
//!
//! ### 1. The Data ([`model`], [`repository`])
//! Plain serde records and typed access to them over any
//! [`RecordStore`](ledger_framework::RecordStore).
//!
//! ### 2. The Rules ([`lending`])
//! [`LendingStateMachine`](lending::LendingStateMachine) with the borrow and return
//! transitions, their validated inputs and the invariant checks.
//!
//! ### 3. The Contract ([`contract`])
//! [`CarLedger`](contract::CarLedger) dispatches operation names to the transitions,
//! the provisioning operations and the log queries.
//!
//! ### 4. The Interface ([`clients`], [`lifecycle`], [`config`])
//! [`LendingSystem`](lifecycle::LendingSystem) starts everything and hands out typed
//! [`LendingClient`](clients::LendingClient)s.
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod clients;
pub mod config;
pub mod contract;
pub mod lending;
pub mod lifecycle;
pub mod model;
pub mod repository;
