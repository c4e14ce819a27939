//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by the
//! `RUST_LOG` environment variable.
//!
//! ## What Gets Traced
//!
//! - **Ledger**: startup, every commit with its height, refused commits, shutdown
//! - **Host**: rejected invocations, commit conflicts and retries, storage failures
//! - **Contracts**: each operation with its arguments at `debug`, outcomes at `info`
//!
//! ```bash
//! # Commits and lending outcomes
//! RUST_LOG=info cargo run
//!
//! # Every read, scan and rejection
//! RUST_LOG=debug cargo run
//!
//! # Only the ledger framework
//! RUST_LOG=ledger_framework=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a borrow followed by a return reads:
//!
//! ```text
//! INFO Committed height=2 writes=4 records=16
//! INFO invoke{function="borrowCar" args=2}: Car borrowed borrow_id=1 car_id=3 user_id=1
//! INFO Committed height=3 writes=4 records=17
//! INFO invoke{function="returnCar" args=2}: Car returned borrow_id=1 driven_km=50
//! ```

/// Initializes the global subscriber.
///
/// Safe to call more than once: later calls leave the first subscriber in place, so
/// tests can call it freely.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Don't show module paths, spans already name the operation
        .compact()
        .try_init();
}
