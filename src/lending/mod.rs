//! # Lending State Machine
//!
//! A user and a car are either both **available** (no active borrow) or both **borrowed**
//! by the same borrow id. [`LendingStateMachine::borrow`] moves a pair from the first
//! state to the second, [`LendingStateMachine::return_car`] moves it back and leaves a
//! [`TravelLog`](crate::model::TravelLog) behind.
//!
//! A transition either stages all of its writes or none. Validation failures are
//! returned before the first write.

pub mod clock;
pub mod error;
pub mod events;
pub mod invariants;
pub mod machine;
pub mod params;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{kind_of, ErrorKind, LendingError};
pub use events::{CarBorrowed, CarReturned, BORROWED_TAG, RETURNED_TAG};
pub use machine::LendingStateMachine;
pub use params::{BorrowPayload, BorrowRequest, Payload, ReturnPayload, ReturnRequest};
