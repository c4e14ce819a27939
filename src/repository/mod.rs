//! Typed persistence on top of [`RecordStore`](ledger_framework::RecordStore).

pub mod allocator;
pub mod entity;
pub mod error;

pub use allocator::{IdentifierAllocator, COUNTER_KEY};
pub use entity::EntityRepository;
pub use error::RepositoryError;
