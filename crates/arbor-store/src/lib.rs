//! arbor-store
//!
//! Seams to the transactional data store and the external assessment
//! directory, plus an in-memory reference backend. Aggregate upserts rely on
//! the store's unique constraints and scoped exclusive locks; this crate
//! defines those contracts.

pub mod error;
pub mod locks;
pub mod memory;
pub mod traits;

pub use error::StoreError;
pub use locks::{KeyedLocks, LockScope};
pub use memory::MemoryStore;
pub use traits::{AssessmentDirectory, AssessmentStore, BoxFuture, ReportStore, ScoreUpdate};
