//! arbor-core
//!
//! Pure domain types for the assessment scoring and report pipeline.
//! No IO dependency — this is the shared vocabulary of the Arbor system.

pub mod error;
pub mod models;
