//! arbor-scoring
//!
//! Scoring rule definitions and the response score calculator. Pure data and
//! pure functions — resolving a score never touches a store, so repeated
//! execution on unchanged inputs yields identical results.

pub mod calculator;
pub mod error;
pub mod protocol;
pub mod rules;

pub use calculator::{CoverageGap, GapKind, ScoreOutcome, score_response};
pub use error::ScoringError;
pub use rules::{AgeBand, BucketScores, ScoringRules};
