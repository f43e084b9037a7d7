use thiserror::Error;
use uuid::Uuid;

use arbor_core::models::report::ReviewState;
use arbor_scoring::ScoringError;
use arbor_store::StoreError;

use crate::review::ReviewStage;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("pool {pool_id} does not resolve")]
    UnknownPool { pool_id: Uuid },

    #[error("no final report exists for child {child_id}")]
    MissingReport { child_id: Uuid },

    #[error("cannot apply {stage:?} sign-off while report is {state:?}")]
    OrderingViolation {
        child_id: Uuid,
        stage: ReviewStage,
        state: ReviewState,
    },

    #[error("aggregate upsert for {scope} still conflicting after retry")]
    Conflict { scope: String },

    #[error("narrative generation failed: {0}")]
    Narrative(String),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
