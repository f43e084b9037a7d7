use thiserror::Error;
use uuid::Uuid;

use arbor_core::models::response::ResponseStatus;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("response {response_id} is {status:?}; scores are only computed for completed responses")]
    NotCompleted {
        response_id: Uuid,
        status: ResponseStatus,
    },

    #[error("missing question {question_id}")]
    MissingQuestion { question_id: Uuid },

    #[error("invalid scoring logic: {detail}")]
    InvalidRules { detail: String },
}
