use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found: {entity} {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: &'static str },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
