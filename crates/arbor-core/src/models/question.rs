use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// A single assessment question.
///
/// `scoring_logic` is an open-ended JSON blob owned by form configuration;
/// the scoring crate validates it into a typed shape before any score is
/// derived from it. Once answers reference this question in a completed
/// response, editing the blob never rewrites already-stored scores —
/// recomputation is a separate, deliberate act.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Question {
    pub id: Uuid,
    pub section_id: Uuid,
    pub text: String,
    pub is_scorable: bool,
    pub scoring_logic: Option<serde_json::Value>,
    pub order_number: i32,
}
