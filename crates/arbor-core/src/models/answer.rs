use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// One answer to one question within a response.
///
/// `raw_answer` is what the respondent actually said; `answer_bucket` is the
/// normalized classification used to look up scoring rules. `score` stays
/// unset until resolved.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Answer {
    pub id: Uuid,
    pub response_id: Uuid,
    pub question_id: Uuid,
    pub raw_answer: String,
    pub answer_bucket: Option<String>,
    pub score: Option<i64>,
    pub answered_at: jiff::Timestamp,
}
