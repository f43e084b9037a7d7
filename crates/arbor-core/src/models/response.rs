use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ResponseStatus {
    InProgress,
    Completed,
}

/// One assessment session for one child and one section.
///
/// `total_score` and `max_possible_score` are derived fields, NULL until
/// computed. A response with NULL scores is never counted in any aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Response {
    pub id: Uuid,
    pub child_id: Uuid,
    pub section_id: Uuid,
    pub status: ResponseStatus,
    pub total_score: Option<i64>,
    pub max_possible_score: Option<i64>,
    pub completed_at: Option<jiff::Timestamp>,
}

impl Response {
    /// True once both derived scores are present.
    pub fn has_scores(&self) -> bool {
        self.total_score.is_some() && self.max_possible_score.is_some()
    }
}
