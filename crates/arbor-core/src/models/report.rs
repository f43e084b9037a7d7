use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Aggregate of all sections under one (child, pool) pair.
///
/// At most one row ever exists per pair. A derived artifact owned by the
/// aggregation pipeline — safe to delete and regenerate; responses and
/// answers remain the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PoolSummary {
    pub id: Uuid,
    pub child_id: Uuid,
    /// Soft reference to the externally-owned pool.
    pub pool_id: Uuid,
    /// Denormalized pool title for convenience.
    pub pool_title: String,
    /// Opaque narrative blob produced by an external generator.
    pub summary_content: serde_json::Value,
    pub total_sections: u32,
    pub completed_sections: u32,
    pub total_score: Option<i64>,
    pub max_possible_score: Option<i64>,
    pub generated_at: jiff::Timestamp,
}

/// Aggregate of all pools for one child, plus the two-stage sign-off.
///
/// Unique per child. Invariant: `hod_reviewed_at` is non-null only when
/// `doctor_reviewed_at` is non-null and does not exceed it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinalReport {
    pub id: Uuid,
    pub child_id: Uuid,
    /// Opaque narrative blob produced by an external generator.
    pub overall_summary: serde_json::Value,
    pub total_pools: u32,
    pub completed_pools: u32,
    pub overall_score: Option<i64>,
    pub overall_max_score: Option<i64>,
    pub doctor_reviewed_at: Option<jiff::Timestamp>,
    pub hod_reviewed_at: Option<jiff::Timestamp>,
    pub generated_at: jiff::Timestamp,
}

/// The review state machine, derived from the two sign-off timestamps.
/// Never stored — every transition decision derives it here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ReviewState {
    Unreviewed,
    DoctorReviewed,
    HodReviewed,
}

impl FinalReport {
    pub fn review_state(&self) -> ReviewState {
        match (self.doctor_reviewed_at, self.hod_reviewed_at) {
            (_, Some(_)) => ReviewState::HodReviewed,
            (Some(_), None) => ReviewState::DoctorReviewed,
            (None, None) => ReviewState::Unreviewed,
        }
    }
}
