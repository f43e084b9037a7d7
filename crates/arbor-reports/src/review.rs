use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arbor_core::models::report::{FinalReport, ReviewState};
use arbor_store::LockScope;

use crate::ReportPipeline;
use crate::error::ReportError;

/// The two ordered sign-off stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStage {
    Doctor,
    Hod,
}

impl ReportPipeline {
    /// Advance the two-stage sign-off on a child's final report.
    ///
    /// Transitions are one-directional: doctor first, then HOD. Re-applying
    /// an already-satisfied stage is an accepted no-op that keeps the
    /// original timestamp. The child-scoped lock makes the check-then-write
    /// atomic against a racing second transition.
    pub async fn advance_review(
        &self,
        child_id: Uuid,
        stage: ReviewStage,
        at: Timestamp,
    ) -> Result<FinalReport, ReportError> {
        let _guard = self.reports.lock(LockScope::Child { child_id }).await;

        let mut report = self
            .reports
            .final_report(child_id)
            .await?
            .ok_or(ReportError::MissingReport { child_id })?;

        let state = report.review_state();
        match (stage, state) {
            // Idempotent retries: the stage is already satisfied.
            (ReviewStage::Doctor, ReviewState::DoctorReviewed | ReviewState::HodReviewed)
            | (ReviewStage::Hod, ReviewState::HodReviewed) => {
                tracing::info!(child_id = %child_id, ?stage, "sign-off already recorded, no-op");
                return Ok(report);
            }

            (ReviewStage::Doctor, ReviewState::Unreviewed) => {
                report.doctor_reviewed_at = Some(at);
            }

            (ReviewStage::Hod, ReviewState::DoctorReviewed) => {
                // doctor_reviewed_at <= hod_reviewed_at must hold.
                if report.doctor_reviewed_at.is_some_and(|doctor| at < doctor) {
                    return Err(ReportError::OrderingViolation {
                        child_id,
                        stage,
                        state,
                    });
                }
                report.hod_reviewed_at = Some(at);
            }

            (ReviewStage::Hod, ReviewState::Unreviewed) => {
                return Err(ReportError::OrderingViolation {
                    child_id,
                    stage,
                    state,
                });
            }
        }

        tracing::info!(child_id = %child_id, ?stage, "review sign-off recorded");
        Ok(self.reports.update_final_report(report).await?)
    }
}
