use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arbor_core::models::question::Question;
use arbor_scoring::{CoverageGap, score_response};
use arbor_store::ScoreUpdate;

use crate::ReportPipeline;
use crate::error::ReportError;

/// Result of recomputing one response's authoritative scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalcOutcome {
    pub response_id: Uuid,
    pub total_score: i64,
    pub max_possible_score: i64,
    pub gaps: Vec<CoverageGap>,
}

impl ReportPipeline {
    /// Recompute and persist one response's scores.
    ///
    /// Recalculation is a deliberate act: nothing recomputes scores
    /// implicitly when answers or rules change after completion.
    pub async fn recalculate(&self, response_id: Uuid) -> Result<RecalcOutcome, ReportError> {
        let outcome = self.compute_scores(response_id).await?;
        self.assessments
            .apply_score_updates(&[ScoreUpdate {
                response_id: outcome.response_id,
                total_score: outcome.total_score,
                max_possible_score: outcome.max_possible_score,
            }])
            .await?;

        tracing::info!(
            response_id = %response_id,
            total_score = outcome.total_score,
            max_possible_score = outcome.max_possible_score,
            gaps = outcome.gaps.len(),
            "response scores recalculated"
        );
        Ok(outcome)
    }

    /// Score one response without persisting. Shared by `recalculate` and
    /// the backfill runner, which stages updates for batched commits.
    pub(crate) async fn compute_scores(
        &self,
        response_id: Uuid,
    ) -> Result<RecalcOutcome, ReportError> {
        let response = self.assessments.response(response_id).await?;
        let answers = self.assessments.answers_for_response(response_id).await?;
        let questions: HashMap<Uuid, Question> = self
            .assessments
            .questions_for_section(response.section_id)
            .await?
            .into_iter()
            .map(|q| (q.id, q))
            .collect();

        // Completed rows missing completed_at are exactly the corrupt shape
        // a backfill must heal; fall back to the present for age resolution.
        let as_of = response.completed_at.unwrap_or_else(jiff::Timestamp::now);
        let age_months = self
            .directory
            .age_months_at(response.child_id, as_of)
            .await?;

        let outcome = score_response(&response, &answers, &questions, age_months)?;
        if !outcome.gaps.is_empty() {
            tracing::warn!(
                response_id = %response_id,
                gaps = outcome.gaps.len(),
                "scoring rule coverage gaps recorded"
            );
        }
        Ok(RecalcOutcome {
            response_id: outcome.response_id,
            total_score: outcome.total_score,
            max_possible_score: outcome.max_possible_score,
            gaps: outcome.gaps,
        })
    }
}
