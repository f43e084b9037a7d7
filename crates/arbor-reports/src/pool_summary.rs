use jiff::Timestamp;
use uuid::Uuid;

use arbor_core::models::report::PoolSummary;
use arbor_core::models::response::{Response, ResponseStatus};
use arbor_store::{LockScope, StoreError};

use crate::ReportPipeline;
use crate::error::ReportError;
use crate::narrative::PoolNarrativeInput;

impl ReportPipeline {
    /// Recompute and upsert the single summary row for (child, pool).
    ///
    /// Serialized per (child, pool) scope, and the row is replaced
    /// wholesale, so regeneration is always safe. Responses without
    /// persisted scores are not counted.
    pub async fn generate_pool_summary(
        &self,
        child_id: Uuid,
        pool_id: Uuid,
    ) -> Result<PoolSummary, ReportError> {
        let _guard = self
            .reports
            .lock(LockScope::Pool { child_id, pool_id })
            .await;

        let pool = self
            .directory
            .pool(pool_id)
            .await?
            .ok_or(ReportError::UnknownPool { pool_id })?;

        let section_ids = self.directory.sections_in_pool(pool_id).await?;
        let total_sections = section_ids.len() as u32;

        let responses = self
            .assessments
            .responses_for_sections(child_id, &section_ids)
            .await?;
        let counted: Vec<&Response> = responses
            .iter()
            .filter(|r| r.status == ResponseStatus::Completed && r.has_scores())
            .collect();
        let completed_sections = counted.len() as u32;

        let (total_score, max_possible_score) = if counted.is_empty() {
            (None, None)
        } else {
            (
                Some(counted.iter().filter_map(|r| r.total_score).sum()),
                Some(counted.iter().filter_map(|r| r.max_possible_score).sum()),
            )
        };

        tracing::info!(
            child_id = %child_id,
            pool_id = %pool_id,
            completed_sections,
            total_sections,
            "generating pool summary"
        );

        let summary_content = self
            .narrative
            .pool_narrative(PoolNarrativeInput {
                child_id,
                pool_id,
                pool_title: pool.title.clone(),
                total_sections,
                completed_sections,
                total_score,
                max_possible_score,
            })
            .await?;

        let row = PoolSummary {
            id: Uuid::new_v4(),
            child_id,
            pool_id,
            pool_title: pool.title,
            summary_content,
            total_sections,
            completed_sections,
            total_score,
            max_possible_score,
            generated_at: Timestamp::now(),
        };

        self.upsert_pool_summary(row).await
    }

    /// Upsert keyed on the (child_id, pool_id) unique constraint. The loser
    /// of a cross-process insert race re-reads the winner's committed row
    /// and updates it; a second conflict is reported as transient.
    async fn upsert_pool_summary(&self, row: PoolSummary) -> Result<PoolSummary, ReportError> {
        match self.reports.pool_summary(row.child_id, row.pool_id).await? {
            Some(existing) => {
                let replacement = PoolSummary {
                    id: existing.id,
                    ..row
                };
                Ok(self.reports.update_pool_summary(replacement).await?)
            }
            None => match self.reports.insert_pool_summary(row.clone()).await {
                Ok(inserted) => Ok(inserted),
                Err(StoreError::UniqueViolation { .. }) => {
                    match self.reports.pool_summary(row.child_id, row.pool_id).await? {
                        Some(existing) => {
                            tracing::warn!(
                                child_id = %row.child_id,
                                pool_id = %row.pool_id,
                                "lost pool summary insert race, updating winner's row"
                            );
                            let replacement = PoolSummary {
                                id: existing.id,
                                ..row
                            };
                            Ok(self.reports.update_pool_summary(replacement).await?)
                        }
                        None => Err(ReportError::Conflict {
                            scope: format!("pool summary {}/{}", row.child_id, row.pool_id),
                        }),
                    }
                }
                Err(e) => Err(e.into()),
            },
        }
    }
}
