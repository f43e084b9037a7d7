use std::collections::HashSet;

use jiff::Timestamp;
use uuid::Uuid;

use arbor_core::models::report::{FinalReport, PoolSummary};
use arbor_store::{LockScope, StoreError};

use crate::ReportPipeline;
use crate::error::ReportError;
use crate::narrative::{FinalNarrativeInput, PoolNarrativeLine};

impl ReportPipeline {
    /// Recompute and upsert the single final report row for a child.
    ///
    /// Aggregation never resets review state: the regenerated row carries
    /// the previous row's sign-off timestamps unchanged. Only the review
    /// workflow advances them.
    pub async fn generate_final_report(&self, child_id: Uuid) -> Result<FinalReport, ReportError> {
        let _guard = self.reports.lock(LockScope::Child { child_id }).await;

        let pools = self.directory.pools_for_child(child_id).await?;
        let total_pools = pools.len() as u32;
        let known: HashSet<Uuid> = pools.iter().map(|p| p.id).collect();

        let summaries = self.reports.pool_summaries_for_child(child_id).await?;
        for summary in &summaries {
            if !known.contains(&summary.pool_id) {
                tracing::warn!(
                    child_id = %child_id,
                    pool_id = %summary.pool_id,
                    "summary references a pool the directory no longer resolves"
                );
            }
        }

        let counted: Vec<&PoolSummary> = summaries
            .iter()
            .filter(|s| s.total_score.is_some())
            .collect();
        let completed_pools = counted.len() as u32;

        let (overall_score, overall_max_score) = if counted.is_empty() {
            (None, None)
        } else {
            (
                Some(counted.iter().filter_map(|s| s.total_score).sum()),
                Some(counted.iter().filter_map(|s| s.max_possible_score).sum()),
            )
        };

        tracing::info!(
            child_id = %child_id,
            completed_pools,
            total_pools,
            "generating final report"
        );

        let overall_summary = self
            .narrative
            .final_narrative(FinalNarrativeInput {
                child_id,
                pools: summaries
                    .iter()
                    .map(|s| PoolNarrativeLine {
                        pool_title: s.pool_title.clone(),
                        total_score: s.total_score,
                        max_possible_score: s.max_possible_score,
                    })
                    .collect(),
            })
            .await?;

        let previous = self.reports.final_report(child_id).await?;
        let (doctor_reviewed_at, hod_reviewed_at) = previous
            .as_ref()
            .map(|r| (r.doctor_reviewed_at, r.hod_reviewed_at))
            .unwrap_or((None, None));

        let row = FinalReport {
            id: Uuid::new_v4(),
            child_id,
            overall_summary,
            total_pools,
            completed_pools,
            overall_score,
            overall_max_score,
            doctor_reviewed_at,
            hod_reviewed_at,
            generated_at: Timestamp::now(),
        };

        self.upsert_final_report(row).await
    }

    /// Upsert keyed on the unique-per-child constraint, same retry-once
    /// discipline as the pool summary path.
    async fn upsert_final_report(&self, row: FinalReport) -> Result<FinalReport, ReportError> {
        match self.reports.final_report(row.child_id).await? {
            Some(existing) => {
                let replacement = FinalReport {
                    id: existing.id,
                    ..row
                };
                Ok(self.reports.update_final_report(replacement).await?)
            }
            None => match self.reports.insert_final_report(row.clone()).await {
                Ok(inserted) => Ok(inserted),
                Err(StoreError::UniqueViolation { .. }) => {
                    match self.reports.final_report(row.child_id).await? {
                        Some(existing) => {
                            tracing::warn!(
                                child_id = %row.child_id,
                                "lost final report insert race, updating winner's row"
                            );
                            // The winner may already carry sign-offs; never
                            // regress them.
                            let replacement = FinalReport {
                                id: existing.id,
                                doctor_reviewed_at: existing
                                    .doctor_reviewed_at
                                    .or(row.doctor_reviewed_at),
                                hod_reviewed_at: existing.hod_reviewed_at.or(row.hod_reviewed_at),
                                ..row
                            };
                            Ok(self.reports.update_final_report(replacement).await?)
                        }
                        None => Err(ReportError::Conflict {
                            scope: format!("final report {}", row.child_id),
                        }),
                    }
                }
                Err(e) => Err(e.into()),
            },
        }
    }
}
