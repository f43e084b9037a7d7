use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arbor_store::ScoreUpdate;

use crate::ReportPipeline;
use crate::error::ReportError;

/// Tunables for a backfill run.
#[derive(Debug, Clone, Copy)]
pub struct BackfillOptions {
    /// Staged updates per committed batch.
    pub batch_size: usize,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self { batch_size: 10 }
    }
}

/// One response the run could not heal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    pub response_id: Uuid,
    pub reason: String,
}

/// Authoritative record of a completed backfill run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub updated: usize,
    pub failed: usize,
    pub failures: Vec<RunFailure>,
}

/// Per-run working state, constructed fresh for every invocation — nothing
/// survives between runs.
struct RunContext {
    candidates: Vec<Uuid>,
    updated: usize,
    failures: Vec<RunFailure>,
    staged: Vec<ScoreUpdate>,
}

impl RunContext {
    fn new(candidates: Vec<Uuid>) -> Self {
        Self {
            candidates,
            updated: 0,
            failures: Vec::new(),
            staged: Vec::new(),
        }
    }

    fn into_summary(self) -> RunSummary {
        RunSummary {
            total: self.candidates.len(),
            updated: self.updated,
            failed: self.failures.len(),
            failures: self.failures,
        }
    }
}

impl ReportPipeline {
    /// Heal completed responses whose derived scores are still NULL.
    ///
    /// The candidate set is snapshotted once at the start. Item failures are
    /// recorded and skipped, never fatal. Staged updates commit in
    /// fixed-size batches so a long run checkpoints as it goes: an
    /// interrupted run is simply re-run, and already-healed rows drop out
    /// of the next candidate set.
    pub async fn run_backfill(&self, options: BackfillOptions) -> Result<RunSummary, ReportError> {
        let candidates = self.assessments.completed_with_null_scores().await?;
        tracing::info!(
            candidates = candidates.len(),
            batch_size = options.batch_size,
            "starting score backfill"
        );

        let mut ctx = RunContext::new(candidates);
        let batch_size = options.batch_size.max(1);
        for response_id in ctx.candidates.clone() {
            match self.compute_scores(response_id).await {
                Ok(outcome) => {
                    ctx.staged.push(ScoreUpdate {
                        response_id,
                        total_score: outcome.total_score,
                        max_possible_score: outcome.max_possible_score,
                    });
                    if ctx.staged.len() >= batch_size {
                        self.commit_staged(&mut ctx).await;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        response_id = %response_id,
                        error = %e,
                        "backfill item failed"
                    );
                    ctx.failures.push(RunFailure {
                        response_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        if !ctx.staged.is_empty() {
            self.commit_staged(&mut ctx).await;
        }

        let summary = ctx.into_summary();
        tracing::info!(
            total = summary.total,
            updated = summary.updated,
            failed = summary.failed,
            "score backfill complete"
        );
        Ok(summary)
    }

    /// Commit the staged batch. A failed commit fails every item staged in
    /// it but never the run — later batches still get their chance.
    async fn commit_staged(&self, ctx: &mut RunContext) {
        let staged = std::mem::take(&mut ctx.staged);
        match self.assessments.apply_score_updates(&staged).await {
            Ok(()) => {
                ctx.updated += staged.len();
                tracing::info!(
                    committed = staged.len(),
                    updated = ctx.updated,
                    "committed score batch"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    dropped = staged.len(),
                    "score batch commit failed"
                );
                for update in staged {
                    ctx.failures.push(RunFailure {
                        response_id: update.response_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}
