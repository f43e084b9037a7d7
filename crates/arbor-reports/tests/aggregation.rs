mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use arbor_core::models::report::{FinalReport, PoolSummary};
use arbor_reports::ReportError;
use arbor_store::{BoxFuture, LockScope, MemoryStore, ReportStore, StoreError};

use common::{CannedNarrative, pipeline, seed_pool, seed_scored_response, seed_section};

#[tokio::test]
async fn pool_summary_counts_and_sums_completed_sections() {
    let (store, pipeline) = pipeline();
    let child_id = Uuid::new_v4();
    let pool_id = seed_pool(&store, "Communication");
    let s1 = seed_section(&store, pool_id, "Expressive Language");
    let s2 = seed_section(&store, pool_id, "Receptive Language");

    seed_scored_response(&store, child_id, s1, 10, 20);
    common::seed_in_progress_response(&store, child_id, s2);

    let summary = pipeline
        .generate_pool_summary(child_id, pool_id)
        .await
        .expect("summary generated");

    assert_eq!(summary.pool_title, "Communication");
    assert_eq!(summary.total_sections, 2);
    assert_eq!(summary.completed_sections, 1);
    assert_eq!(summary.total_score, Some(10));
    assert_eq!(summary.max_possible_score, Some(20));
    assert_eq!(summary.summary_content["pool"], json!("Communication"));
}

#[tokio::test]
async fn completed_response_without_scores_is_not_counted() {
    let (store, pipeline) = pipeline();
    let child_id = Uuid::new_v4();
    let pool_id = seed_pool(&store, "Motor Skills");
    let section_id = seed_section(&store, pool_id, "Fine Motor");

    common::seed_unscored_response(&store, child_id, section_id);

    let summary = pipeline
        .generate_pool_summary(child_id, pool_id)
        .await
        .expect("summary generated");

    assert_eq!(summary.total_sections, 1);
    assert_eq!(summary.completed_sections, 0);
    assert_eq!(summary.total_score, None);
    assert_eq!(summary.max_possible_score, None);
}

#[tokio::test]
async fn regeneration_replaces_the_single_row_in_place() {
    let (store, pipeline) = pipeline();
    let child_id = Uuid::new_v4();
    let pool_id = seed_pool(&store, "Communication");
    let s1 = seed_section(&store, pool_id, "Expressive Language");
    let s2 = seed_section(&store, pool_id, "Receptive Language");

    seed_scored_response(&store, child_id, s1, 10, 20);
    let first = pipeline
        .generate_pool_summary(child_id, pool_id)
        .await
        .expect("first generation");

    seed_scored_response(&store, child_id, s2, 7, 12);
    let second = pipeline
        .generate_pool_summary(child_id, pool_id)
        .await
        .expect("second generation");

    assert_eq!(second.id, first.id);
    assert_eq!(second.completed_sections, 2);
    assert_eq!(second.total_score, Some(17));
    assert_eq!(second.max_possible_score, Some(32));

    let rows = store
        .pool_summaries_for_child(child_id)
        .await
        .expect("rows listed");
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn concurrent_generation_never_duplicates_the_row() {
    let (store, pipeline) = pipeline();
    let pipeline = Arc::new(pipeline);
    let child_id = Uuid::new_v4();
    let pool_id = seed_pool(&store, "Communication");
    let section_id = seed_section(&store, pool_id, "Expressive Language");
    seed_scored_response(&store, child_id, section_id, 5, 8);

    let a = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.generate_pool_summary(child_id, pool_id).await }
    });
    let b = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.generate_pool_summary(child_id, pool_id).await }
    });

    a.await.expect("task joined").expect("first caller succeeds");
    b.await.expect("task joined").expect("second caller succeeds");

    let rows = store
        .pool_summaries_for_child(child_id)
        .await
        .expect("rows listed");
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn unresolved_pool_is_reported_not_crashed() {
    let (_store, pipeline) = pipeline();
    let err = pipeline
        .generate_pool_summary(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::UnknownPool { .. }));
}

/// Report store that loses the insert race exactly once: a winner's row
/// lands first and the caller sees the unique violation, as when another
/// process commits between the existence check and the insert.
struct RacingReportStore {
    inner: Arc<MemoryStore>,
    raced: AtomicBool,
}

impl ReportStore for RacingReportStore {
    fn lock(&self, scope: LockScope) -> BoxFuture<'_, OwnedMutexGuard<()>> {
        self.inner.lock(scope)
    }

    fn pool_summary(
        &self,
        child_id: Uuid,
        pool_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<PoolSummary>, StoreError>> {
        self.inner.pool_summary(child_id, pool_id)
    }

    fn insert_pool_summary(
        &self,
        summary: PoolSummary,
    ) -> BoxFuture<'_, Result<PoolSummary, StoreError>> {
        Box::pin(async move {
            if !self.raced.swap(true, Ordering::SeqCst) {
                let winner = PoolSummary {
                    id: Uuid::new_v4(),
                    pool_title: "winner".to_string(),
                    ..summary.clone()
                };
                self.inner.insert_pool_summary(winner).await?;
                return Err(StoreError::UniqueViolation {
                    constraint: "pool_summaries(child_id, pool_id)",
                });
            }
            self.inner.insert_pool_summary(summary).await
        })
    }

    fn update_pool_summary(
        &self,
        summary: PoolSummary,
    ) -> BoxFuture<'_, Result<PoolSummary, StoreError>> {
        self.inner.update_pool_summary(summary)
    }

    fn pool_summaries_for_child(
        &self,
        child_id: Uuid,
    ) -> BoxFuture<'_, Result<Vec<PoolSummary>, StoreError>> {
        self.inner.pool_summaries_for_child(child_id)
    }

    fn final_report(
        &self,
        child_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<FinalReport>, StoreError>> {
        self.inner.final_report(child_id)
    }

    fn insert_final_report(
        &self,
        report: FinalReport,
    ) -> BoxFuture<'_, Result<FinalReport, StoreError>> {
        self.inner.insert_final_report(report)
    }

    fn update_final_report(
        &self,
        report: FinalReport,
    ) -> BoxFuture<'_, Result<FinalReport, StoreError>> {
        self.inner.update_final_report(report)
    }
}

#[tokio::test]
async fn lost_insert_race_retries_once_and_updates_the_winner_row() {
    let store = Arc::new(MemoryStore::new());
    let racing = Arc::new(RacingReportStore {
        inner: store.clone(),
        raced: AtomicBool::new(false),
    });
    let pipeline = arbor_reports::ReportPipeline::new(
        store.clone(),
        racing,
        store.clone(),
        Arc::new(CannedNarrative),
    );

    let child_id = Uuid::new_v4();
    let pool_id = seed_pool(&store, "Motor Skills");
    let section_id = seed_section(&store, pool_id, "Gross Motor");
    seed_scored_response(&store, child_id, section_id, 3, 6);

    let summary = pipeline
        .generate_pool_summary(child_id, pool_id)
        .await
        .expect("loser recovers by updating the winner's row");

    // One row, carrying the loser's recomputed content.
    let rows = store
        .pool_summaries_for_child(child_id)
        .await
        .expect("rows listed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, summary.id);
    assert_eq!(rows[0].pool_title, "Motor Skills");
    assert_eq!(rows[0].total_score, Some(3));
}

#[tokio::test]
async fn final_report_aggregates_pool_summaries() {
    let (store, pipeline) = pipeline();
    let child_id = Uuid::new_v4();

    let communication = seed_pool(&store, "Communication");
    let motor = seed_pool(&store, "Motor Skills");
    let s1 = seed_section(&store, communication, "Expressive Language");
    let s2 = seed_section(&store, motor, "Gross Motor");
    seed_scored_response(&store, child_id, s1, 10, 20);
    seed_scored_response(&store, child_id, s2, 4, 10);

    pipeline
        .generate_pool_summary(child_id, communication)
        .await
        .expect("communication summary");
    pipeline
        .generate_pool_summary(child_id, motor)
        .await
        .expect("motor summary");

    let report = pipeline
        .generate_final_report(child_id)
        .await
        .expect("final report");

    assert_eq!(report.total_pools, 2);
    assert_eq!(report.completed_pools, 2);
    assert_eq!(report.overall_score, Some(14));
    assert_eq!(report.overall_max_score, Some(30));
    assert_eq!(report.overall_summary["pools"], json!(2));
}

#[tokio::test]
async fn final_report_counts_pools_without_scores_as_incomplete() {
    let (store, pipeline) = pipeline();
    let child_id = Uuid::new_v4();

    let communication = seed_pool(&store, "Communication");
    let motor = seed_pool(&store, "Motor Skills");
    let s1 = seed_section(&store, communication, "Expressive Language");
    seed_section(&store, motor, "Gross Motor");
    seed_scored_response(&store, child_id, s1, 10, 20);

    pipeline
        .generate_pool_summary(child_id, communication)
        .await
        .expect("scored summary");
    pipeline
        .generate_pool_summary(child_id, motor)
        .await
        .expect("unscored summary");

    let report = pipeline
        .generate_final_report(child_id)
        .await
        .expect("final report");

    assert_eq!(report.total_pools, 2);
    assert_eq!(report.completed_pools, 1);
    assert_eq!(report.overall_score, Some(10));
    assert_eq!(report.overall_max_score, Some(20));
}

#[tokio::test]
async fn regenerating_a_final_report_preserves_review_state() {
    let (store, pipeline) = pipeline();
    let child_id = Uuid::new_v4();
    let pool_id = seed_pool(&store, "Communication");
    let section_id = seed_section(&store, pool_id, "Expressive Language");
    seed_scored_response(&store, child_id, section_id, 10, 20);

    pipeline
        .generate_pool_summary(child_id, pool_id)
        .await
        .expect("pool summary");
    let first = pipeline
        .generate_final_report(child_id)
        .await
        .expect("first report");

    let signed = pipeline
        .advance_review(child_id, arbor_reports::ReviewStage::Doctor, common::ts(60))
        .await
        .expect("doctor sign-off");
    assert_eq!(signed.doctor_reviewed_at, Some(common::ts(60)));

    let regenerated = pipeline
        .generate_final_report(child_id)
        .await
        .expect("regenerated report");

    assert_eq!(regenerated.id, first.id);
    assert_eq!(regenerated.doctor_reviewed_at, Some(common::ts(60)));
    assert_eq!(regenerated.hod_reviewed_at, None);
}
