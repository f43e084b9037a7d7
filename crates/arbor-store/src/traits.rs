use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use arbor_core::models::answer::Answer;
use arbor_core::models::pool::Pool;
use arbor_core::models::question::Question;
use arbor_core::models::report::{FinalReport, PoolSummary};
use arbor_core::models::response::Response;

use crate::error::StoreError;
use crate::locks::LockScope;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One staged score write, applied atomically in batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub response_id: Uuid,
    pub total_score: i64,
    pub max_possible_score: i64,
}

/// Read access to responses, answers, and questions, plus the score-write
/// path used by recalculation.
pub trait AssessmentStore: Send + Sync {
    fn response(&self, id: Uuid) -> BoxFuture<'_, Result<Response, StoreError>>;

    fn answers_for_response(
        &self,
        response_id: Uuid,
    ) -> BoxFuture<'_, Result<Vec<Answer>, StoreError>>;

    /// The full form structure of a section — scorable maxima range over
    /// these, answered or not.
    fn questions_for_section(
        &self,
        section_id: Uuid,
    ) -> BoxFuture<'_, Result<Vec<Question>, StoreError>>;

    fn responses_for_sections<'a>(
        &'a self,
        child_id: Uuid,
        section_ids: &'a [Uuid],
    ) -> BoxFuture<'a, Result<Vec<Response>, StoreError>>;

    /// Snapshot of completed responses still missing derived scores.
    fn completed_with_null_scores(&self) -> BoxFuture<'_, Result<Vec<Uuid>, StoreError>>;

    /// Apply one batch of staged score updates. All land or none do.
    fn apply_score_updates<'a>(
        &'a self,
        updates: &'a [ScoreUpdate],
    ) -> BoxFuture<'a, Result<(), StoreError>>;
}

/// Aggregate rows and the scoped locks that serialize their generation.
pub trait ReportStore: Send + Sync {
    /// Acquire the exclusive lock for a generation scope. Dropping the
    /// guard releases the scope, on every exit path.
    fn lock(&self, scope: LockScope) -> BoxFuture<'_, OwnedMutexGuard<()>>;

    fn pool_summary(
        &self,
        child_id: Uuid,
        pool_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<PoolSummary>, StoreError>>;

    /// Insert a new summary row. `UniqueViolation` when a row for the
    /// (child, pool) pair already exists.
    fn insert_pool_summary(
        &self,
        summary: PoolSummary,
    ) -> BoxFuture<'_, Result<PoolSummary, StoreError>>;

    fn update_pool_summary(
        &self,
        summary: PoolSummary,
    ) -> BoxFuture<'_, Result<PoolSummary, StoreError>>;

    fn pool_summaries_for_child(
        &self,
        child_id: Uuid,
    ) -> BoxFuture<'_, Result<Vec<PoolSummary>, StoreError>>;

    fn final_report(
        &self,
        child_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<FinalReport>, StoreError>>;

    /// Insert a new report row. `UniqueViolation` when the child already
    /// has one.
    fn insert_final_report(
        &self,
        report: FinalReport,
    ) -> BoxFuture<'_, Result<FinalReport, StoreError>>;

    fn update_final_report(
        &self,
        report: FinalReport,
    ) -> BoxFuture<'_, Result<FinalReport, StoreError>>;
}

/// The external collaborator that owns pools, sections, and child ages.
pub trait AssessmentDirectory: Send + Sync {
    /// Pool metadata; `None` when the soft reference no longer resolves.
    fn pool(&self, pool_id: Uuid) -> BoxFuture<'_, Result<Option<Pool>, StoreError>>;

    fn pools_for_child(&self, child_id: Uuid) -> BoxFuture<'_, Result<Vec<Pool>, StoreError>>;

    fn sections_in_pool(&self, pool_id: Uuid) -> BoxFuture<'_, Result<Vec<Uuid>, StoreError>>;

    /// Child age in whole months as of `at`.
    fn age_months_at(
        &self,
        child_id: Uuid,
        at: jiff::Timestamp,
    ) -> BoxFuture<'_, Result<u32, StoreError>>;
}
