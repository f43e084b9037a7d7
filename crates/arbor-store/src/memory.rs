//! In-memory reference backend.
//!
//! Implements every store contract over process-local maps: both uniqueness
//! constraints, atomic batch score commits, and the keyed-lock registry. The
//! integration suites run against it, and it doubles as executable
//! documentation of what a SQL backend must provide.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use arbor_core::models::answer::Answer;
use arbor_core::models::pool::Pool;
use arbor_core::models::question::Question;
use arbor_core::models::report::{FinalReport, PoolSummary};
use arbor_core::models::response::{Response, ResponseStatus};
use arbor_core::models::section::Section;

use crate::error::StoreError;
use crate::locks::{KeyedLocks, LockScope};
use crate::traits::{
    AssessmentDirectory, AssessmentStore, BoxFuture, ReportStore, ScoreUpdate,
};

#[derive(Default)]
struct Inner {
    questions: BTreeMap<Uuid, Question>,
    answers: BTreeMap<Uuid, Answer>,
    responses: BTreeMap<Uuid, Response>,
    sections: BTreeMap<Uuid, Section>,
    pools: BTreeMap<Uuid, Pool>,
    child_ages: BTreeMap<Uuid, u32>,
    pool_summaries: Vec<PoolSummary>,
    final_reports: Vec<FinalReport>,
    score_commits: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    locks: KeyedLocks,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Seeding helpers. Each overwrites by id, so fixtures can also mutate.

    pub fn put_question(&self, question: Question) {
        self.inner().questions.insert(question.id, question);
    }

    pub fn put_answer(&self, answer: Answer) {
        self.inner().answers.insert(answer.id, answer);
    }

    pub fn put_response(&self, response: Response) {
        self.inner().responses.insert(response.id, response);
    }

    pub fn put_section(&self, section: Section) {
        self.inner().sections.insert(section.id, section);
    }

    pub fn put_pool(&self, pool: Pool) {
        self.inner().pools.insert(pool.id, pool);
    }

    pub fn set_child_age(&self, child_id: Uuid, age_months: u32) {
        self.inner().child_ages.insert(child_id, age_months);
    }

    pub fn remove_question(&self, question_id: Uuid) {
        self.inner().questions.remove(&question_id);
    }

    /// Number of score batches committed so far.
    pub fn committed_score_batches(&self) -> usize {
        self.inner().score_commits
    }
}

impl AssessmentStore for MemoryStore {
    fn response(&self, id: Uuid) -> BoxFuture<'_, Result<Response, StoreError>> {
        Box::pin(async move {
            self.inner()
                .responses
                .get(&id)
                .cloned()
                .ok_or(StoreError::NotFound {
                    entity: "response",
                    id,
                })
        })
    }

    fn answers_for_response(
        &self,
        response_id: Uuid,
    ) -> BoxFuture<'_, Result<Vec<Answer>, StoreError>> {
        Box::pin(async move {
            Ok(self
                .inner()
                .answers
                .values()
                .filter(|a| a.response_id == response_id)
                .cloned()
                .collect())
        })
    }

    fn questions_for_section(
        &self,
        section_id: Uuid,
    ) -> BoxFuture<'_, Result<Vec<Question>, StoreError>> {
        Box::pin(async move {
            Ok(self
                .inner()
                .questions
                .values()
                .filter(|q| q.section_id == section_id)
                .cloned()
                .collect())
        })
    }

    fn responses_for_sections<'a>(
        &'a self,
        child_id: Uuid,
        section_ids: &'a [Uuid],
    ) -> BoxFuture<'a, Result<Vec<Response>, StoreError>> {
        Box::pin(async move {
            Ok(self
                .inner()
                .responses
                .values()
                .filter(|r| r.child_id == child_id && section_ids.contains(&r.section_id))
                .cloned()
                .collect())
        })
    }

    fn completed_with_null_scores(&self) -> BoxFuture<'_, Result<Vec<Uuid>, StoreError>> {
        Box::pin(async move {
            Ok(self
                .inner()
                .responses
                .values()
                .filter(|r| r.status == ResponseStatus::Completed && r.total_score.is_none())
                .map(|r| r.id)
                .collect())
        })
    }

    fn apply_score_updates<'a>(
        &'a self,
        updates: &'a [ScoreUpdate],
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            if updates.is_empty() {
                return Ok(());
            }
            let mut inner = self.inner();
            // Validate the whole batch before touching anything.
            for update in updates {
                if !inner.responses.contains_key(&update.response_id) {
                    return Err(StoreError::NotFound {
                        entity: "response",
                        id: update.response_id,
                    });
                }
            }
            for update in updates {
                if let Some(response) = inner.responses.get_mut(&update.response_id) {
                    response.total_score = Some(update.total_score);
                    response.max_possible_score = Some(update.max_possible_score);
                }
            }
            inner.score_commits += 1;
            tracing::debug!(updates = updates.len(), "score batch committed");
            Ok(())
        })
    }
}

impl ReportStore for MemoryStore {
    fn lock(&self, scope: LockScope) -> BoxFuture<'_, OwnedMutexGuard<()>> {
        Box::pin(self.locks.acquire(scope))
    }

    fn pool_summary(
        &self,
        child_id: Uuid,
        pool_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<PoolSummary>, StoreError>> {
        Box::pin(async move {
            Ok(self
                .inner()
                .pool_summaries
                .iter()
                .find(|s| s.child_id == child_id && s.pool_id == pool_id)
                .cloned())
        })
    }

    fn insert_pool_summary(
        &self,
        summary: PoolSummary,
    ) -> BoxFuture<'_, Result<PoolSummary, StoreError>> {
        Box::pin(async move {
            let mut inner = self.inner();
            let duplicate = inner
                .pool_summaries
                .iter()
                .any(|s| s.child_id == summary.child_id && s.pool_id == summary.pool_id);
            if duplicate {
                return Err(StoreError::UniqueViolation {
                    constraint: "pool_summaries(child_id, pool_id)",
                });
            }
            inner.pool_summaries.push(summary.clone());
            Ok(summary)
        })
    }

    fn update_pool_summary(
        &self,
        summary: PoolSummary,
    ) -> BoxFuture<'_, Result<PoolSummary, StoreError>> {
        Box::pin(async move {
            let mut inner = self.inner();
            match inner.pool_summaries.iter_mut().find(|s| s.id == summary.id) {
                Some(row) => {
                    *row = summary.clone();
                    Ok(summary)
                }
                None => Err(StoreError::NotFound {
                    entity: "pool_summary",
                    id: summary.id,
                }),
            }
        })
    }

    fn pool_summaries_for_child(
        &self,
        child_id: Uuid,
    ) -> BoxFuture<'_, Result<Vec<PoolSummary>, StoreError>> {
        Box::pin(async move {
            Ok(self
                .inner()
                .pool_summaries
                .iter()
                .filter(|s| s.child_id == child_id)
                .cloned()
                .collect())
        })
    }

    fn final_report(
        &self,
        child_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<FinalReport>, StoreError>> {
        Box::pin(async move {
            Ok(self
                .inner()
                .final_reports
                .iter()
                .find(|r| r.child_id == child_id)
                .cloned())
        })
    }

    fn insert_final_report(
        &self,
        report: FinalReport,
    ) -> BoxFuture<'_, Result<FinalReport, StoreError>> {
        Box::pin(async move {
            let mut inner = self.inner();
            let duplicate = inner
                .final_reports
                .iter()
                .any(|r| r.child_id == report.child_id);
            if duplicate {
                return Err(StoreError::UniqueViolation {
                    constraint: "final_reports(child_id)",
                });
            }
            inner.final_reports.push(report.clone());
            Ok(report)
        })
    }

    fn update_final_report(
        &self,
        report: FinalReport,
    ) -> BoxFuture<'_, Result<FinalReport, StoreError>> {
        Box::pin(async move {
            let mut inner = self.inner();
            match inner.final_reports.iter_mut().find(|r| r.id == report.id) {
                Some(row) => {
                    *row = report.clone();
                    Ok(report)
                }
                None => Err(StoreError::NotFound {
                    entity: "final_report",
                    id: report.id,
                }),
            }
        })
    }
}

impl AssessmentDirectory for MemoryStore {
    fn pool(&self, pool_id: Uuid) -> BoxFuture<'_, Result<Option<Pool>, StoreError>> {
        Box::pin(async move { Ok(self.inner().pools.get(&pool_id).cloned()) })
    }

    fn pools_for_child(&self, _child_id: Uuid) -> BoxFuture<'_, Result<Vec<Pool>, StoreError>> {
        // Every registered pool applies to every child in this backend.
        Box::pin(async move { Ok(self.inner().pools.values().cloned().collect()) })
    }

    fn sections_in_pool(&self, pool_id: Uuid) -> BoxFuture<'_, Result<Vec<Uuid>, StoreError>> {
        Box::pin(async move {
            Ok(self
                .inner()
                .sections
                .values()
                .filter(|s| s.pool_id == Some(pool_id))
                .map(|s| s.id)
                .collect())
        })
    }

    fn age_months_at(
        &self,
        child_id: Uuid,
        _at: jiff::Timestamp,
    ) -> BoxFuture<'_, Result<u32, StoreError>> {
        // Fixture ages are the age at assessment; `at` is for real backends
        // that derive the age from a date of birth.
        Box::pin(async move {
            self.inner()
                .child_ages
                .get(&child_id)
                .copied()
                .ok_or(StoreError::NotFound {
                    entity: "child",
                    id: child_id,
                })
        })
    }
}
