#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use arbor_core::models::answer::Answer;
use arbor_core::models::pool::Pool;
use arbor_core::models::question::Question;
use arbor_core::models::response::{Response, ResponseStatus};
use arbor_core::models::section::Section;
use arbor_reports::{
    FinalNarrativeInput, NarrativeGenerator, PoolNarrativeInput, ReportError, ReportPipeline,
};
use arbor_store::{BoxFuture, MemoryStore};

/// Deterministic narrative stub: echoes enough of the input to assert the
/// blob was stored verbatim.
pub struct CannedNarrative;

impl NarrativeGenerator for CannedNarrative {
    fn pool_narrative(
        &self,
        input: PoolNarrativeInput,
    ) -> BoxFuture<'_, Result<serde_json::Value, ReportError>> {
        Box::pin(async move { Ok(json!({ "kind": "pool", "pool": input.pool_title })) })
    }

    fn final_narrative(
        &self,
        input: FinalNarrativeInput,
    ) -> BoxFuture<'_, Result<serde_json::Value, ReportError>> {
        Box::pin(async move { Ok(json!({ "kind": "final", "pools": input.pools.len() })) })
    }
}

pub fn pipeline() -> (Arc<MemoryStore>, ReportPipeline) {
    let store = Arc::new(MemoryStore::new());
    let pipeline = ReportPipeline::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(CannedNarrative),
    );
    (store, pipeline)
}

pub fn ts(offset_seconds: i64) -> jiff::Timestamp {
    jiff::Timestamp::from_second(1_755_000_000 + offset_seconds).expect("valid timestamp")
}

pub fn seed_pool(store: &MemoryStore, title: &str) -> Uuid {
    let pool_id = Uuid::new_v4();
    store.put_pool(Pool {
        id: pool_id,
        title: title.to_string(),
    });
    pool_id
}

pub fn seed_section(store: &MemoryStore, pool_id: Uuid, title: &str) -> Uuid {
    let section_id = Uuid::new_v4();
    store.put_section(Section {
        id: section_id,
        title: title.to_string(),
        pool_id: Some(pool_id),
    });
    section_id
}

pub fn seed_question(store: &MemoryStore, section_id: Uuid, logic: serde_json::Value) -> Uuid {
    let question_id = Uuid::new_v4();
    store.put_question(Question {
        id: question_id,
        section_id,
        text: "Does the child respond to their name?".to_string(),
        is_scorable: true,
        scoring_logic: Some(logic),
        order_number: 0,
    });
    question_id
}

/// A completed response with persisted scores, ready to aggregate.
pub fn seed_scored_response(
    store: &MemoryStore,
    child_id: Uuid,
    section_id: Uuid,
    total: i64,
    max: i64,
) -> Uuid {
    let response_id = Uuid::new_v4();
    store.put_response(Response {
        id: response_id,
        child_id,
        section_id,
        status: ResponseStatus::Completed,
        total_score: Some(total),
        max_possible_score: Some(max),
        completed_at: Some(ts(0)),
    });
    response_id
}

/// A completed response with NULL scores — the backfill's candidate shape.
pub fn seed_unscored_response(store: &MemoryStore, child_id: Uuid, section_id: Uuid) -> Uuid {
    let response_id = Uuid::new_v4();
    store.put_response(Response {
        id: response_id,
        child_id,
        section_id,
        status: ResponseStatus::Completed,
        total_score: None,
        max_possible_score: None,
        completed_at: Some(ts(0)),
    });
    response_id
}

pub fn seed_in_progress_response(store: &MemoryStore, child_id: Uuid, section_id: Uuid) -> Uuid {
    let response_id = Uuid::new_v4();
    store.put_response(Response {
        id: response_id,
        child_id,
        section_id,
        status: ResponseStatus::InProgress,
        total_score: None,
        max_possible_score: None,
        completed_at: None,
    });
    response_id
}

pub fn seed_answer(store: &MemoryStore, response_id: Uuid, question_id: Uuid, bucket: &str) {
    store.put_answer(Answer {
        id: Uuid::new_v4(),
        response_id,
        question_id,
        raw_answer: bucket.to_string(),
        answer_bucket: Some(bucket.to_string()),
        score: None,
        answered_at: ts(0),
    });
}
