use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arbor_store::BoxFuture;

use crate::error::ReportError;

/// Score lines handed to the narrative generator for one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolNarrativeInput {
    pub child_id: Uuid,
    pub pool_id: Uuid,
    pub pool_title: String,
    pub total_sections: u32,
    pub completed_sections: u32,
    pub total_score: Option<i64>,
    pub max_possible_score: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalNarrativeInput {
    pub child_id: Uuid,
    pub pools: Vec<PoolNarrativeLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolNarrativeLine {
    pub pool_title: String,
    pub total_score: Option<i64>,
    pub max_possible_score: Option<i64>,
}

/// Producer of the opaque summary blobs embedded in aggregate rows.
///
/// The content is externally owned; the pipeline stores whatever the
/// generator returns and never inspects it.
pub trait NarrativeGenerator: Send + Sync {
    fn pool_narrative(
        &self,
        input: PoolNarrativeInput,
    ) -> BoxFuture<'_, Result<serde_json::Value, ReportError>>;

    fn final_narrative(
        &self,
        input: FinalNarrativeInput,
    ) -> BoxFuture<'_, Result<serde_json::Value, ReportError>>;
}
