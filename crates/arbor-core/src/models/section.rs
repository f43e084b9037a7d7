use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// An assessment module (e.g. Social Interaction).
///
/// `pool_id` is a soft reference to an externally-owned pool — no
/// referential integrity at the storage layer, and a value that no longer
/// resolves is a reportable gap, not a crash.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    pub pool_id: Option<Uuid>,
}
