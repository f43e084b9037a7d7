use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Value type for the externally-owned pool entity that groups sections.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Pool {
    pub id: Uuid,
    pub title: String,
}
