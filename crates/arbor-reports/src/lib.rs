//! arbor-reports
//!
//! The score recalculation and report aggregation pipeline: pool summaries,
//! final reports, the two-stage review workflow, and the batch backfill
//! runner. Aggregate rows are derived artifacts — they may be deleted and
//! regenerated at any time; responses and answers stay the source of truth.

use std::sync::Arc;

use arbor_store::{AssessmentDirectory, AssessmentStore, ReportStore};

pub mod backfill;
pub mod error;
pub mod final_report;
pub mod narrative;
pub mod pool_summary;
pub mod recalc;
pub mod review;

pub use backfill::{BackfillOptions, RunFailure, RunSummary};
pub use error::ReportError;
pub use narrative::{
    FinalNarrativeInput, NarrativeGenerator, PoolNarrativeInput, PoolNarrativeLine,
};
pub use recalc::RecalcOutcome;
pub use review::ReviewStage;

/// The aggregation pipeline and its collaborators.
///
/// Any number of pipelines may run concurrently across different children;
/// writes to the same aggregate scope serialize through the report store's
/// keyed locks.
pub struct ReportPipeline {
    pub(crate) assessments: Arc<dyn AssessmentStore>,
    pub(crate) reports: Arc<dyn ReportStore>,
    pub(crate) directory: Arc<dyn AssessmentDirectory>,
    pub(crate) narrative: Arc<dyn NarrativeGenerator>,
}

impl ReportPipeline {
    pub fn new(
        assessments: Arc<dyn AssessmentStore>,
        reports: Arc<dyn ReportStore>,
        directory: Arc<dyn AssessmentDirectory>,
        narrative: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        Self {
            assessments,
            reports,
            directory,
            narrative,
        }
    }
}
