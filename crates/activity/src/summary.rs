//! Batch summaries persisted onto the activity.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use stocksync_core::ActivityId;

use crate::activity::JsonMap;
use crate::repository::{ActivityRepository, ActivityStoreError};

/// Running outcome of a transfer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSummary {
    /// Per-entity quantity transfer: successes and failures.
    Transfer { ok: u64, ko: u64 },
    /// Zero-fill run: skus zeroed and skus that could not be zeroed, in processing order.
    ZeroFill {
        updated: Vec<String>,
        not_updated: Vec<String>,
    },
}

impl BatchSummary {
    pub const OK: &'static str = "ok";
    pub const KO: &'static str = "ko";
    pub const QTY_TO_ZERO: &'static str = "qty_to_zero";
    pub const QTY_NOT_TO_ZERO: &'static str = "qty_not_to_zero";

    /// The keys merged into `Activity::extra`.
    pub fn to_extra(&self) -> JsonMap {
        let mut extra = JsonMap::new();
        match self {
            BatchSummary::Transfer { ok, ko } => {
                extra.insert(Self::OK.to_string(), json!(ok));
                extra.insert(Self::KO.to_string(), json!(ko));
            }
            BatchSummary::ZeroFill { updated, not_updated } => {
                extra.insert(Self::QTY_TO_ZERO.to_string(), json!(updated.join(",")));
                extra.insert(Self::QTY_NOT_TO_ZERO.to_string(), json!(not_updated.join(",")));
            }
        }
        extra
    }
}

/// Read-merge-write of a summary onto its activity.
#[derive(Clone)]
pub struct ActivitySummaryWriter {
    activities: Arc<dyn ActivityRepository>,
}

impl ActivitySummaryWriter {
    pub fn new(activities: Arc<dyn ActivityRepository>) -> Self {
        Self { activities }
    }

    pub fn write(&self, activity_id: ActivityId, summary: &BatchSummary) -> Result<(), ActivityStoreError> {
        let mut activity = self.activities.get_by_id(activity_id)?;
        activity.merge_extra(summary.to_extra());
        self.activities.save(&activity)?;

        debug!(activity_id = %activity_id, ?summary, "activity summary saved");
        Ok(())
    }
}
