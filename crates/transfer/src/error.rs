//! Errors that escape a transferor run.

use stocksync_activity::{ActivityStoreError, EntityStoreError};
use stocksync_core::ActivityId;
use stocksync_inventory::CatalogError;

use crate::config::ConfigError;

/// A record failed while the run was configured to stop at the first error.
///
/// Returned only after the partial summary has been saved on the activity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "activity {activity_id}: transferor {transferor} stopped at {identifier} \
     (continue_in_case_of_errors = false): {cause}"
)]
pub struct FatalBatchAbort {
    pub activity_id: ActivityId,
    pub transferor: String,
    /// Entity identifier (quantity transfer) or sku (zero-fill) of the failing record.
    pub identifier: String,
    pub cause: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferorError {
    #[error(transparent)]
    Aborted(#[from] FatalBatchAbort),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("activity store: {0}")]
    Activity(#[from] ActivityStoreError),

    #[error("entity store: {0}")]
    Entities(#[from] EntityStoreError),

    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),
}

impl TransferorError {
    pub fn is_abort(&self) -> bool {
        matches!(self, TransferorError::Aborted(_))
    }

    pub fn as_abort(&self) -> Option<&FatalBatchAbort> {
        match self {
            TransferorError::Aborted(abort) => Some(abort),
            _ => None,
        }
    }
}
