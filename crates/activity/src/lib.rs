//! Import runs ("activities"), their imported entities, and the summary
//! persisted onto an activity once a transfer has run.

pub mod activity;
pub mod repository;
pub mod summary;

pub use activity::{Activity, ImportedEntity, JsonMap};
pub use repository::{
    ActivityRepository, ActivityStoreError, EntityAnnotator, EntityRepository, EntityStoreError,
};
pub use summary::{ActivitySummaryWriter, BatchSummary};
