//! Storage seams for activities and their imported entities.

use std::sync::Arc;

use stocksync_core::ActivityId;

use crate::activity::{Activity, ImportedEntity, JsonMap};

/// Activity persistence.
pub trait ActivityRepository: Send + Sync {
    fn get_by_id(&self, activity_id: ActivityId) -> Result<Activity, ActivityStoreError>;

    /// Persist the whole activity (last write wins).
    fn save(&self, activity: &Activity) -> Result<(), ActivityStoreError>;
}

/// Read access to the rows imported for an activity.
pub trait EntityRepository: Send + Sync {
    /// Rows grouped by entity identifier, in first-seen order.
    fn all_data_grouped_by_identifier(&self, activity_id: ActivityId) -> Result<Vec<ImportedEntity>, EntityStoreError>;
}

/// Side-channel annotation of imported entities.
pub trait EntityAnnotator: Send + Sync {
    /// Merge `extra` into the annotation of every row with `identifier`.
    fn add_extra_data(&self, activity_id: ActivityId, identifier: &str, extra: JsonMap) -> Result<(), EntityStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivityStoreError {
    #[error("activity not found: {0}")]
    NotFound(ActivityId),
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityStoreError {
    #[error("no entity {identifier} in activity {activity_id}")]
    NotFound { activity_id: ActivityId, identifier: String },
    #[error("storage error: {0}")]
    Storage(String),
}

impl<S> ActivityRepository for Arc<S>
where
    S: ActivityRepository + ?Sized,
{
    fn get_by_id(&self, activity_id: ActivityId) -> Result<Activity, ActivityStoreError> {
        (**self).get_by_id(activity_id)
    }

    fn save(&self, activity: &Activity) -> Result<(), ActivityStoreError> {
        (**self).save(activity)
    }
}

impl<S> EntityRepository for Arc<S>
where
    S: EntityRepository + ?Sized,
{
    fn all_data_grouped_by_identifier(&self, activity_id: ActivityId) -> Result<Vec<ImportedEntity>, EntityStoreError> {
        (**self).all_data_grouped_by_identifier(activity_id)
    }
}

impl<S> EntityAnnotator for Arc<S>
where
    S: EntityAnnotator + ?Sized,
{
    fn add_extra_data(&self, activity_id: ActivityId, identifier: &str, extra: JsonMap) -> Result<(), EntityStoreError> {
        (**self).add_extra_data(activity_id, identifier, extra)
    }
}
