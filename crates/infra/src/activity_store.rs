use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use stocksync_activity::{Activity, ActivityRepository, ActivityStoreError};
use stocksync_core::ActivityId;

/// In-memory activity repository for tests/dev.
///
/// `save` replaces the whole activity and stamps `updated_at`.
#[derive(Debug, Default)]
pub struct InMemoryActivityRepository {
    activities: RwLock<HashMap<ActivityId, Activity>>,
    saves: RwLock<Vec<Activity>>,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an activity as the scheduler would before a run.
    pub fn insert(&self, activity: Activity) -> Result<(), ActivityStoreError> {
        let mut map = self.activities.write().map_err(poisoned)?;
        map.insert(activity.id(), activity);
        Ok(())
    }

    /// Every saved version, oldest first.
    pub fn save_history(&self, activity_id: ActivityId) -> Vec<Activity> {
        match self.saves.read() {
            Ok(saves) => saves.iter().filter(|a| a.id() == activity_id).cloned().collect(),
            Err(_) => vec![],
        }
    }
}

impl ActivityRepository for InMemoryActivityRepository {
    fn get_by_id(&self, activity_id: ActivityId) -> Result<Activity, ActivityStoreError> {
        let map = self.activities.read().map_err(poisoned)?;
        map.get(&activity_id)
            .cloned()
            .ok_or(ActivityStoreError::NotFound(activity_id))
    }

    fn save(&self, activity: &Activity) -> Result<(), ActivityStoreError> {
        let mut stored = activity.clone();
        stored.touch(Utc::now());

        let mut map = self.activities.write().map_err(poisoned)?;
        if !map.contains_key(&stored.id()) {
            return Err(ActivityStoreError::NotFound(stored.id()));
        }
        map.insert(stored.id(), stored.clone());
        self.saves.write().map_err(poisoned)?.push(stored);
        Ok(())
    }
}

fn poisoned<T>(_: T) -> ActivityStoreError {
    ActivityStoreError::Storage("activity store lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn save_requires_existing_activity() {
        let repo = InMemoryActivityRepository::new();
        let err = repo.save(&Activity::new(ActivityId::new(1))).unwrap_err();
        assert_eq!(err, ActivityStoreError::NotFound(ActivityId::new(1)));
    }

    #[test]
    fn save_is_last_write_wins_and_stamped() {
        let repo = InMemoryActivityRepository::new();
        let id = ActivityId::new(2);
        repo.insert(Activity::new(id)).unwrap();

        repo.save(&Activity::new(id).with_extra("ok", json!(1))).unwrap();
        repo.save(&Activity::new(id).with_extra("ko", json!(1))).unwrap();

        let stored = repo.get_by_id(id).unwrap();
        assert!(stored.extra().get("ok").is_none());
        assert!(stored.updated_at().is_some());
        assert_eq!(repo.save_history(id).len(), 2);
    }
}
