use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use stocksync_activity::{EntityAnnotator, EntityRepository, EntityStoreError, ImportedEntity, JsonMap};
use stocksync_core::ActivityId;

/// One imported row.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRow {
    pub activity_id: ActivityId,
    pub identifier: String,
    /// Kind of row (e.g. `stock`, `product`); rows of one identifier are grouped under it.
    pub entity_code: String,
    pub data: JsonValue,
    pub extra: JsonMap,
}

/// In-memory imported-entity store for tests/dev.
///
/// Rows keep insertion order; grouping preserves the order in which each
/// identifier was first seen.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    rows: RwLock<Vec<EntityRow>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_row(
        &self,
        activity_id: ActivityId,
        identifier: impl Into<String>,
        entity_code: impl Into<String>,
        data: JsonValue,
    ) -> Result<(), EntityStoreError> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        rows.push(EntityRow {
            activity_id,
            identifier: identifier.into(),
            entity_code: entity_code.into(),
            data,
            extra: JsonMap::new(),
        });
        Ok(())
    }

    /// Annotation of the first row with `identifier`.
    pub fn extra_for(&self, activity_id: ActivityId, identifier: &str) -> Option<JsonMap> {
        let rows = self.rows.read().ok()?;
        rows.iter()
            .find(|r| r.activity_id == activity_id && r.identifier == identifier)
            .map(|r| r.extra.clone())
    }
}

impl EntityRepository for InMemoryEntityStore {
    fn all_data_grouped_by_identifier(&self, activity_id: ActivityId) -> Result<Vec<ImportedEntity>, EntityStoreError> {
        let rows = self.rows.read().map_err(poisoned)?;

        let mut grouped: Vec<ImportedEntity> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for row in rows.iter().filter(|r| r.activity_id == activity_id) {
            let position = *positions.entry(row.identifier.as_str()).or_insert_with(|| {
                grouped.push(ImportedEntity::new(row.identifier.clone(), JsonValue::Object(JsonMap::new())));
                grouped.len() - 1
            });
            if let JsonValue::Object(map) = &mut grouped[position].data {
                map.insert(row.entity_code.clone(), row.data.clone());
            }
        }
        Ok(grouped)
    }
}

impl EntityAnnotator for InMemoryEntityStore {
    fn add_extra_data(&self, activity_id: ActivityId, identifier: &str, extra: JsonMap) -> Result<(), EntityStoreError> {
        let mut rows = self.rows.write().map_err(poisoned)?;

        let mut matched = false;
        for row in rows
            .iter_mut()
            .filter(|r| r.activity_id == activity_id && r.identifier == identifier)
        {
            for (key, value) in &extra {
                row.extra.insert(key.clone(), value.clone());
            }
            matched = true;
        }

        if !matched {
            return Err(EntityStoreError::NotFound {
                activity_id,
                identifier: identifier.to_string(),
            });
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> EntityStoreError {
    EntityStoreError::Storage("entity store lock poisoned".to_string())
}
