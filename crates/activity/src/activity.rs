use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stocksync_core::ActivityId;

/// String-keyed attribute map (activity extras, entity annotations).
pub type JsonMap = serde_json::Map<String, JsonValue>;

/// One import run.
///
/// Engines only read an activity and merge keys into its `extra` map; creating
/// and deleting activities belongs to the scheduler that owns the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    id: ActivityId,
    #[serde(default)]
    extra: JsonMap,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl Activity {
    pub fn new(id: ActivityId) -> Self {
        Self {
            id,
            extra: JsonMap::new(),
            updated_at: None,
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> ActivityId {
        self.id
    }

    pub fn extra(&self) -> &JsonMap {
        &self.extra
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Merge `values` into `extra`. Keys not present in `values` are kept.
    pub fn merge_extra(&mut self, values: JsonMap) {
        for (key, value) in values {
            self.extra.insert(key, value);
        }
    }

    /// True when `extra` has `key`, whatever its value (null and empty values included).
    pub fn has_extra_data(&self, key: &str) -> bool {
        self.extra.contains_key(key)
    }

    /// Stamp the save time (repository use).
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

/// All imported rows of one identifier within an activity, grouped into a
/// single field mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedEntity {
    pub identifier: String,
    pub data: JsonValue,
}

impl ImportedEntity {
    pub fn new(identifier: impl Into<String>, data: JsonValue) -> Self {
        Self {
            identifier: identifier.into(),
            data,
        }
    }
}
