//! Dot-path field access over imported entity data.
//!
//! Paths are dot-separated segments (`product.stock.qty`). A segment selects an
//! object key, or an array element when the current node is an array and the
//! segment parses as an index. A `null` leaf is treated as unresolved.

use serde_json::Value as JsonValue;

use crate::error::{TransferError, TransferResult};

/// Resolves dot paths into a JSON tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldPathResolver;

impl FieldPathResolver {
    pub fn new() -> Self {
        Self
    }

    /// Returns the node at `path`.
    pub fn get_value<'a>(&self, data: &'a JsonValue, path: &str) -> TransferResult<&'a JsonValue> {
        if path.trim().is_empty() {
            return Err(TransferError::path_not_found(path));
        }

        let mut node = data;
        for segment in path.split('.') {
            node = match node {
                JsonValue::Object(map) => map.get(segment),
                JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            }
            .ok_or_else(|| TransferError::path_not_found(path))?;
        }

        if node.is_null() {
            return Err(TransferError::path_not_found(path));
        }
        Ok(node)
    }

    /// Resolves `path` to a string. Numbers are rendered with their JSON text.
    pub fn get_string(&self, data: &JsonValue, path: &str) -> TransferResult<String> {
        match self.get_value(data, path)? {
            JsonValue::String(s) if !s.is_empty() => Ok(s.clone()),
            JsonValue::String(_) => Err(TransferError::invalid_value(path, "empty string")),
            JsonValue::Number(n) => Ok(n.to_string()),
            other => Err(TransferError::invalid_value(
                path,
                format!("expected a string, found {}", kind_of(other)),
            )),
        }
    }

    /// Resolves `path` to a float. Numeric strings are accepted.
    pub fn get_f64(&self, data: &JsonValue, path: &str) -> TransferResult<f64> {
        match self.get_value(data, path)? {
            JsonValue::Number(n) => n
                .as_f64()
                .ok_or_else(|| TransferError::invalid_value(path, "number out of range")),
            JsonValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| TransferError::invalid_value(path, format!("not a number: {s:?}"))),
            other => Err(TransferError::invalid_value(
                path,
                format!("expected a number, found {}", kind_of(other)),
            )),
        }
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
