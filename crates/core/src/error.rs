//! Record-scoped transfer error model.

use thiserror::Error;

/// Result type used for the processing of a single imported record.
pub type TransferResult<T> = Result<T, TransferError>;

/// Failure while transferring one record (entity or product).
///
/// Always recoverable at the per-record boundary: the batch engines turn it
/// into a logged annotation and move on, unless they are configured to stop
/// at the first error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// A dot path did not resolve inside the entity data.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// A path resolved, but to a value of the wrong shape.
    #[error("invalid value at {path}: {reason}")]
    InvalidValue { path: String, reason: String },

    /// A referenced catalog entity (product, stock item) does not exist.
    #[error("{0}")]
    EntityNotFound(String),

    /// The downstream stock write refused the update.
    #[error("stock update rejected: {0}")]
    Rejected(String),

    /// The row reindex after a successful write failed.
    #[error("reindex failed: {0}")]
    Reindex(String),
}

impl TransferError {
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound(path.into())
    }

    pub fn invalid_value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn entity_not_found(msg: impl Into<String>) -> Self {
        Self::EntityNotFound(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn reindex(msg: impl Into<String>) -> Self {
        Self::Reindex(msg.into())
    }
}
