//! `stocksync-core`: shared building blocks for the stock transfer plugin.
//!
//! This crate contains **pure** primitives (no storage, no logging setup):
//! typed identifiers, the record-scoped transfer error, and the dot-path
//! accessor used to read fields out of imported entity data.

pub mod error;
pub mod id;
pub mod path;

pub use error::{TransferError, TransferResult};
pub use id::{ActivityId, ProductId, StockId};
pub use path::FieldPathResolver;
