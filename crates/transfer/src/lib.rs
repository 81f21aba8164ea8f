//! Stock transferors.
//!
//! - [`DefaultStockTransferor`]: writes the imported quantity of every entity.
//! - [`QtyToZeroTransferor`]: zeroes eligible products absent from the import.
//!
//! Both share the same collaborators ([`TransferContext`]), read their
//! settings once per run, isolate failures per record, and persist a running
//! summary onto the activity.

pub mod config;
pub mod default_stock;
pub mod error;
pub mod qty_to_zero;
pub mod transferor;

pub use config::{ConfigError, EnvStockConfig, FieldMapping, StockConfigProvider, StockTransferSettings};
pub use default_stock::DefaultStockTransferor;
pub use error::{FatalBatchAbort, TransferorError};
pub use qty_to_zero::{QtyToZeroTransferor, TARGETED_REQUEST_KEY};
pub use transferor::{TransferContext, Transferor, TransferorChain};
