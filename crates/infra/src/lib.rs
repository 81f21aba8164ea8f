//! In-memory implementations of the host platform collaborators.
//!
//! Everything here stands in for storage the platform owns (activities,
//! imported entities, catalog, stock items, indexer). Used by tests, benches
//! and local runs of the transferors.

pub mod activity_store;
pub mod catalog;
pub mod entity_store;
pub mod indexer;
pub mod platform;
pub mod stock_store;

mod integration_tests;

pub use activity_store::InMemoryActivityRepository;
pub use catalog::InMemoryProductCatalog;
pub use entity_store::{EntityRow, InMemoryEntityStore};
pub use indexer::RecordingIndexer;
pub use platform::{InMemoryPlatform, DEFAULT_STOCK_TRANSFEROR, QTY_TO_ZERO_TRANSFEROR};
pub use stock_store::{InMemoryStockItemStore, InMemoryStockListing};
