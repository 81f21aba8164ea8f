//! Inventory side of the stock transfer plugin.
//!
//! Holds the stock item model, the storage/catalog/indexer seams the host
//! platform provides, and the two operations built on top of them: writing a
//! stock item (`StockUpdater`) and reading its current state
//! (`StockItemReader`). No engine logic lives here.

pub mod reader;
pub mod stock;
pub mod store;
pub mod updater;

pub use reader::StockItemReader;
pub use stock::{stock_id_options, Product, StockItem, StockLocation, StockOption, StockStatus};
pub use store::{
    CatalogError, IndexerError, ProductCatalog, StockIndexer, StockItemStore, StockListing,
    StockStoreError,
};
pub use updater::{DefaultStockWriter, StockError, StockUpdater};
