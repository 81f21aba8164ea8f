//! Stock writes: quantity updates and status-only updates.

use std::sync::Arc;

use tracing::debug;

use stocksync_core::{ProductId, StockId, TransferError};

use crate::stock::{StockItem, StockStatus};
use crate::store::{CatalogError, IndexerError, ProductCatalog, StockIndexer, StockItemStore, StockStoreError};

/// Failure of a stock write.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StockError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("invalid quantity {qty} for sku {sku}")]
    InvalidQuantity { sku: String, qty: f64 },

    #[error(transparent)]
    Store(#[from] StockStoreError),

    #[error("reindex of product {product_id} failed: {source}")]
    Reindex {
        product_id: ProductId,
        #[source]
        source: IndexerError,
    },
}

impl From<StockError> for TransferError {
    fn from(err: StockError) -> Self {
        let msg = err.to_string();
        match err {
            StockError::Catalog(CatalogError::EntityNotFound(_)) => TransferError::entity_not_found(msg),
            StockError::InvalidQuantity { sku, .. } => TransferError::invalid_value(sku, msg),
            StockError::Catalog(CatalogError::Storage(_)) | StockError::Store(_) => TransferError::rejected(msg),
            StockError::Reindex { .. } => TransferError::reindex(msg),
        }
    }
}

/// Product-level stock item writer.
///
/// A missing `(product, stock)` item is created on first write.
#[derive(Clone)]
pub struct DefaultStockWriter {
    store: Arc<dyn StockItemStore>,
}

impl DefaultStockWriter {
    pub fn new(store: Arc<dyn StockItemStore>) -> Self {
        Self { store }
    }

    /// Set the quantity; the in-stock flag becomes `qty > 0`.
    pub fn apply_quantity(&self, product_id: ProductId, qty: f64, stock_id: StockId) -> Result<StockItem, StockStoreError> {
        let mut item = self.load_or_init(product_id, stock_id)?;
        item.set_qty(qty);
        self.store.save(&item)?;
        Ok(item)
    }

    /// Set the in-stock flag only.
    pub fn apply_status_only(
        &self,
        product_id: ProductId,
        stock_id: StockId,
        status: StockStatus,
    ) -> Result<StockItem, StockStoreError> {
        let mut item = self.load_or_init(product_id, stock_id)?;
        item.set_status(status);
        self.store.save(&item)?;
        Ok(item)
    }

    fn load_or_init(&self, product_id: ProductId, stock_id: StockId) -> Result<StockItem, StockStoreError> {
        Ok(self
            .store
            .load(product_id, stock_id)?
            .unwrap_or_else(|| StockItem::new_for(product_id, stock_id)))
    }
}

/// Sku-level stock updates with optional row reindex.
#[derive(Clone)]
pub struct StockUpdater {
    catalog: Arc<dyn ProductCatalog>,
    writer: DefaultStockWriter,
    indexer: Arc<dyn StockIndexer>,
}

impl StockUpdater {
    pub fn new(catalog: Arc<dyn ProductCatalog>, writer: DefaultStockWriter, indexer: Arc<dyn StockIndexer>) -> Self {
        Self {
            catalog,
            writer,
            indexer,
        }
    }

    /// Write `qty` for `sku` into `stock_id`, then reindex the row when asked to.
    pub fn apply_quantity(&self, sku: &str, qty: f64, stock_id: StockId, reindex: bool) -> Result<StockItem, StockError> {
        if !qty.is_finite() || qty < 0.0 {
            return Err(StockError::InvalidQuantity {
                sku: sku.to_string(),
                qty,
            });
        }

        let product_id = self.catalog.find_by_sku(sku)?.id;
        let item = self.writer.apply_quantity(product_id, qty, stock_id)?;
        if reindex {
            self.reindex(product_id)?;
        }
        Ok(item)
    }

    /// Flip the availability flag of `sku` in `stock_id` without touching its quantity.
    pub fn apply_status_only(
        &self,
        sku: &str,
        stock_id: StockId,
        status: StockStatus,
        reindex: bool,
    ) -> Result<StockItem, StockError> {
        let product_id = self.catalog.find_by_sku(sku)?.id;
        let item = self.writer.apply_status_only(product_id, stock_id, status)?;
        if reindex {
            self.reindex(product_id)?;
        }
        Ok(item)
    }

    fn reindex(&self, product_id: ProductId) -> Result<(), StockError> {
        debug!(product_id = %product_id, "reindexing stock row");
        self.indexer
            .reindex_row(product_id)
            .map_err(|source| StockError::Reindex { product_id, source })
    }
}
