//! Host platform seams used by the stock transfer.

use std::collections::BTreeSet;
use std::sync::Arc;

use stocksync_core::{ProductId, StockId};

use crate::stock::{Product, StockItem, StockLocation};

/// Stock item persistence (one row per product and stock location).
pub trait StockItemStore: Send + Sync {
    /// Load the item for `(product_id, stock_id)`, if one was ever saved.
    fn load(&self, product_id: ProductId, stock_id: StockId) -> Result<Option<StockItem>, StockStoreError>;

    /// Insert or replace the item.
    fn save(&self, item: &StockItem) -> Result<(), StockStoreError>;
}

/// Row-level stock reindex.
pub trait StockIndexer: Send + Sync {
    fn reindex_row(&self, product_id: ProductId) -> Result<(), IndexerError>;
}

/// Read access to the product catalog.
pub trait ProductCatalog: Send + Sync {
    /// Resolve a sku to its product.
    fn find_by_sku(&self, sku: &str) -> Result<Product, CatalogError>;

    /// All products flagged for automatic zeroing whose sku is not in `excluded_skus`,
    /// in catalog order.
    fn auto_zero_eligible_excluding(&self, excluded_skus: &BTreeSet<String>) -> Result<Vec<Product>, CatalogError>;
}

/// Lists the stock locations configured on the platform.
pub trait StockListing: Send + Sync {
    fn list_stocks(&self) -> Result<Vec<StockLocation>, StockStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StockStoreError {
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Product with sku {0} does not exist")]
    EntityNotFound(String),
    #[error("catalog error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct IndexerError(pub String);

impl<S> StockItemStore for Arc<S>
where
    S: StockItemStore + ?Sized,
{
    fn load(&self, product_id: ProductId, stock_id: StockId) -> Result<Option<StockItem>, StockStoreError> {
        (**self).load(product_id, stock_id)
    }

    fn save(&self, item: &StockItem) -> Result<(), StockStoreError> {
        (**self).save(item)
    }
}

impl<S> StockIndexer for Arc<S>
where
    S: StockIndexer + ?Sized,
{
    fn reindex_row(&self, product_id: ProductId) -> Result<(), IndexerError> {
        (**self).reindex_row(product_id)
    }
}

impl<S> ProductCatalog for Arc<S>
where
    S: ProductCatalog + ?Sized,
{
    fn find_by_sku(&self, sku: &str) -> Result<Product, CatalogError> {
        (**self).find_by_sku(sku)
    }

    fn auto_zero_eligible_excluding(&self, excluded_skus: &BTreeSet<String>) -> Result<Vec<Product>, CatalogError> {
        (**self).auto_zero_eligible_excluding(excluded_skus)
    }
}

impl<S> StockListing for Arc<S>
where
    S: StockListing + ?Sized,
{
    fn list_stocks(&self) -> Result<Vec<StockLocation>, StockStoreError> {
        (**self).list_stocks()
    }
}
