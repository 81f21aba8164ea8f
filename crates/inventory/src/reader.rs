use std::sync::Arc;

use stocksync_core::StockId;

use crate::stock::StockItem;
use crate::store::{ProductCatalog, StockItemStore};
use crate::updater::StockError;

/// Reads the current stock item of a sku, used to capture the "before" state.
#[derive(Clone)]
pub struct StockItemReader {
    catalog: Arc<dyn ProductCatalog>,
    store: Arc<dyn StockItemStore>,
}

impl StockItemReader {
    pub fn new(catalog: Arc<dyn ProductCatalog>, store: Arc<dyn StockItemStore>) -> Self {
        Self { catalog, store }
    }

    /// `Ok(None)` means the product exists but has no stock item in `stock_id` yet.
    pub fn stock_item_by_sku(&self, sku: &str, stock_id: StockId) -> Result<Option<StockItem>, StockError> {
        let product = self.catalog.find_by_sku(sku)?;
        Ok(self.store.load(product.id, stock_id)?)
    }
}
