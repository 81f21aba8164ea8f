use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;

use stocksync_core::{ProductId, StockId};
use stocksync_inventory::{StockItem, StockItemStore, StockListing, StockLocation, StockStoreError};

/// In-memory stock item table for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStockItemStore {
    items: RwLock<HashMap<(ProductId, StockId), StockItem>>,
    rejected: RwLock<HashSet<ProductId>>,
}

impl InMemoryStockItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an item without going through the writer.
    pub fn put(&self, product_id: ProductId, stock_id: StockId, qty: f64) -> Result<(), StockStoreError> {
        let mut item = StockItem::new_for(product_id, stock_id);
        item.set_qty(qty);
        self.save(&item)
    }

    pub fn get(&self, product_id: ProductId, stock_id: StockId) -> Option<StockItem> {
        self.items.read().ok()?.get(&(product_id, stock_id)).cloned()
    }

    /// Make every later save of `product_id` fail.
    pub fn reject_saves_for(&self, product_id: ProductId) {
        if let Ok(mut rejected) = self.rejected.write() {
            rejected.insert(product_id);
        }
    }
}

impl StockItemStore for InMemoryStockItemStore {
    fn load(&self, product_id: ProductId, stock_id: StockId) -> Result<Option<StockItem>, StockStoreError> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.get(&(product_id, stock_id)).cloned())
    }

    fn save(&self, item: &StockItem) -> Result<(), StockStoreError> {
        let rejected = self.rejected.read().map_err(poisoned)?;
        if rejected.contains(&item.product_id) {
            return Err(StockStoreError::Storage(format!(
                "save of stock item for product {} refused",
                item.product_id
            )));
        }

        let mut stored = item.clone();
        stored.updated_at = Some(Utc::now());
        let mut items = self.items.write().map_err(poisoned)?;
        items.insert((stored.product_id, stored.stock_id), stored);
        Ok(())
    }
}

/// Fixed list of stock locations.
#[derive(Debug, Clone)]
pub struct InMemoryStockListing {
    stocks: Vec<StockLocation>,
}

impl InMemoryStockListing {
    pub fn new(stocks: Vec<StockLocation>) -> Self {
        Self { stocks }
    }

    /// Just the platform's default stock.
    pub fn default_only() -> Self {
        Self::new(vec![StockLocation {
            stock_id: StockId::DEFAULT,
            name: "Default Stock".to_string(),
            website_id: 0,
        }])
    }
}

impl StockListing for InMemoryStockListing {
    fn list_stocks(&self) -> Result<Vec<StockLocation>, StockStoreError> {
        Ok(self.stocks.clone())
    }
}

fn poisoned<T>(_: T) -> StockStoreError {
    StockStoreError::Storage("stock store lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocksync_inventory::stock_id_options;

    #[test]
    fn save_stamps_and_rejects() {
        let store = InMemoryStockItemStore::new();
        store.put(ProductId::new(1), StockId::DEFAULT, 2.0).unwrap();
        assert!(store.get(ProductId::new(1), StockId::DEFAULT).unwrap().updated_at.is_some());

        store.reject_saves_for(ProductId::new(1));
        assert!(store.put(ProductId::new(1), StockId::DEFAULT, 3.0).is_err());
        assert_eq!(store.get(ProductId::new(1), StockId::DEFAULT).unwrap().qty, 2.0);
    }

    #[test]
    fn listing_feeds_options() {
        let listing = InMemoryStockListing::default_only();
        let options = stock_id_options(&listing.list_stocks().unwrap());
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "Default Stock");
    }
}
