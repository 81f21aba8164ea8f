use std::collections::HashSet;
use std::sync::{Mutex, RwLock};

use stocksync_core::ProductId;
use stocksync_inventory::{IndexerError, StockIndexer};

/// Stock indexer that records reindexed rows, for tests/dev.
///
/// Rows can be set up to fail, or to panic to simulate a collaborator bug.
#[derive(Debug, Default)]
pub struct RecordingIndexer {
    calls: Mutex<Vec<ProductId>>,
    failing: RwLock<HashSet<ProductId>>,
    panicking: RwLock<HashSet<ProductId>>,
}

impl RecordingIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, product_id: ProductId) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(product_id);
        }
    }

    pub fn panic_for(&self, product_id: ProductId) {
        if let Ok(mut panicking) = self.panicking.write() {
            panicking.insert(product_id);
        }
    }

    pub fn reindexed(&self) -> Vec<ProductId> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl StockIndexer for RecordingIndexer {
    fn reindex_row(&self, product_id: ProductId) -> Result<(), IndexerError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(product_id);
        }

        let panics = self.panicking.read().map(|p| p.contains(&product_id)).unwrap_or(false);
        if panics {
            panic!("stock index for product {product_id} is corrupted");
        }

        let fails = self.failing.read().map(|f| f.contains(&product_id)).unwrap_or(false);
        if fails {
            return Err(IndexerError(format!("row {product_id} could not be reindexed")));
        }
        Ok(())
    }
}
