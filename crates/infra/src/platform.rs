//! In-memory host platform: every collaborator the transferors need, wired
//! into a `TransferContext`.

use std::sync::Arc;

use stocksync_transfer::{
    DefaultStockTransferor, FieldMapping, QtyToZeroTransferor, StockConfigProvider, TransferContext,
    TransferorChain,
};

use crate::activity_store::InMemoryActivityRepository;
use crate::catalog::InMemoryProductCatalog;
use crate::entity_store::InMemoryEntityStore;
use crate::indexer::RecordingIndexer;
use crate::stock_store::InMemoryStockItemStore;

/// Label of the quantity transferor in [`InMemoryPlatform::default_chain`].
pub const DEFAULT_STOCK_TRANSFEROR: &str = "default_stock";
/// Label of the zero-fill transferor in [`InMemoryPlatform::default_chain`].
pub const QTY_TO_ZERO_TRANSFEROR: &str = "qty_to_zero_for_unsent_product";

#[derive(Debug, Clone, Default)]
pub struct InMemoryPlatform {
    pub activities: Arc<InMemoryActivityRepository>,
    pub entities: Arc<InMemoryEntityStore>,
    pub catalog: Arc<InMemoryProductCatalog>,
    pub stock_items: Arc<InMemoryStockItemStore>,
    pub indexer: Arc<RecordingIndexer>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self, config: Arc<dyn StockConfigProvider>) -> TransferContext {
        TransferContext::new(
            self.activities.clone(),
            self.entities.clone(),
            self.entities.clone(),
            self.catalog.clone(),
            self.stock_items.clone(),
            self.indexer.clone(),
            config,
        )
    }

    /// Quantity transfer followed by zero-fill, both reading `fields`.
    pub fn default_chain(&self, config: Arc<dyn StockConfigProvider>, fields: FieldMapping) -> TransferorChain {
        let ctx = self.context(config);
        TransferorChain::new()
            .with(
                DEFAULT_STOCK_TRANSFEROR,
                Arc::new(DefaultStockTransferor::new(ctx.clone(), fields.clone())),
            )
            .with(
                QTY_TO_ZERO_TRANSFEROR,
                Arc::new(QtyToZeroTransferor::new(ctx, fields.sku)),
            )
    }
}
