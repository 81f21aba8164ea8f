//! The transferor seam and the collaborators every transferor runs against.

use std::sync::Arc;

use tracing::{error, info};

use stocksync_activity::{ActivityRepository, ActivitySummaryWriter, EntityAnnotator, EntityRepository};
use stocksync_core::ActivityId;
use stocksync_inventory::{
    DefaultStockWriter, ProductCatalog, StockIndexer, StockItemReader, StockItemStore, StockUpdater,
};

use crate::config::StockConfigProvider;
use crate::error::TransferorError;

/// Writes the data of one activity into the platform.
pub trait Transferor: Send + Sync {
    /// `transferor_type` is the label the run is registered under; it only
    /// appears in logs and errors.
    fn execute(&self, activity_id: ActivityId, transferor_type: &str) -> Result<(), TransferorError>;
}

impl<T> Transferor for Arc<T>
where
    T: Transferor + ?Sized,
{
    fn execute(&self, activity_id: ActivityId, transferor_type: &str) -> Result<(), TransferorError> {
        (**self).execute(activity_id, transferor_type)
    }
}

/// Host collaborators shared by the stock transferors.
#[derive(Clone)]
pub struct TransferContext {
    pub(crate) activities: Arc<dyn ActivityRepository>,
    pub(crate) entities: Arc<dyn EntityRepository>,
    pub(crate) annotator: Arc<dyn EntityAnnotator>,
    pub(crate) catalog: Arc<dyn ProductCatalog>,
    pub(crate) config: Arc<dyn StockConfigProvider>,
    pub(crate) summary: ActivitySummaryWriter,
    pub(crate) updater: StockUpdater,
    pub(crate) reader: StockItemReader,
}

impl TransferContext {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        entities: Arc<dyn EntityRepository>,
        annotator: Arc<dyn EntityAnnotator>,
        catalog: Arc<dyn ProductCatalog>,
        stock_items: Arc<dyn StockItemStore>,
        indexer: Arc<dyn StockIndexer>,
        config: Arc<dyn StockConfigProvider>,
    ) -> Self {
        let writer = DefaultStockWriter::new(stock_items.clone());
        Self {
            summary: ActivitySummaryWriter::new(activities.clone()),
            updater: StockUpdater::new(catalog.clone(), writer, indexer),
            reader: StockItemReader::new(catalog.clone(), stock_items),
            activities,
            entities,
            annotator,
            catalog,
            config,
        }
    }
}

/// Labelled transferors run one after the other for the same activity.
#[derive(Clone, Default)]
pub struct TransferorChain {
    steps: Vec<(String, Arc<dyn Transferor>)>,
}

impl TransferorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: impl Into<String>, transferor: Arc<dyn Transferor>) -> Self {
        self.steps.push((label.into(), transferor));
        self
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|(label, _)| label.as_str())
    }

    /// Run every transferor in registration order; the first error stops the chain.
    pub fn execute(&self, activity_id: ActivityId) -> Result<(), TransferorError> {
        for (label, transferor) in &self.steps {
            info!(activity_id = %activity_id, transferor = %label, "transferor started");
            if let Err(e) = transferor.execute(activity_id, label) {
                error!(activity_id = %activity_id, transferor = %label, error = %e, "transferor failed");
                return Err(e);
            }
            info!(activity_id = %activity_id, transferor = %label, "transferor finished");
        }
        Ok(())
    }
}
