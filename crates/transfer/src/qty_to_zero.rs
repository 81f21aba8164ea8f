//! Zero-fill: products flagged `auto_qty_to_zero` that are missing from the
//! current import get their quantity set to 0.
//!
//! Any error or panic raised while zeroing one product is recorded against
//! that sku; unlike the quantity transfer, the failure kind is not narrowed.

use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Context};
use tracing::{error, info};

use stocksync_activity::BatchSummary;
use stocksync_core::{ActivityId, FieldPathResolver};

use crate::config::StockTransferSettings;
use crate::default_stock::error_extra;
use crate::error::{FatalBatchAbort, TransferorError};
use crate::transferor::{TransferContext, Transferor};

/// Extra key marking an activity as a targeted request rather than a full import.
pub const TARGETED_REQUEST_KEY: &str = "data";

/// Sets the stock of every eligible product absent from the import to zero.
#[derive(Clone)]
pub struct QtyToZeroTransferor {
    ctx: TransferContext,
    field_sku: String,
    resolver: FieldPathResolver,
}

impl QtyToZeroTransferor {
    pub fn new(ctx: TransferContext, field_sku: impl Into<String>) -> Self {
        Self {
            ctx,
            field_sku: field_sku.into(),
            resolver: FieldPathResolver::new(),
        }
    }

    /// Skus present in the import. Entities whose sku cannot be read are
    /// annotated and left out.
    fn imported_skus(&self, activity_id: ActivityId, transferor_type: &str) -> Result<BTreeSet<String>, TransferorError> {
        let entities = self.ctx.entities.all_data_grouped_by_identifier(activity_id)?;

        let mut skus = BTreeSet::new();
        for entity in &entities {
            match self.resolver.get_string(&entity.data, &self.field_sku) {
                Ok(sku) => {
                    skus.insert(sku);
                }
                Err(err) => {
                    error!(
                        activity_id = %activity_id,
                        transferor = %transferor_type,
                        entity_identifier = %entity.identifier,
                        error = %err,
                        "sku extraction failed"
                    );
                    self.ctx
                        .annotator
                        .add_extra_data(activity_id, &entity.identifier, error_extra(&err))?;
                }
            }
        }
        Ok(skus)
    }

    /// Zero one product; returns its previous quantity.
    fn zero_product(&self, sku: &str, settings: &StockTransferSettings) -> anyhow::Result<Option<f64>> {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| -> anyhow::Result<Option<f64>> {
            let old_item = self
                .ctx
                .reader
                .stock_item_by_sku(sku, settings.stock_id)
                .with_context(|| format!("reading stock of {sku}"))?;
            self.ctx
                .updater
                .apply_quantity(sku, 0.0, settings.stock_id, settings.reindex_after_import)
                .with_context(|| format!("zeroing stock of {sku}"))?;
            Ok(old_item.map(|item| item.qty))
        }));

        match attempt {
            Ok(result) => result,
            Err(payload) => Err(anyhow!("panicked while zeroing {sku}: {}", panic_message(payload.as_ref()))),
        }
    }

    fn save_summary(&self, activity_id: ActivityId, updated: &[String], not_updated: &[String]) -> Result<(), TransferorError> {
        let summary = BatchSummary::ZeroFill {
            updated: updated.to_vec(),
            not_updated: not_updated.to_vec(),
        };
        self.ctx.summary.write(activity_id, &summary)?;
        Ok(())
    }
}

impl Transferor for QtyToZeroTransferor {
    fn execute(&self, activity_id: ActivityId, transferor_type: &str) -> Result<(), TransferorError> {
        let activity = self.ctx.activities.get_by_id(activity_id)?;
        if activity.has_extra_data(TARGETED_REQUEST_KEY) {
            info!(
                activity_id = %activity_id,
                transferor = %transferor_type,
                "targeted request, zero-fill skipped"
            );
            return Ok(());
        }

        let settings = self.ctx.config.settings()?;
        let skip = self.imported_skus(activity_id, transferor_type)?;
        let products = self.ctx.catalog.auto_zero_eligible_excluding(&skip)?;

        let total = products.len();
        let mut updated: Vec<String> = Vec::new();
        let mut not_updated: Vec<String> = Vec::new();

        for (i, product) in products.iter().enumerate() {
            let sku = product.sku.as_str();
            match self.zero_product(sku, &settings) {
                Ok(old_qty) => {
                    info!(
                        activity_id = %activity_id,
                        transferor = %transferor_type,
                        sku,
                        old_qty = ?old_qty,
                        new_qty = 0.0,
                        step = i + 1,
                        total,
                        "stock zeroed"
                    );
                    updated.push(product.sku.clone());
                }
                Err(err) => {
                    error!(
                        activity_id = %activity_id,
                        transferor = %transferor_type,
                        sku,
                        error = %format!("{err:#}"),
                        "stock zeroing failed"
                    );
                    not_updated.push(product.sku.clone());

                    if !settings.continue_in_case_of_errors {
                        self.save_summary(activity_id, &updated, &not_updated)?;
                        return Err(FatalBatchAbort {
                            activity_id,
                            transferor: transferor_type.to_string(),
                            identifier: product.sku.clone(),
                            cause: format!("{err:#}"),
                        }
                        .into());
                    }
                }
            }
        }

        self.save_summary(activity_id, &updated, &not_updated)?;
        info!(
            activity_id = %activity_id,
            transferor = %transferor_type,
            updated = updated.len(),
            not_updated = not_updated.len(),
            "zero-fill summary saved"
        );
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
