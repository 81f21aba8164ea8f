//! Quantity transfer: one stock write per imported entity.
//!
//! ## Flow
//!
//! ```text
//! entities (first-seen order)
//!   ↓ per entity
//! 1. read sku + quantity through the field mapping
//! 2. capture the current stock item (old quantity)
//! 3. write the quantity (+ optional row reindex)
//! 4. annotate the entity: {old_qty, new_qty} or {error}
//!   ↓
//! summary {ok, ko} merged into the activity
//! ```
//!
//! Only `TransferError` is absorbed per entity. With
//! `continue_in_case_of_errors = false` the first failure saves the partial
//! summary and ends the run with `FatalBatchAbort`.

use serde_json::json;
use tracing::{error, info};

use stocksync_activity::{BatchSummary, ImportedEntity, JsonMap};
use stocksync_core::{ActivityId, FieldPathResolver, TransferError, TransferResult};

use crate::config::{FieldMapping, StockTransferSettings};
use crate::error::{FatalBatchAbort, TransferorError};
use crate::transferor::{TransferContext, Transferor};

/// Result of one successful entity transfer.
#[derive(Debug, Clone, PartialEq)]
struct EntityTransfer {
    /// `None` when the product had no stock item in the target stock yet.
    old_qty: Option<f64>,
    new_qty: f64,
}

impl EntityTransfer {
    fn to_extra(&self) -> JsonMap {
        let mut extra = JsonMap::new();
        extra.insert("old_qty".to_string(), json!(self.old_qty));
        extra.insert("new_qty".to_string(), json!(self.new_qty));
        extra
    }
}

pub(crate) fn error_extra(err: &dyn std::fmt::Display) -> JsonMap {
    let mut extra = JsonMap::new();
    extra.insert("error".to_string(), json!(err.to_string()));
    extra
}

/// Writes the imported quantity of every entity into the configured stock.
#[derive(Clone)]
pub struct DefaultStockTransferor {
    ctx: TransferContext,
    fields: FieldMapping,
    resolver: FieldPathResolver,
}

impl DefaultStockTransferor {
    pub fn new(ctx: TransferContext, fields: FieldMapping) -> Self {
        Self {
            ctx,
            fields,
            resolver: FieldPathResolver::new(),
        }
    }

    fn transfer_entity(&self, entity: &ImportedEntity, settings: &StockTransferSettings) -> TransferResult<EntityTransfer> {
        let sku = self.resolver.get_string(&entity.data, &self.fields.sku)?;
        let qty = self.resolver.get_f64(&entity.data, &self.fields.quantity)?;

        let old_item = self.ctx.reader.stock_item_by_sku(&sku, settings.stock_id)?;
        self.ctx
            .updater
            .apply_quantity(&sku, qty, settings.stock_id, settings.reindex_after_import)?;

        Ok(EntityTransfer {
            old_qty: old_item.map(|item| item.qty),
            new_qty: qty,
        })
    }

    fn save_summary(&self, activity_id: ActivityId, ok: u64, ko: u64) -> Result<(), TransferorError> {
        self.ctx
            .summary
            .write(activity_id, &BatchSummary::Transfer { ok, ko })?;
        Ok(())
    }
}

impl Transferor for DefaultStockTransferor {
    fn execute(&self, activity_id: ActivityId, transferor_type: &str) -> Result<(), TransferorError> {
        let settings = self.ctx.config.settings()?;
        let entities = self.ctx.entities.all_data_grouped_by_identifier(activity_id)?;

        let total = entities.len();
        let mut ok: u64 = 0;
        let mut ko: u64 = 0;

        for (i, entity) in entities.iter().enumerate() {
            info!(
                activity_id = %activity_id,
                transferor = %transferor_type,
                entity_identifier = %entity.identifier,
                step = i + 1,
                total,
                "stock transfer started"
            );

            match self.transfer_entity(entity, &settings) {
                Ok(transfer) => {
                    info!(
                        activity_id = %activity_id,
                        transferor = %transferor_type,
                        entity_identifier = %entity.identifier,
                        new_qty = transfer.new_qty,
                        "stock transfer finished"
                    );
                    ok += 1;
                    self.ctx
                        .annotator
                        .add_extra_data(activity_id, &entity.identifier, transfer.to_extra())?;
                }
                Err(err) => {
                    ko += 1;
                    error!(
                        activity_id = %activity_id,
                        transferor = %transferor_type,
                        entity_identifier = %entity.identifier,
                        error = %err,
                        "stock transfer failed"
                    );
                    self.ctx
                        .annotator
                        .add_extra_data(activity_id, &entity.identifier, error_extra(&err))?;

                    if !settings.continue_in_case_of_errors {
                        self.save_summary(activity_id, ok, ko)?;
                        return Err(abort(activity_id, transferor_type, &entity.identifier, &err).into());
                    }
                }
            }
        }

        self.save_summary(activity_id, ok, ko)?;
        info!(activity_id = %activity_id, transferor = %transferor_type, ok, ko, "stock transfer summary saved");
        Ok(())
    }
}

fn abort(activity_id: ActivityId, transferor: &str, identifier: &str, cause: &TransferError) -> FatalBatchAbort {
    FatalBatchAbort {
        activity_id,
        transferor: transferor.to_string(),
        identifier: identifier.to_string(),
        cause: cause.to_string(),
    }
}
