use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocksync_core::{ProductId, StockId};

/// Catalog product as seen by the stock transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    /// Product opted in to having its quantity zeroed when absent from an import.
    pub auto_qty_to_zero: bool,
}

impl Product {
    pub fn new(id: ProductId, sku: impl Into<String>) -> Self {
        Self {
            id,
            sku: sku.into(),
            auto_qty_to_zero: false,
        }
    }

    pub fn with_auto_qty_to_zero(mut self, flag: bool) -> Self {
        self.auto_qty_to_zero = flag;
        self
    }
}

/// Availability flag of a stock item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    OutOfStock,
}

impl StockStatus {
    pub fn is_in_stock(self) -> bool {
        matches!(self, StockStatus::InStock)
    }
}

impl From<bool> for StockStatus {
    fn from(in_stock: bool) -> Self {
        if in_stock {
            StockStatus::InStock
        } else {
            StockStatus::OutOfStock
        }
    }
}

/// Quantity and availability of one product in one stock location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub product_id: ProductId,
    pub stock_id: StockId,
    pub qty: f64,
    pub is_in_stock: bool,
    /// Stamped by the store on save; `None` for an item that was never persisted.
    pub updated_at: Option<DateTime<Utc>>,
}

impl StockItem {
    /// A blank item bound to `(product_id, stock_id)`, used when nothing was stored yet.
    pub fn new_for(product_id: ProductId, stock_id: StockId) -> Self {
        Self {
            product_id,
            stock_id,
            qty: 0.0,
            is_in_stock: false,
            updated_at: None,
        }
    }

    /// Sets the quantity and derives the in-stock flag from it.
    pub fn set_qty(&mut self, qty: f64) {
        self.qty = qty;
        self.is_in_stock = qty > 0.0;
    }

    /// Sets the in-stock flag only; quantity is left as is.
    pub fn set_status(&mut self, status: StockStatus) {
        self.is_in_stock = status.is_in_stock();
    }

    pub fn status(&self) -> StockStatus {
        StockStatus::from(self.is_in_stock)
    }
}

/// A configured stock location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocation {
    pub stock_id: StockId,
    pub name: String,
    pub website_id: i32,
}

/// `(value, label)` pair offered when choosing the target stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockOption {
    pub value: StockId,
    pub label: String,
}

/// Turns the stock listing into selectable options, ordered by stock id.
pub fn stock_id_options(stocks: &[StockLocation]) -> Vec<StockOption> {
    let mut options: Vec<StockOption> = stocks
        .iter()
        .map(|s| StockOption {
            value: s.stock_id,
            label: s.name.clone(),
        })
        .collect();
    options.sort_by_key(|o| o.value);
    options
}
