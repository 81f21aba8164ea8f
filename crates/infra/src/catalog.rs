use std::collections::BTreeSet;
use std::sync::{Mutex, RwLock};

use stocksync_inventory::{CatalogError, Product, ProductCatalog};

/// In-memory product catalog for tests/dev.
///
/// Keeps products in insertion order and records every sku lookup, so tests
/// can assert which records a run actually touched.
#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    products: RwLock<Vec<Product>>,
    lookups: Mutex<Vec<String>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: RwLock::new(products.into_iter().collect()),
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Insert or replace (by sku).
    pub fn upsert(&self, product: Product) -> Result<(), CatalogError> {
        let mut products = self.products.write().map_err(poisoned)?;
        match products.iter_mut().find(|p| p.sku == product.sku) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        Ok(())
    }

    /// Skus passed to `find_by_sku`, in call order.
    pub fn sku_lookups(&self) -> Vec<String> {
        self.lookups.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl ProductCatalog for InMemoryProductCatalog {
    fn find_by_sku(&self, sku: &str) -> Result<Product, CatalogError> {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push(sku.to_string());
        }

        let products = self.products.read().map_err(poisoned)?;
        products
            .iter()
            .find(|p| p.sku == sku)
            .cloned()
            .ok_or_else(|| CatalogError::EntityNotFound(sku.to_string()))
    }

    fn auto_zero_eligible_excluding(&self, excluded_skus: &BTreeSet<String>) -> Result<Vec<Product>, CatalogError> {
        let products = self.products.read().map_err(poisoned)?;
        Ok(products
            .iter()
            .filter(|p| p.auto_qty_to_zero && !excluded_skus.contains(&p.sku))
            .cloned()
            .collect())
    }
}

fn poisoned<T>(_: T) -> CatalogError {
    CatalogError::Storage("catalog lock poisoned".to_string())
}
