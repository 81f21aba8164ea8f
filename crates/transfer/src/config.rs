//! Transfer configuration: target stock, reindex and error policy.
//!
//! Settings are read once at the start of every engine run and stay fixed for
//! that run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use stocksync_core::StockId;
use stocksync_inventory::{StockListing, StockLocation, StockStoreError};

/// Per-run settings of the stock transferors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockTransferSettings {
    /// Stock location written to.
    pub stock_id: StockId,
    /// Reindex each product row right after its stock write.
    pub reindex_after_import: bool,
    /// Keep going after a failed record instead of aborting the batch.
    pub continue_in_case_of_errors: bool,
}

impl Default for StockTransferSettings {
    fn default() -> Self {
        Self {
            stock_id: StockId::DEFAULT,
            reindex_after_import: false,
            continue_in_case_of_errors: true,
        }
    }
}

impl StockTransferSettings {
    pub fn with_stock_id(mut self, stock_id: StockId) -> Self {
        self.stock_id = stock_id;
        self
    }

    pub fn with_reindex_after_import(mut self, reindex: bool) -> Self {
        self.reindex_after_import = reindex;
        self
    }

    pub fn with_continue_in_case_of_errors(mut self, continue_on_errors: bool) -> Self {
        self.continue_in_case_of_errors = continue_on_errors;
        self
    }

    /// Fails when `stock_id` is not one of the configured stock locations.
    pub fn validate(&self, stocks: &[StockLocation]) -> Result<(), ConfigError> {
        if stocks.iter().any(|s| s.stock_id == self.stock_id) {
            Ok(())
        } else {
            Err(ConfigError::UnknownStock(self.stock_id))
        }
    }
}

/// Dot paths of the fields a transferor reads from each imported entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub sku: String,
    pub quantity: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            sku: "sku".to_string(),
            quantity: "qty".to_string(),
        }
    }
}

impl FieldMapping {
    pub fn new(sku: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            quantity: quantity.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid { key: String, value: String, reason: String },
    #[error("stock {0} is not a configured stock location")]
    UnknownStock(StockId),
    #[error("failed to list stock locations: {0}")]
    Listing(#[from] StockStoreError),
}

/// Source of the settings for one run.
pub trait StockConfigProvider: Send + Sync {
    fn settings(&self) -> Result<StockTransferSettings, ConfigError>;
}

impl StockConfigProvider for StockTransferSettings {
    fn settings(&self) -> Result<StockTransferSettings, ConfigError> {
        Ok(self.clone())
    }
}

impl<S> StockConfigProvider for Arc<S>
where
    S: StockConfigProvider + ?Sized,
{
    fn settings(&self) -> Result<StockTransferSettings, ConfigError> {
        (**self).settings()
    }
}

type VarLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Settings read from environment variables.
///
/// - `<PREFIX>_STOCK_ID`
/// - `<PREFIX>_REINDEX_AFTER_IMPORT`
/// - `<PREFIX>_CONTINUE_IN_CASE_OF_ERRORS`
///
/// Unset variables fall back to [`StockTransferSettings::default`].
#[derive(Clone)]
pub struct EnvStockConfig {
    prefix: String,
    lookup: VarLookup,
    listing: Option<Arc<dyn StockListing>>,
}

impl Default for EnvStockConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvStockConfig {
    pub const DEFAULT_PREFIX: &'static str = "STOCKSYNC";

    pub fn new() -> Self {
        Self {
            prefix: Self::DEFAULT_PREFIX.to_string(),
            lookup: Arc::new(|key| std::env::var(key).ok()),
            listing: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Replace the variable source (tests, embedded hosts).
    pub fn with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.lookup = Arc::new(lookup);
        self
    }

    /// Validate the configured stock id against the platform's stock list.
    pub fn with_listing(mut self, listing: Arc<dyn StockListing>) -> Self {
        self.listing = Some(listing);
        self
    }

    fn var(&self, name: &str) -> Option<(String, String)> {
        let key = format!("{}_{}", self.prefix, name);
        (self.lookup)(key.as_str()).map(|value| (key, value))
    }
}

impl StockConfigProvider for EnvStockConfig {
    fn settings(&self) -> Result<StockTransferSettings, ConfigError> {
        let mut settings = StockTransferSettings::default();

        if let Some((key, value)) = self.var("STOCK_ID") {
            settings.stock_id = value.parse::<StockId>().map_err(|e| ConfigError::Invalid {
                key,
                value: value.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some((key, value)) = self.var("REINDEX_AFTER_IMPORT") {
            settings.reindex_after_import = parse_flag(&key, &value)?;
        }
        if let Some((key, value)) = self.var("CONTINUE_IN_CASE_OF_ERRORS") {
            settings.continue_in_case_of_errors = parse_flag(&key, &value)?;
        }

        if let Some(listing) = &self.listing {
            settings.validate(&listing.list_stocks()?)?;
        }
        Ok(settings)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a boolean flag".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> EnvStockConfig {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        EnvStockConfig::new().with_lookup(move |key| vars.get(key).cloned())
    }

    struct Stocks(Vec<StockLocation>);

    impl StockListing for Stocks {
        fn list_stocks(&self) -> Result<Vec<StockLocation>, StockStoreError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(env(&[]).settings().unwrap(), StockTransferSettings::default());
    }

    #[test]
    fn reads_prefixed_variables() {
        let settings = env(&[
            ("STOCKSYNC_STOCK_ID", "2"),
            ("STOCKSYNC_REINDEX_AFTER_IMPORT", "yes"),
            ("STOCKSYNC_CONTINUE_IN_CASE_OF_ERRORS", "0"),
        ])
        .settings()
        .unwrap();

        assert_eq!(settings.stock_id, StockId::new(2));
        assert!(settings.reindex_after_import);
        assert!(!settings.continue_in_case_of_errors);
    }

    #[test]
    fn custom_prefix() {
        let settings = env(&[("LOFT_STOCK_ID", "3")]).with_prefix("LOFT").settings().unwrap();
        assert_eq!(settings.stock_id, StockId::new(3));
    }

    #[test]
    fn rejects_bad_values() {
        let err = env(&[("STOCKSYNC_REINDEX_AFTER_IMPORT", "maybe")]).settings().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "STOCKSYNC_REINDEX_AFTER_IMPORT"));

        let err = env(&[("STOCKSYNC_STOCK_ID", "main")]).settings().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn validates_against_stock_listing() {
        let listing = Arc::new(Stocks(vec![StockLocation {
            stock_id: StockId::DEFAULT,
            name: "Default Stock".to_string(),
            website_id: 0,
        }]));

        assert!(env(&[]).with_listing(listing.clone()).settings().is_ok());

        let err = env(&[("STOCKSYNC_STOCK_ID", "4")])
            .with_listing(listing)
            .settings()
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownStock(StockId::new(4)));
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: StockTransferSettings =
            serde_json::from_value(serde_json::json!({"continue_in_case_of_errors": false})).unwrap();
        assert_eq!(settings.stock_id, StockId::DEFAULT);
        assert!(!settings.continue_in_case_of_errors);

        let fields: FieldMapping = serde_json::from_value(serde_json::json!({"quantity": "stock.qty"})).unwrap();
        assert_eq!(fields, FieldMapping::new("sku", "stock.qty"));
    }
}
