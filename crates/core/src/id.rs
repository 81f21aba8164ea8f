//! Strongly-typed identifiers used across the plugin.
//!
//! The host platform keys everything by integers, so these wrap integers
//! rather than UUIDs.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::TransferError;

/// Identifier of an import run (activity).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(i64);

/// Identifier of a catalog product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

/// Identifier of a stock location.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockId(i32);

macro_rules! impl_int_newtype {
    ($t:ty, $inner:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$inner> for $t {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$t> for $inner {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = TransferError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<$inner>()
                    .map_err(|e| TransferError::invalid_value($name, e.to_string()))?;
                Ok(Self(value))
            }
        }
    };
}

impl_int_newtype!(ActivityId, i64, "ActivityId");
impl_int_newtype!(ProductId, i64, "ProductId");
impl_int_newtype!(StockId, i32, "StockId");

impl StockId {
    /// The platform's default stock location.
    pub const DEFAULT: StockId = StockId(1);
}

impl Default for StockId {
    fn default() -> Self {
        Self::DEFAULT
    }
}
