//! Immutable exchange and asset catalogs.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::types::{Asset, Exchange};
use crate::error::{AppError, CatalogError};

/// Exchange reference data keyed by ID.
///
/// Built once and shared read-only (behind an `Arc`) by every detection cycle.
#[derive(Debug, Clone, Default)]
pub struct ExchangeCatalog {
    exchanges: HashMap<String, Exchange>,
}

impl ExchangeCatalog {
    /// Build a catalog, rejecting duplicate IDs and negative fee rates.
    pub fn new(exchanges: Vec<Exchange>) -> Result<Self, CatalogError> {
        let mut map = HashMap::with_capacity(exchanges.len());

        for exchange in exchanges {
            if exchange.fee_rate < Decimal::ZERO {
                return Err(CatalogError::NegativeFeeRate {
                    exchange_id: exchange.id,
                    fee_rate: exchange.fee_rate,
                });
            }
            if map.contains_key(&exchange.id) {
                return Err(CatalogError::DuplicateExchange(exchange.id));
            }
            map.insert(exchange.id.clone(), exchange);
        }

        Ok(Self { exchanges: map })
    }

    /// Load the exchange reference feed from a JSON array file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let exchanges: Vec<Exchange> = serde_json::from_str(&raw)?;
        let catalog = Self::new(exchanges)?;
        debug!(exchanges = catalog.len(), "Exchange catalog loaded");
        Ok(catalog)
    }

    /// Look up an exchange.
    pub fn get(&self, id: &str) -> Option<&Exchange> {
        self.exchanges.get(id)
    }

    /// Effective (tier-discounted) fee for an exchange, in percent.
    pub fn effective_fee(&self, id: &str) -> Result<Decimal, CatalogError> {
        self.get(id)
            .map(Exchange::effective_fee)
            .ok_or_else(|| CatalogError::UnknownExchange(id.to_string()))
    }

    /// Number of exchanges.
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Exchange IDs in ascending order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.exchanges.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Asset reference data keyed by ID. Used for display names only.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    assets: HashMap<String, Asset>,
}

impl AssetCatalog {
    /// Build a catalog, rejecting duplicate IDs.
    pub fn new(assets: Vec<Asset>) -> Result<Self, CatalogError> {
        let mut map = HashMap::with_capacity(assets.len());

        for asset in assets {
            if map.contains_key(&asset.id) {
                return Err(CatalogError::DuplicateAsset(asset.id));
            }
            map.insert(asset.id.clone(), asset);
        }

        Ok(Self { assets: map })
    }

    /// Load the asset reference feed from a JSON array file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let assets: Vec<Asset> = serde_json::from_str(&raw)?;
        let catalog = Self::new(assets)?;
        debug!(assets = catalog.len(), "Asset catalog loaded");
        Ok(catalog)
    }

    /// Look up an asset.
    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }

    /// Display name, falling back to the ID for unknown assets.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|a| a.name.as_str()).unwrap_or(id)
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Asset IDs in ascending order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.assets.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
