//! Reference data for exchanges and assets.
//!
//! This module handles:
//! - Exchange and asset record types
//! - Fee tier multipliers and effective fee lookup
//! - Immutable catalogs loaded once per process

pub mod store;
pub mod types;

pub use store::{AssetCatalog, ExchangeCatalog};
pub use types::{Asset, Exchange, FeeTier};
