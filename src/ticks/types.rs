//! Price tick type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::TickError;

/// One observed quote from one exchange for one asset at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTick {
    /// Quoting exchange.
    pub exchange_id: String,
    /// Quoted asset.
    pub asset_id: String,
    /// Quote price.
    pub price: Decimal,
    /// Quoted volume.
    pub volume: Decimal,
    /// Observation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl PriceTick {
    /// Create a new tick.
    pub fn new(
        exchange_id: impl Into<String>,
        asset_id: impl Into<String>,
        price: Decimal,
        volume: Decimal,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            exchange_id: exchange_id.into(),
            asset_id: asset_id.into(),
            price,
            volume,
            timestamp,
        }
    }

    /// Ingestion boundary check. Ticks failing this never enter the store.
    pub fn validate(&self) -> Result<(), TickError> {
        if self.exchange_id.trim().is_empty() {
            return Err(TickError::EmptyIdentifier {
                field: "exchange_id",
            });
        }

        if self.asset_id.trim().is_empty() {
            return Err(TickError::EmptyIdentifier { field: "asset_id" });
        }

        if self.price <= Decimal::ZERO {
            return Err(TickError::NonPositivePrice {
                exchange_id: self.exchange_id.clone(),
                asset_id: self.asset_id.clone(),
                price: self.price,
            });
        }

        if self.volume < Decimal::ZERO {
            return Err(TickError::NegativeVolume {
                exchange_id: self.exchange_id.clone(),
                asset_id: self.asset_id.clone(),
                volume: self.volume,
            });
        }

        Ok(())
    }
}
