//! Unified error types for the arbitrage detection engine.

use rust_decimal::Decimal;
use thiserror::Error;

/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Detection cycle error.
    #[error("detection error: {0}")]
    Detection(#[from] DetectionError),

    /// Reference data error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Tick ingestion error.
    #[error("tick error: {0}")]
    Tick(#[from] TickError),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that end a detection cycle.
///
/// None of these carry a partial result: a failed cycle yields nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    /// The snapshot builder was handed no ticks at all.
    #[error("no ticks available to build a snapshot")]
    EmptyInput,

    /// No tick survived windowing; the cycle produced an empty result.
    #[error("no price data inside the active window")]
    NoData,

    /// The cycle was cancelled between stages.
    #[error("detection cycle cancelled")]
    Cancelled,

    /// Detection parameters were rejected.
    #[error("invalid detection parameters: {0}")]
    InvalidParams(String),
}

/// Errors that drop a single candidate while the batch continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    /// One leg references an exchange missing from the catalog.
    #[error("unknown exchange {exchange_id} on {asset_id} candidate")]
    UnknownExchange {
        /// The missing exchange.
        exchange_id: String,
        /// Asset of the dropped candidate.
        asset_id: String,
    },

    /// A numeric step had no defined result (division by zero, overflow).
    #[error(
        "arithmetic failure in {operation} for {asset_id} {buy_exchange_id}->{sell_exchange_id}"
    )]
    Arithmetic {
        /// Asset of the dropped candidate.
        asset_id: String,
        /// Buy leg exchange.
        buy_exchange_id: String,
        /// Sell leg exchange.
        sell_exchange_id: String,
        /// Which computation failed.
        operation: &'static str,
    },
}

impl CandidateError {
    /// Short label used for metrics and warning records.
    pub fn reason(&self) -> &'static str {
        match self {
            CandidateError::UnknownExchange { .. } => "unknown_exchange",
            CandidateError::Arithmetic { .. } => "arithmetic",
        }
    }
}

/// Ticks rejected at the ingestion boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TickError {
    /// Price must be strictly positive.
    #[error("non-positive price {price} for {exchange_id}/{asset_id}")]
    NonPositivePrice {
        /// Exchange of the tick.
        exchange_id: String,
        /// Asset of the tick.
        asset_id: String,
        /// Offending price.
        price: Decimal,
    },

    /// Volume must not be negative.
    #[error("negative volume {volume} for {exchange_id}/{asset_id}")]
    NegativeVolume {
        /// Exchange of the tick.
        exchange_id: String,
        /// Asset of the tick.
        asset_id: String,
        /// Offending volume.
        volume: Decimal,
    },

    /// Exchange or asset identifier is blank.
    #[error("tick is missing its {field}")]
    EmptyIdentifier {
        /// Which identifier is blank.
        field: &'static str,
    },
}

/// Reference data errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two exchange records share an ID.
    #[error("duplicate exchange id {0}")]
    DuplicateExchange(String),

    /// Two asset records share an ID.
    #[error("duplicate asset id {0}")]
    DuplicateAsset(String),

    /// Fee rate below zero.
    #[error("exchange {exchange_id} has negative fee rate {fee_rate}")]
    NegativeFeeRate {
        /// Exchange with the bad rate.
        exchange_id: String,
        /// Offending rate.
        fee_rate: Decimal,
    },

    /// Lookup of an exchange absent from the catalog.
    #[error("unknown exchange {0}")]
    UnknownExchange(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
