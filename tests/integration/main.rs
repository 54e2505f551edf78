//! End-to-end tests for the detection pipeline.
//!
//! Run with: cargo test --test integration

mod detection;
mod ingestion;
mod properties;

use std::sync::Arc;

use cross_exchange_arb::arbitrage::DetectionOrchestrator;
use cross_exchange_arb::catalog::{Exchange, ExchangeCatalog, FeeTier};
use cross_exchange_arb::ticks::PriceTick;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::datetime;
use time::OffsetDateTime;

/// Reference instant used across scenarios.
pub const T0: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);

/// Two-exchange catalog: A at 0.10% standard, B at 0.50% VIP (0.35% effective).
pub fn two_exchange_orchestrator() -> DetectionOrchestrator {
    let catalog = ExchangeCatalog::new(vec![
        Exchange::new("A", dec!(0.10), FeeTier::Standard),
        Exchange::new("B", dec!(0.50), FeeTier::Vip),
    ])
    .unwrap();
    DetectionOrchestrator::new(Arc::new(catalog))
}

/// Catalog matching the synthetic feed's exchanges.
pub fn synthetic_orchestrator() -> DetectionOrchestrator {
    let catalog = ExchangeCatalog::new(vec![
        Exchange::new("BINANCE", dec!(0.10), FeeTier::Vip),
        Exchange::new("COINBASE", dec!(0.50), FeeTier::Standard),
        Exchange::new("KRAKEN", dec!(0.26), FeeTier::Pro),
        Exchange::new("BITSTAMP", dec!(0.30), FeeTier::Standard),
    ])
    .unwrap();
    DetectionOrchestrator::new(Arc::new(catalog))
}

/// BTC tick with unit volume.
pub fn btc(exchange: &str, price: Decimal, ts: OffsetDateTime) -> PriceTick {
    PriceTick::new(exchange, "BTC", price, dec!(1), ts)
}
