//! Price tick ingestion and storage.
//!
//! This module handles:
//! - Tick types and ingestion-boundary validation
//! - The append-only tick store with point-in-time views
//! - Tick sources, including a seeded synthetic feed

pub mod source;
pub mod store;
pub mod types;

pub use source::{JsonFileSource, SyntheticConfig, SyntheticTickSource, TickSource};
pub use store::{IngestReport, PriceTickStore, RejectedTick, TickView};
pub use types::PriceTick;
