//! Arbitrage detection engine.
//!
//! This module handles:
//! - Windowed latest-price snapshots
//! - Pairwise cross-exchange scanning with a gross profit threshold
//! - Fee-adjusted net profit and confidence classification
//! - Orchestration of one detection cycle

pub mod confidence;
pub mod detector;
pub mod fees;
pub mod scanner;
pub mod snapshot;
pub mod types;

pub use confidence::{classify, Confidence};
pub use detector::{CancellationFlag, DetectionOrchestrator};
pub use fees::{adjust, adjust_candidate, FeeAdjustment, LegFees};
pub use scanner::scan;
pub use snapshot::{build_snapshot, Snapshot, SnapshotKey, WindowReference};
pub use types::{
    AdjustedCandidate, ArbitrageCandidate, ArbitrageOpportunity, DetectionCycle, SkippedCandidate,
};
