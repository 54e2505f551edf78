//! Downstream consumers of detection results.
//!
//! This module handles:
//! - The sink interface for opportunity lists
//! - CSV export
//! - Tabular text summaries

pub mod csv;
pub mod table;

pub use self::csv::CsvSink;
pub use table::{render_table, CycleSummary};

use crate::arbitrage::ArbitrageOpportunity;
use crate::error::AppError;

/// Consumer of an ordered opportunity list.
pub trait OpportunitySink {
    /// Publish one cycle's opportunities, preserving order.
    fn publish(&mut self, opportunities: &[ArbitrageOpportunity]) -> Result<(), AppError>;
}
