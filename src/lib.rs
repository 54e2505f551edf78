//! Cross-exchange cryptocurrency arbitrage detection.
//!
//! Consumes price ticks from many exchanges, pairs quotes for the same asset
//! observed at the same instant, and reports spreads that stay profitable
//! after trading fees.
//!
//! # Pipeline
//!
//! ```text
//! ticks -> snapshot (latest per exchange/asset in window)
//!       -> scan (pairwise spread > threshold)
//!       -> fees (net profit after both legs)
//!       -> classify (HIGH / MEDIUM / LOW)
//! ```
//!
//! A buy at 30000 on an exchange charging 0.10% and a sell at 30500 on one
//! charging 0.35% (after tier discount) nets 500 - 30 - 106.75 = 363.25,
//! 1.21% of the buy price, which classifies as HIGH.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`catalog`]: Exchange and asset reference data
//! - [`ticks`]: Tick validation, storage and sources
//! - [`arbitrage`]: Snapshot, scan, fee adjustment and classification
//! - [`report`]: CSV and text output
//! - [`api`]: HTTP API for ingestion, results and metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod arbitrage;
pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod report;
pub mod ticks;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
