//! Prometheus metrics for detection cycles and tick ingestion.
//!
//! This module provides metrics for:
//! - Detection cycle latency and outcomes
//! - Opportunities per confidence tier
//! - Candidates skipped during fee adjustment
//! - Tick ingestion accept/reject counts

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Detection cycle latency metric name.
pub const METRIC_DETECTION_LATENCY: &str = "detection_latency_ms";
/// Completed detection cycles counter metric name.
pub const METRIC_DETECTION_CYCLES: &str = "detection_cycles_total";
/// Cycles that ended with no data counter metric name.
pub const METRIC_DETECTION_NO_DATA: &str = "detection_no_data_total";
/// Opportunities detected counter metric name.
pub const METRIC_OPPORTUNITIES_DETECTED: &str = "opportunities_detected_total";
/// Candidates skipped counter metric name.
pub const METRIC_CANDIDATES_SKIPPED: &str = "candidates_skipped_total";
/// Ticks accepted counter metric name.
pub const METRIC_TICKS_INGESTED: &str = "ticks_ingested_total";
/// Ticks rejected counter metric name.
pub const METRIC_TICKS_REJECTED: &str = "ticks_rejected_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_DETECTION_LATENCY,
        "Time to run one detection cycle in milliseconds"
    );

    describe_counter!(METRIC_DETECTION_CYCLES, "Total number of detection cycles completed");
    describe_counter!(
        METRIC_DETECTION_NO_DATA,
        "Total number of detection cycles with no in-window data"
    );
    describe_counter!(
        METRIC_OPPORTUNITIES_DETECTED,
        "Total number of arbitrage opportunities detected"
    );
    describe_counter!(
        METRIC_CANDIDATES_SKIPPED,
        "Total number of candidates dropped during fee adjustment"
    );
    describe_counter!(METRIC_TICKS_INGESTED, "Total number of price ticks accepted");
    describe_counter!(METRIC_TICKS_REJECTED, "Total number of price ticks rejected");

    debug!("Metrics initialized");
}

/// Install the Prometheus recorder and return its render handle.
pub fn install_prometheus() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Increment completed cycles counter.
pub fn inc_detection_cycles() {
    counter!(METRIC_DETECTION_CYCLES).increment(1);
}

/// Increment no-data cycles counter.
pub fn inc_detection_no_data() {
    counter!(METRIC_DETECTION_NO_DATA).increment(1);
}

/// Increment opportunities detected counter for a confidence tier.
pub fn inc_opportunities_detected(confidence: &'static str) {
    counter!(METRIC_OPPORTUNITIES_DETECTED, "confidence" => confidence).increment(1);
}

/// Increment skipped candidates counter.
pub fn inc_candidates_skipped(reason: &'static str) {
    counter!(METRIC_CANDIDATES_SKIPPED, "reason" => reason).increment(1);
}

/// Add accepted ticks.
pub fn inc_ticks_ingested(count: u64) {
    counter!(METRIC_TICKS_INGESTED).increment(count);
}

/// Add rejected ticks.
pub fn inc_ticks_rejected(count: u64) {
    counter!(METRIC_TICKS_REJECTED).increment(count);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for a detection cycle.
pub fn timer_detection() -> LatencyTimer {
    LatencyTimer::new(METRIC_DETECTION_LATENCY)
}
