//! Detection cycle orchestration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, instrument};

use super::confidence::classify;
use super::fees::{adjust, FeeAdjustment};
use super::scanner::scan;
use super::snapshot::{build_snapshot, WindowReference};
use super::types::{ArbitrageOpportunity, DetectionCycle};
use crate::catalog::ExchangeCatalog;
use crate::config::{DetectionParams, WindowAnchor};
use crate::error::DetectionError;
use crate::metrics;
use crate::ticks::TickView;

/// Cooperative cancellation signal, checked between pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Create a flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn checkpoint(&self, stage: &'static str) -> Result<(), DetectionError> {
        if self.is_cancelled() {
            debug!(stage, "Detection cycle cancelled");
            return Err(DetectionError::Cancelled);
        }
        Ok(())
    }
}

/// Runs snapshot -> scan -> fee adjustment -> classification.
///
/// Holds no mutable state; concurrent `run` calls are independent.
#[derive(Debug, Clone)]
pub struct DetectionOrchestrator {
    catalog: Arc<ExchangeCatalog>,
}

impl DetectionOrchestrator {
    /// Create an orchestrator over a fixed exchange catalog.
    pub fn new(catalog: Arc<ExchangeCatalog>) -> Self {
        Self { catalog }
    }

    /// The exchange catalog in use.
    pub fn catalog(&self) -> &ExchangeCatalog {
        &self.catalog
    }

    /// Run one detection cycle against a point-in-time tick view.
    ///
    /// Only ticks observed at or before `now` are considered, so re-running with
    /// the same view, parameters and `now` yields identical output. An empty
    /// input or window returns [`DetectionError::NoData`].
    #[instrument(
        skip_all,
        fields(
            min_profit_pct = %params.min_profit_pct,
            max_age_seconds = params.max_age_seconds,
            anchor = %params.anchor,
            now = %now,
        )
    )]
    pub fn run(
        &self,
        ticks: &TickView,
        params: &DetectionParams,
        now: OffsetDateTime,
        cancel: &CancellationFlag,
    ) -> Result<DetectionCycle, DetectionError> {
        params.validate().map_err(DetectionError::InvalidParams)?;
        let _timer = metrics::timer_detection();

        cancel.checkpoint("snapshot")?;
        let reference = match params.anchor {
            WindowAnchor::LatestTick => WindowReference::LatestTick,
            WindowAnchor::Now => WindowReference::At(now),
        };
        let snapshot = match build_snapshot(ticks.until(now), params.max_age(), reference) {
            Ok(snapshot) if !snapshot.is_empty() => snapshot,
            Ok(_) | Err(DetectionError::EmptyInput) => {
                debug!("No price data in window");
                metrics::inc_detection_no_data();
                return Err(DetectionError::NoData);
            }
            Err(e) => return Err(e),
        };

        cancel.checkpoint("scan")?;
        let candidates = scan(&snapshot, params.min_profit_pct);
        let candidate_count = candidates.len();

        cancel.checkpoint("fees")?;
        let FeeAdjustment { adjusted, skipped } = adjust(candidates, &self.catalog);

        cancel.checkpoint("classify")?;
        let opportunities: Vec<ArbitrageOpportunity> =
            adjusted.into_iter().map(|a| classify(a, now)).collect();

        cancel.checkpoint("publish")?;
        metrics::inc_detection_cycles();
        for opp in &opportunities {
            metrics::inc_opportunities_detected(opp.confidence.as_str());
        }

        if let Some(best) = opportunities.first() {
            info!(
                opportunities = opportunities.len(),
                skipped = skipped.len(),
                best_asset = %best.candidate.asset_id,
                best_profit_pct = %best.candidate.profit_pct,
                best_net_profit_pct = %best.net_profit_pct,
                "Arbitrage opportunities detected"
            );
        } else {
            debug!(
                snapshot = snapshot.len(),
                skipped = skipped.len(),
                "No arbitrage opportunity"
            );
        }

        Ok(DetectionCycle {
            opportunities,
            skipped,
            analysis_timestamp: now,
            snapshot_size: snapshot.len(),
            candidate_count,
        })
    }
}
