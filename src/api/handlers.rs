//! HTTP API handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::header, http::StatusCode, response::IntoResponse, Json};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use time::OffsetDateTime;

use crate::arbitrage::DetectionCycle;
use crate::error::DetectionError;
use crate::ticks::{IngestReport, PriceTick, PriceTickStore};

/// Running counters across detection cycles.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleStats {
    /// Cycles that produced a result (possibly empty).
    pub cycles_completed: u64,
    /// Cycles with no in-window data.
    pub no_data_cycles: u64,
    /// Cycles cancelled before completion.
    pub cancelled_cycles: u64,
    /// Opportunities across all completed cycles.
    pub opportunities_found: u64,
    /// Reference instant of the last completed cycle.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_cycle_at: Option<OffsetDateTime>,
}

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Whether a detection cycle has completed.
    pub ready: Arc<AtomicBool>,
    /// Tick store fed by the ingestion endpoint.
    pub store: Arc<PriceTickStore>,
    /// Most recent detection result.
    pub latest: Arc<tokio::sync::RwLock<Option<DetectionCycle>>>,
    /// Cycle statistics.
    pub stats: Arc<tokio::sync::RwLock<CycleStats>>,
    /// Prometheus render handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state around a tick store.
    pub fn new(store: Arc<PriceTickStore>) -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
            store,
            latest: Arc::new(tokio::sync::RwLock::new(None)),
            stats: Arc::new(tokio::sync::RwLock::new(CycleStats::default())),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Set ready state.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Check if ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Record a cycle outcome. A no-data cycle publishes an empty result.
    pub async fn publish(
        &self,
        outcome: Result<DetectionCycle, DetectionError>,
        now: OffsetDateTime,
    ) {
        let mut stats = self.stats.write().await;
        match outcome {
            Ok(cycle) => {
                stats.cycles_completed += 1;
                stats.opportunities_found += cycle.opportunities.len() as u64;
                stats.last_cycle_at = Some(cycle.analysis_timestamp);
                *self.latest.write().await = Some(cycle);
            }
            Err(DetectionError::NoData) => {
                stats.cycles_completed += 1;
                stats.no_data_cycles += 1;
                stats.last_cycle_at = Some(now);
                *self.latest.write().await = Some(DetectionCycle::empty(now));
            }
            Err(DetectionError::Cancelled) => {
                stats.cancelled_cycles += 1;
                return;
            }
            Err(_) => return,
        }
        drop(stats);
        self.set_ready(true);
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether service is ready.
    pub ready: bool,
    /// Ticks held in the store.
    pub ticks: usize,
}

/// Status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Service status.
    pub status: &'static str,
    /// Ticks held in the store.
    pub ticks: usize,
    /// Statistics.
    pub stats: CycleStats,
}

/// Latest opportunities response.
#[derive(Debug, Serialize)]
pub struct OpportunitiesResponse {
    /// Latest cycle, absent before the first completes.
    pub cycle: Option<DetectionCycle>,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 once a cycle completed, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.is_ready();
    let response = ReadyResponse {
        ready: is_ready,
        ticks: state.store.len(),
    };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Status handler - returns detection statistics.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.stats.read().await.clone();
    let status = if state.is_ready() { "running" } else { "starting" };

    Json(StatusResponse {
        status,
        ticks: state.store.len(),
        stats,
    })
}

/// Latest cycle's opportunities in result order.
pub async fn opportunities(State(state): State<AppState>) -> impl IntoResponse {
    let cycle = state.latest.read().await.clone();
    Json(OpportunitiesResponse { cycle })
}

/// Batch tick ingestion. Invalid ticks are reported and skipped.
pub async fn ingest_ticks(
    State(state): State<AppState>,
    Json(ticks): Json<Vec<PriceTick>>,
) -> impl IntoResponse {
    let report: IngestReport = state.store.append_batch(ticks);

    if report.accepted == 0 && !report.rejected.is_empty() {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(report))
    } else {
        (StatusCode::OK, Json(report))
    }
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
