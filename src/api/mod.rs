//! HTTP API module for health, ingestion, opportunities and metrics endpoints.

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, CycleStats};
pub use routes::create_router;
