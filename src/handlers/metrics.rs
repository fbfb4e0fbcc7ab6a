// Metrics endpoint

use crate::core::state::AppState;
use crate::metrics::collector::MetricsSnapshot;
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /metrics
///
/// Announce and registry counters, uptime, and peer counts when the
/// in-memory backend is in use.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.get_snapshot(state.memory.as_deref()))
}
