// HTTP routes configuration

use crate::core::state::AppState;
use crate::handlers::{announce, fallback, health, infohash, manifest, metrics};
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Tracker protocol
        .route("/announce", get(announce::announce_handler))

        // Registries
        .route(
            "/infohash",
            get(infohash::get_infohash_handler).post(infohash::create_infohash_handler),
        )
        .route(
            "/manifest/{*name}",
            get(manifest::get_manifest_handler).post(manifest::post_manifest_handler),
        )
        .route(
            "/manifest",
            get(manifest::missing_name_handler).post(manifest::missing_name_handler),
        )
        .route(
            "/manifest/",
            get(manifest::missing_name_handler).post(manifest::missing_name_handler),
        )

        // Monitoring
        .route("/health", get(health::health_handler))
        .route("/metrics", get(metrics::metrics_handler))

        // 404 fallback for all unmatched routes
        .fallback(fallback::fallback_handler)

        .with_state(state)
}
