// Info hash registry endpoints

use crate::core::error::RegistryError;
use crate::core::state::AppState;
use crate::models::torrent::TorrentInfo;
use axum::extract::{Query, State};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct InfoHashQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub info_hash: String,
}

/// GET /infohash?name=<torrent name>
///
/// Returns the registered info hash as plain text.
#[instrument(skip(state))]
pub async fn get_infohash_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InfoHashQuery>,
) -> Result<String, RegistryError> {
    state.metrics.increment_registry_requests();

    lookup(&state, &params.name).await.inspect_err(|e| {
        warn!(name = %params.name, error = %e, "Info hash lookup failed");
        state.metrics.increment_registry_failures();
    })
}

/// POST /infohash?name=<torrent name>&info_hash=<info hash>
#[instrument(skip(state))]
pub async fn create_infohash_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InfoHashQuery>,
) -> Result<(), RegistryError> {
    state.metrics.increment_registry_requests();

    create(&state, params).await.inspect_err(|e| {
        warn!(error = %e, "Info hash registration failed");
        state.metrics.increment_registry_failures();
    })
}

async fn lookup(state: &AppState, name: &str) -> Result<String, RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::EmptyParameter("name"));
    }

    let torrent = state
        .storage
        .read_torrent(name)
        .await?
        .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

    Ok(torrent.info_hash)
}

async fn create(state: &AppState, params: InfoHashQuery) -> Result<(), RegistryError> {
    if params.name.is_empty() {
        return Err(RegistryError::EmptyParameter("name"));
    }
    if params.info_hash.is_empty() {
        return Err(RegistryError::EmptyParameter("info_hash"));
    }

    let torrent = TorrentInfo::new(params.name, params.info_hash);
    state.storage.create_torrent(&torrent).await?;

    info!(
        name = %torrent.torrent_name,
        info_hash = %torrent.info_hash,
        "Torrent registered"
    );

    Ok(())
}
