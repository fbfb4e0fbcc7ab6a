// Manifest registry endpoints

use crate::core::error::RegistryError;
use crate::core::state::AppState;
use crate::models::manifest::{validate_manifest, Manifest};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// GET /manifest/{name}
///
/// Serves the stored document exactly as it was uploaded.
#[instrument(skip(state))]
pub async fn get_manifest_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, RegistryError> {
    state.metrics.increment_registry_requests();

    let manifest = lookup(&state, &name).await.inspect_err(|e| {
        warn!(name = %name, error = %e, "Manifest lookup failed");
        state.metrics.increment_registry_failures();
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], manifest.manifest).into_response())
}

/// POST /manifest/{name}
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn post_manifest_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<(), RegistryError> {
    state.metrics.increment_registry_requests();

    store(&state, name, &body).await.inspect_err(|e| {
        warn!(error = %e, "Manifest upload rejected");
        state.metrics.increment_registry_failures();
    })
}

/// `/manifest` and `/manifest/` carry no name
pub async fn missing_name_handler(State(state): State<Arc<AppState>>) -> RegistryError {
    state.metrics.increment_registry_requests();
    state.metrics.increment_registry_failures();
    RegistryError::EmptyParameter("name")
}

async fn lookup(state: &AppState, name: &str) -> Result<Manifest, RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::EmptyParameter("name"));
    }

    state
        .storage
        .read_manifest(name)
        .await?
        .ok_or_else(|| RegistryError::NotFound(name.to_string()))
}

async fn store(state: &AppState, name: String, body: &[u8]) -> Result<(), RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::EmptyParameter("name"));
    }

    let document = validate_manifest(body)?;
    let manifest = Manifest::new(name, document);
    state.storage.update_manifest(&manifest).await?;

    info!(tag = %manifest.tag_name, bytes = body.len(), "Manifest stored");

    Ok(())
}
