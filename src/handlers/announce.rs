use crate::bencode::response::AnnouncerResponse;
use crate::core::error::AnnounceError;
use crate::core::state::AppState;
use crate::validation::params::AnnounceRequest;
use axum::{
    extract::{ConnectInfo, RawQuery, State},
    http::{header, Extensions},
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Announce handler
///
/// GET /announce
///
/// # Flow
/// 1. Decode the query string (malformed requests never reach storage)
/// 2. Build the peer record, falling back to the TCP peer address for `ip`
/// 3. Read the swarm from storage
/// 4. Upsert the requester's record
/// 5. Run the handout policy over the swarm minus the requester
/// 6. Return the bencoded response
#[instrument(skip_all)]
pub async fn announce_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(raw_query): RawQuery,
    extensions: Extensions,
) -> Response {
    state.metrics.increment_announces();

    // Absent when the router is driven without a socket, as in tests
    let remote_ip = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match process_announce(&state, raw_query.as_deref(), remote_ip).await {
        Ok(body) => {
            state.metrics.increment_successful();
            ([(header::CONTENT_TYPE, "text/plain")], body).into_response()
        }
        Err(e) => {
            state.metrics.increment_failed();
            e.into_response_with(state.config.announce.strict_client_errors)
        }
    }
}

async fn process_announce(
    state: &AppState,
    raw_query: Option<&str>,
    remote_ip: Option<IpAddr>,
) -> Result<Vec<u8>, AnnounceError> {
    let request = AnnounceRequest::parse(raw_query).map_err(|e| {
        warn!(error = %e, "Malformed announce request");
        AnnounceError::from(e)
    })?;

    let peer = request.into_peer_info(remote_ip);
    debug!(
        info_hash = %peer.info_hash,
        peer_id = %peer.peer_id,
        ip = %peer.ip,
        port = peer.port,
        dc = %peer.dc,
        left = peer.bytes_left,
        seeder = peer.is_seeder(),
        event = ?peer.event,
        "Processing announce"
    );

    let swarm = state.storage.read(&peer.info_hash).await.map_err(|e| {
        error!(info_hash = %peer.info_hash, stage = "read", error = %e, "Failed to read peers");
        AnnounceError::Storage { stage: "read", source: e }
    })?;

    state.storage.update(&peer).await.map_err(|e| {
        error!(
            info_hash = %peer.info_hash,
            peer_id = %peer.peer_id,
            stage = "update",
            error = %e,
            "Failed to update peer"
        );
        AnnounceError::Storage { stage: "update", source: e }
    })?;

    if let Some(event) = peer.event {
        info!(
            info_hash = %peer.info_hash,
            peer_id = %peer.peer_id,
            event = event.as_str(),
            "Peer lifecycle event"
        );
    }

    let swarm_size = swarm.len();
    let handout = state.policy.select(&peer, swarm);

    debug!(
        info_hash = %peer.info_hash,
        swarm_size,
        peers_returned = handout.peers.len(),
        priority = state.policy.priority_name(),
        sampling = state.policy.sampling_name(),
        "Building announce response"
    );

    Ok(AnnouncerResponse::from(&handout).encode())
}
