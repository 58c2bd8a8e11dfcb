//! Peer connection API endpoints.
//!
//! Everything under `/api/peers`: listing relationships, the outgoing and
//! incoming sides of the connection handshake, status decisions, and the
//! merged peer/directory search. Mutating endpoints delegate to the
//! handshake coordinator so state transitions and remote notification
//! stay in one place.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use atheneum_peering::SearchHit;
use atheneum_types::{Peer, PeerStatus};

use crate::api::{ApiError, AppState};
use crate::observability::METRICS;
use crate::validation::{error_message, validate_address, validate_library_name};

/// Routes for peer relationship management.
pub fn peer_routes() -> Router<AppState> {
    Router::new()
        .route("/api/peers", get(list_peers))
        .route("/api/peers/search", get(search_peers))
        .route("/api/peers/requests", get(list_requests))
        .route("/api/peers/connect", post(connect_peer))
        .route("/api/peers/receive_connection", post(receive_connection))
        .route(
            "/api/peers/receive_status_update",
            post(receive_status_update),
        )
        .route("/api/peers/{id}/status", put(update_peer_status))
        .route("/api/peers/{id}", delete(remove_peer))
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

/// A peer relationship as exposed over the API.
#[derive(Debug, Serialize)]
pub struct PeerResponse {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub status: String,
}

impl From<&Peer> for PeerResponse {
    fn from(peer: &Peer) -> Self {
        Self {
            id: peer.id,
            name: peer.name.clone(),
            url: peer.url.clone(),
            status: peer.status.to_string(),
        }
    }
}

/// A pending connection request awaiting a decision.
#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub direction: String,
    pub created_at: u64,
}

impl From<&Peer> for RequestResponse {
    fn from(peer: &Peer) -> Self {
        Self {
            id: peer.id,
            name: peer.name.clone(),
            url: peer.url.clone(),
            direction: peer.direction.to_string(),
            created_at: peer.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PeerListResponse {
    pub data: Vec<PeerResponse>,
}

#[derive(Debug, Serialize)]
pub struct RequestListResponse {
    pub requests: Vec<RequestResponse>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub data: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub message: String,
    pub peer_id: u64,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusNoticeRequest {
    pub url: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdatedResponse {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

/// Default result cap for peer search.
const SEARCH_LIMIT: usize = 10;

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/peers - list active and pending peers, name ascending.
async fn list_peers(State(state): State<AppState>) -> Json<PeerListResponse> {
    let peers = state
        .peers
        .list_by_status(&[PeerStatus::Active, PeerStatus::Pending]);
    Json(PeerListResponse {
        data: peers.iter().map(PeerResponse::from).collect(),
    })
}

/// GET /api/peers/search - merged search over local peers and the directory.
async fn search_peers(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let query = params.q.unwrap_or_default();
    let limit = params.limit.unwrap_or(SEARCH_LIMIT);
    let data = state.discovery.search(&query, limit).await;
    Json(SearchResponse { data })
}

/// GET /api/peers/requests - pending connection requests, both directions.
async fn list_requests(State(state): State<AppState>) -> Json<RequestListResponse> {
    let pending = state.peers.list_pending();
    Json(RequestListResponse {
        requests: pending.iter().map(RequestResponse::from).collect(),
    })
}

/// POST /api/peers/connect - start an outgoing connection handshake.
async fn connect_peer(
    State(state): State<AppState>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let (name, url) = required_fields(req.name, req.url)?;
    validate_library_name(&name).map_err(|e| ApiError::Validation(error_message(&e)))?;
    validate_address(&url).map_err(|e| ApiError::Validation(error_message(&e)))?;

    let (peer, created) = state.coordinator.request_connection(&name, &url).await?;
    METRICS.set_peers_total(state.peers.len());

    let message = if created {
        tracing::info!(peer_id = peer.id, url = %peer.url, "connection request sent");
        "Connection request sent"
    } else {
        "Peer already exists"
    };
    Ok(Json(ConnectResponse {
        message: message.to_string(),
        peer_id: peer.id,
        status: peer.status.to_string(),
    }))
}

/// POST /api/peers/receive_connection - accept an incoming handshake open.
async fn receive_connection(
    State(state): State<AppState>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let (name, url) = required_fields(req.name, req.url)?;
    validate_library_name(&name).map_err(|e| ApiError::Validation(error_message(&e)))?;
    validate_address(&url).map_err(|e| ApiError::Validation(error_message(&e)))?;

    let (peer, created) = state.coordinator.receive_connection(&name, &url)?;
    METRICS.set_peers_total(state.peers.len());

    let message = if created {
        tracing::info!(peer_id = peer.id, url = %peer.url, "connection request received");
        "Connection request received"
    } else {
        "Peer already exists"
    };
    Ok(Json(ConnectResponse {
        message: message.to_string(),
        peer_id: peer.id,
        status: peer.status.to_string(),
    }))
}

/// POST /api/peers/receive_status_update - mirror a decision made remotely.
async fn receive_status_update(
    State(state): State<AppState>,
    Json(req): Json<StatusNoticeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let url = req
        .url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing required fields".to_string()))?;
    let status = req
        .status
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Missing required fields".to_string()))?;
    let status = PeerStatus::from_str(status)
        .ok_or_else(|| ApiError::Validation("Invalid status".to_string()))?;

    let peer = state.coordinator.receive_status_update(url, status)?;
    tracing::info!(peer_id = peer.id, status = %peer.status, "peer status mirrored");
    Ok(Json(MessageResponse {
        message: "Status updated".to_string(),
    }))
}

/// PUT /api/peers/{id}/status - decide a pending request (activate or reject).
async fn update_peer_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<StatusUpdatedResponse>, ApiError> {
    let status = req
        .status
        .as_deref()
        .and_then(PeerStatus::from_str)
        .filter(|s| matches!(s, PeerStatus::Active | PeerStatus::Rejected))
        .ok_or_else(|| ApiError::Validation("Invalid status".to_string()))?;

    let peer = state.coordinator.set_status(id, status).await?;
    tracing::info!(peer_id = peer.id, status = %peer.status, "peer status updated");
    Ok(Json(StatusUpdatedResponse {
        message: "Status updated".to_string(),
        status: peer.status.to_string(),
    }))
}

/// DELETE /api/peers/{id} - remove a peer relationship without notice.
async fn remove_peer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.coordinator.remove_peer(id)?;
    METRICS.set_peers_total(state.peers.len());
    tracing::info!(peer_id = id, "peer removed");
    Ok(Json(MessageResponse {
        message: "Peer removed successfully".to_string(),
    }))
}

/// Both `name` and `url` must be present and non-blank.
fn required_fields(
    name: Option<String>,
    url: Option<String>,
) -> Result<(String, String), ApiError> {
    let name = name.map(|s| s.trim().to_string()).unwrap_or_default();
    let url = url.map(|s| s.trim().to_string()).unwrap_or_default();
    if name.is_empty() || url.is_empty() {
        return Err(ApiError::Validation("Missing required fields".to_string()));
    }
    Ok((name, url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_trims_and_rejects_blank() {
        let ok = required_fields(Some("  Lib  ".to_string()), Some(" http://a ".to_string()));
        assert_eq!(ok.unwrap(), ("Lib".to_string(), "http://a".to_string()));

        assert!(required_fields(None, Some("http://a".to_string())).is_err());
        assert!(required_fields(Some("Lib".to_string()), None).is_err());
        assert!(required_fields(Some("   ".to_string()), Some("http://a".to_string())).is_err());
    }

    #[test]
    fn test_peer_response_from_peer() {
        let peer = Peer::new_at(
            7,
            "Athena".to_string(),
            "http://athena:8000".to_string(),
            atheneum_types::Direction::Incoming,
            PeerStatus::Pending,
            1_700_000_000,
        );
        let resp = PeerResponse::from(&peer);
        assert_eq!(resp.id, 7);
        assert_eq!(resp.status, "pending");

        let req = RequestResponse::from(&peer);
        assert_eq!(req.direction, "incoming");
        assert_eq!(req.created_at, 1_700_000_000);
    }
}
