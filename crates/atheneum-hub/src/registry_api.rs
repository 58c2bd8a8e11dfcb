//! Directory registry API endpoints.
//!
//! Libraries announce themselves under `/api/registry` and keep their
//! entry alive with heartbeats. Consumers look the directory up through
//! `/api/registry/search` (free-text) and `/api/discovery/peers`
//! (tag-filtered, active entries only).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use atheneum_types::RegisteredLibrary;

use crate::api::{ApiError, AppState};
use crate::observability::METRICS;
use crate::validation::{error_message, validate_address, validate_library_name, validate_tags};

/// Routes for library registration and directory lookup.
pub fn registry_routes() -> Router<AppState> {
    Router::new()
        .route("/api/registry/register", post(register_library))
        .route("/api/registry/heartbeat", post(record_heartbeat))
        .route("/api/registry/search", get(search_registry))
        .route("/api/discovery/peers", get(discover_peers))
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub library_name: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub library_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub message: String,
}

/// A directory entry as returned by free-text search.
#[derive(Debug, Serialize)]
pub struct SearchEntry {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl From<&RegisteredLibrary> for SearchEntry {
    fn from(lib: &RegisteredLibrary) -> Self {
        Self {
            name: lib.name.clone(),
            url: lib.url.clone(),
            description: lib.description.clone(),
            tags: lib.tags.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResultsResponse {
    pub results: Vec<SearchEntry>,
}

/// A directory entry as returned by tag discovery.
#[derive(Debug, Serialize)]
pub struct DiscoveryEntry {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub tags: Vec<String>,
    pub description: Option<String>,
}

impl From<&RegisteredLibrary> for DiscoveryEntry {
    fn from(lib: &RegisteredLibrary) -> Self {
        Self {
            id: lib.id,
            name: lib.name.clone(),
            url: lib.url.clone(),
            tags: lib.tags.clone(),
            description: lib.description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub peers: Vec<DiscoveryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DiscoveryQuery {
    /// Comma-separated tag filter, e.g. `?tags=science,research`.
    pub tags: Option<String>,
    pub limit: Option<usize>,
}

/// Default result cap for directory lookups.
const LOOKUP_LIMIT: usize = 10;

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/registry/register - announce a library to the directory.
async fn register_library(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let name = req
        .library_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing required fields".to_string()))?;
    let url = req
        .url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing required fields".to_string()))?;

    validate_library_name(name).map_err(|e| ApiError::Validation(error_message(&e)))?;
    validate_address(url).map_err(|e| ApiError::Validation(error_message(&e)))?;
    validate_tags(&req.tags).map_err(|e| ApiError::Validation(error_message(&e)))?;

    let library = state.registry.register(
        name.to_string(),
        url.to_string(),
        req.tags,
        req.description,
    );
    METRICS.set_libraries_total(state.registry.len());
    tracing::info!(library_id = library.id, url = %library.url, "library registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Library registered successfully".to_string(),
            library_id: library.id,
        }),
    ))
}

/// POST /api/registry/heartbeat - keep a directory entry alive.
async fn record_heartbeat(
    State(state): State<AppState>,
    Json(req): Json<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, ApiError> {
    let url = req
        .url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing URL".to_string()))?;

    let library = state
        .registry
        .heartbeat(url)
        .map_err(|_| ApiError::NotFound("Library not found".to_string()))?;
    tracing::debug!(library_id = library.id, "heartbeat recorded");

    Ok(Json(HeartbeatResponse {
        message: "Heartbeat updated".to_string(),
    }))
}

/// GET /api/registry/search - free-text search over active entries.
async fn search_registry(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchResultsResponse> {
    let query = params.q.unwrap_or_default();
    let limit = params.limit.unwrap_or(LOOKUP_LIMIT);
    let results = state
        .registry
        .search(&query, limit)
        .iter()
        .map(SearchEntry::from)
        .collect();
    Json(SearchResultsResponse { results })
}

/// GET /api/discovery/peers - tag-filtered discovery of active libraries.
async fn discover_peers(
    State(state): State<AppState>,
    Query(params): Query<DiscoveryQuery>,
) -> Json<DiscoveryResponse> {
    let tags = parse_tags(params.tags.as_deref());
    let limit = params.limit.unwrap_or(LOOKUP_LIMIT);
    let peers = state
        .registry
        .query(&tags, limit)
        .iter()
        .map(DiscoveryEntry::from)
        .collect();
    Json(DiscoveryResponse { peers })
}

/// Split a comma-separated tag list, dropping blanks.
fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
    .unwrap_or_default()
}
