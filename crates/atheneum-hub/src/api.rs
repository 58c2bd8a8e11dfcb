//! HTTP API for the Atheneum hub.
//!
//! Wires the handshake coordinator, directory registry and content
//! store into one axum router. Endpoint groups live in their own
//! modules and share [`AppState`] and [`ApiError`].

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use atheneum_peering::{
    Coordinator, Discovery, DirectoryCandidate, DirectoryLookup, HandshakeError, HttpRelay,
    HubProfile, Notifier,
};
use atheneum_store::{ContentStore, DirectoryRegistry, PeerStore};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::HubConfig;
use crate::health::{health_routes, HealthState};
use crate::observability::{middleware, MeteredNotifier};
use crate::tickets::{TicketClient, TicketError};
use crate::{admin_api, content_api, feedback_api, peers_api, registry_api};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Hub configuration.
    pub config: Arc<HubConfig>,
    /// Peer relationship store.
    pub peers: Arc<PeerStore>,
    /// Library directory registry.
    pub registry: Arc<DirectoryRegistry>,
    /// Languages and translations.
    pub content: Arc<ContentStore>,
    /// Handshake coordinator.
    pub coordinator: Arc<Coordinator>,
    /// Merged peer/directory search.
    pub discovery: Arc<Discovery>,
    /// Issue-tracker client for feedback.
    pub tickets: Arc<TicketClient>,
    /// Probe state.
    pub health: HealthState,
}

impl AppState {
    /// Build the production state: a metered HTTP relay for outbound
    /// notifications, discovery backed by the hub's own directory.
    pub fn from_config(config: HubConfig) -> anyhow::Result<Self> {
        let netmap = Arc::new(config.netmap());
        let relay = HttpRelay::new(netmap, config.relay_timeout())?;
        let notifier: Arc<dyn Notifier> = Arc::new(MeteredNotifier::new(Arc::new(relay)));
        let state = Self::with_notifier(config, notifier)?;
        state.health.set_relay_ready(true);
        Ok(state)
    }

    /// Build state around a caller-supplied notifier. Lets tests swap
    /// the relay out without touching the rest of the wiring.
    pub fn with_notifier(config: HubConfig, notifier: Arc<dyn Notifier>) -> anyhow::Result<Self> {
        let netmap = Arc::new(config.netmap());
        let peers = Arc::new(PeerStore::new());
        let registry = Arc::new(DirectoryRegistry::new());
        let content = Arc::new(ContentStore::new());

        let profile = HubProfile::new(
            config.identity(),
            config.public_url.clone(),
            config.library_endpoint(&netmap),
        );
        let coordinator = Arc::new(Coordinator::new(
            Arc::clone(&peers),
            Arc::clone(&netmap),
            profile,
            notifier,
        ));

        let lookup = Arc::new(RegistryLookup {
            registry: Arc::clone(&registry),
        });
        let discovery = Arc::new(Discovery::new(Arc::clone(&peers), lookup));

        let tickets = Arc::new(TicketClient::new(config.tickets.clone())?);

        Ok(Self {
            config: Arc::new(config),
            peers,
            registry,
            content,
            coordinator,
            discovery,
            tickets,
            health: HealthState::new(),
        })
    }
}

/// Serves discovery searches from the hub's own directory.
struct RegistryLookup {
    registry: Arc<DirectoryRegistry>,
}

#[async_trait]
impl DirectoryLookup for RegistryLookup {
    async fn find(&self, query: &str, limit: usize) -> Vec<DirectoryCandidate> {
        self.registry
            .search(query, limit)
            .into_iter()
            .map(|lib| DirectoryCandidate {
                name: lib.name,
                url: lib.url,
            })
            .collect()
    }
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
}

impl From<HandshakeError> for ApiError {
    fn from(err: HandshakeError) -> Self {
        match err {
            HandshakeError::PeerNotFound(_) => ApiError::NotFound("Peer not found".to_string()),
            HandshakeError::InvalidTransition { from, to } => {
                ApiError::Validation(format!("Invalid status transition: {from} -> {to}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::NotConfigured => {
                ApiError::Unavailable("Feedback system is not configured".to_string())
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Home and operational endpoints
        .route("/", get(home))
        .route("/metrics", get(middleware::metrics_handler))
        .merge(health_routes(state.health.clone()))
        // API endpoint groups
        .merge(peers_api::peer_routes())
        .merge(registry_api::registry_routes())
        .merge(content_api::content_routes())
        .merge(feedback_api::feedback_routes())
        .merge(admin_api::admin_routes())
        .layer(axum::middleware::from_fn(middleware::metrics_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Home endpoint: who this hub is and where its endpoints live.
async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let description = state
        .config
        .description
        .clone()
        .unwrap_or_else(|| "Directory and coordination hub for the Atheneum network".to_string());

    Json(serde_json::json!({
        "name": state.config.node_name,
        "version": env!("CARGO_PKG_VERSION"),
        "description": description,
        "endpoints": {
            "GET /api/peers": "List active and pending peers",
            "GET /api/peers/search": "Search peers and the directory by name",
            "POST /api/peers/connect": "Start a connection to a library",
            "GET /api/peers/requests": "List pending connection requests",
            "POST /api/registry/register": "Register a library in the directory",
            "POST /api/registry/heartbeat": "Refresh a library's liveness",
            "GET /api/registry/search": "Search the directory",
            "GET /api/discovery/peers": "Find active libraries by tags",
            "GET /api/languages": "List configured languages",
            "GET /health": "Health check",
            "GET /metrics": "Prometheus metrics",
        },
        "documentation": "https://github.com/atheneum-net/atheneum",
    }))
}
