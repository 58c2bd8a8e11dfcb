//! Liveness and readiness probes.
//!
//! Three endpoints shaped for orchestrator probes:
//!
//! - `/health/live` answers 200 for as long as the process runs.
//! - `/health/ready` answers 503 until the hub is serving traffic.
//! - `/health` combines readiness with version, uptime and per-component
//!   checks.
//!
//! The serve loop flips readiness after binding its listener; test
//! routers flip it themselves.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Probe verdict for the hub or one of its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Working.
    Up,
    /// Not working.
    Down,
    /// Never brought up, so there is nothing to report.
    Unknown,
}

/// Health of a single component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    /// Component verdict.
    pub status: HealthStatus,
    /// Free-form details, usually a reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ComponentHealth {
    /// A working component.
    pub fn up() -> Self {
        Self {
            status: HealthStatus::Up,
            details: None,
        }
    }

    /// A component that was never brought up.
    pub fn unknown_with_reason(reason: &str) -> Self {
        Self {
            status: HealthStatus::Unknown,
            details: Some(serde_json::json!({ "reason": reason })),
        }
    }
}

/// Body of `/health/live`.
#[derive(Debug, Clone, Serialize)]
pub struct LivenessResponse {
    /// Always `up` while the process can answer at all.
    pub status: HealthStatus,
    /// Seconds since the hub started.
    pub uptime_seconds: u64,
}

/// Body of `/health/ready`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// Whether the hub accepts traffic.
    pub status: HealthStatus,
    /// Per-component breakdown.
    pub checks: ReadinessChecks,
}

/// The components readiness reports on.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessChecks {
    /// Outbound notification relay.
    pub relay: ComponentHealth,
}

/// Body of `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Whether the hub accepts traffic.
    pub status: HealthStatus,
    /// Hub version.
    pub version: String,
    /// Seconds since the hub started.
    pub uptime_seconds: u64,
    /// Per-component breakdown.
    pub checks: ReadinessChecks,
}

/// Shared probe state.
///
/// Cheap to clone; all clones observe the same flags.
#[derive(Clone)]
pub struct HealthState {
    start_time: Instant,
    ready: Arc<AtomicBool>,
    relay_ready: Arc<AtomicBool>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Fresh state: not ready, relay not brought up.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            ready: Arc::new(AtomicBool::new(false)),
            relay_ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Seconds since the hub started.
    pub fn uptime(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Flip overall readiness.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Whether the hub accepts traffic.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Record that the outbound relay was brought up.
    pub fn set_relay_ready(&self, ready: bool) {
        self.relay_ready.store(ready, Ordering::SeqCst);
    }

    fn overall(&self) -> HealthStatus {
        if self.is_ready() {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        }
    }

    fn relay_health(&self) -> ComponentHealth {
        if self.relay_ready.load(Ordering::SeqCst) {
            ComponentHealth::up()
        } else {
            // Stays unknown on routers wired to a null notifier.
            ComponentHealth::unknown_with_reason("relay not brought up")
        }
    }

    fn readiness_checks(&self) -> ReadinessChecks {
        ReadinessChecks {
            relay: self.relay_health(),
        }
    }
}

/// Routes for the three probe endpoints.
pub fn health_routes<S>(state: HealthState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .with_state(state)
}

/// 200 for an up verdict, 503 for anything else.
fn probe_response<T: Serialize>(status: HealthStatus, body: T) -> Response {
    let code = match status {
        HealthStatus::Up => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(body)).into_response()
}

async fn health_handler(State(state): State<HealthState>) -> Response {
    let status = state.overall();
    probe_response(
        status,
        HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.uptime(),
            checks: state.readiness_checks(),
        },
    )
}

async fn liveness_handler(State(state): State<HealthState>) -> Response {
    probe_response(
        HealthStatus::Up,
        LivenessResponse {
            status: HealthStatus::Up,
            uptime_seconds: state.uptime(),
        },
    )
}

async fn readiness_handler(State(state): State<HealthState>) -> Response {
    let status = state.overall();
    probe_response(
        status,
        ReadinessResponse {
            status,
            checks: state.readiness_checks(),
        },
    )
}
