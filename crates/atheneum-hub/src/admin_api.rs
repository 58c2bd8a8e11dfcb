//! Admin API endpoints.
//!
//! Operator-facing view of the directory: registry totals and the full
//! entry list with per-entry liveness.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use atheneum_types::RegisteredLibrary;

use crate::api::AppState;

/// Routes for the operator dashboard.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/dashboard", get(dashboard))
}

/// A directory entry with liveness, as shown on the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardEntry {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub active: bool,
    pub last_heartbeat: u64,
}

impl From<&RegisteredLibrary> for DashboardEntry {
    fn from(lib: &RegisteredLibrary) -> Self {
        Self {
            id: lib.id,
            name: lib.name.clone(),
            url: lib.url.clone(),
            tags: lib.tags.clone(),
            description: lib.description.clone(),
            active: lib.is_active(),
            last_heartbeat: lib.last_heartbeat,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_libraries: usize,
    pub active_libraries: usize,
    pub libraries: Vec<DashboardEntry>,
}

/// GET /admin/dashboard - registry totals and the full entry list.
async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let libraries: Vec<DashboardEntry> = state
        .registry
        .list_all()
        .iter()
        .map(DashboardEntry::from)
        .collect();

    Json(DashboardResponse {
        total_libraries: state.registry.len(),
        active_libraries: state.registry.count_active(),
        libraries,
    })
}
