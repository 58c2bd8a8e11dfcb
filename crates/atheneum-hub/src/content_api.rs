//! Localized content API endpoints.
//!
//! Serves the language list and per-locale translation maps that
//! library frontends consume. An unknown locale yields an empty map
//! rather than an error so clients can fall back to their defaults.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use atheneum_types::Language;

use crate::api::AppState;

/// Routes for languages and translations.
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/api/languages", get(list_languages))
        .route("/api/translations/{locale}", get(translations_for_locale))
}

/// GET /api/languages - all available languages, code ascending.
async fn list_languages(State(state): State<AppState>) -> Json<Vec<Language>> {
    Json(state.content.languages())
}

/// GET /api/translations/{locale} - flat key/content map for one locale.
async fn translations_for_locale(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> Json<BTreeMap<String, String>> {
    Json(state.content.translations_for(&locale))
}
