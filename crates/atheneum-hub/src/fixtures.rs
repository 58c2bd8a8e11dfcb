//! Demo seed data for local development.
//!
//! Populates the in-memory stores with a small but representative data
//! set so a freshly started hub has something to serve. Enabled with
//! `atheneum-hub serve --seed-demo`.

use crate::api::AppState;
use crate::observability::METRICS;

/// Seed the registry and content stores with demo data.
pub fn seed_demo(state: &AppState) {
    state.registry.register(
        "Alexandria Branch".to_string(),
        "http://library-a:8000".to_string(),
        vec!["public".to_string(), "main".to_string()],
        Some("General-interest demo library".to_string()),
    );
    state.registry.register(
        "Bodleian Annex".to_string(),
        "http://library-b:8000".to_string(),
        vec!["science".to_string(), "research".to_string()],
        Some("Research-focused demo library".to_string()),
    );
    METRICS.set_libraries_total(state.registry.len());

    state.content.set_language("en", "English");
    state.content.set_language("fr", "French");

    state
        .content
        .set_translation("en", "app.welcome", "Welcome to the library network");
    state
        .content
        .set_translation("en", "app.search.placeholder", "Search the catalogue");
    state
        .content
        .set_translation("fr", "app.welcome", "Bienvenue sur le réseau des bibliothèques");
    state
        .content
        .set_translation("fr", "app.search.placeholder", "Rechercher dans le catalogue");

    tracing::info!(
        libraries = state.registry.len(),
        languages = state.content.languages().len(),
        "demo data seeded"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use atheneum_peering::NullNotifier;
    use std::sync::Arc;

    #[test]
    fn test_seed_demo_populates_stores() {
        let state = AppState::with_notifier(HubConfig::default(), Arc::new(NullNotifier))
            .expect("state builds");
        seed_demo(&state);

        assert_eq!(state.registry.len(), 2);
        assert_eq!(state.registry.count_active(), 2);
        assert_eq!(state.content.languages().len(), 2);
        assert_eq!(
            state.content.translations_for("en").get("app.welcome"),
            Some(&"Welcome to the library network".to_string())
        );
        assert!(state.content.translations_for("de").is_empty());

        // Seeding twice refreshes rather than duplicates.
        seed_demo(&state);
        assert_eq!(state.registry.len(), 2);
    }
}
