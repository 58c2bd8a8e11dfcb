//! In-memory store for languages and translated content.

use atheneum_types::{Language, Translation};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Thread-safe store for translatable UI content.
///
/// Both languages and translations are upserts; listings come back in
/// stable sorted order so API responses are deterministic.
#[derive(Debug, Default)]
pub struct ContentStore {
    /// Languages by code.
    languages: RwLock<HashMap<String, Language>>,

    /// Translations by (locale, key).
    translations: RwLock<HashMap<(String, String), Translation>>,
}

impl ContentStore {
    /// Create a new empty content store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a language.
    pub fn set_language(&self, code: impl Into<String>, name: impl Into<String>) -> Language {
        let language = Language {
            code: code.into(),
            name: name.into(),
        };
        self.languages
            .write()
            .insert(language.code.clone(), language.clone());
        language
    }

    /// List all languages, ordered by code.
    pub fn languages(&self) -> Vec<Language> {
        let mut all: Vec<Language> = self.languages.read().values().cloned().collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        all
    }

    /// Add or replace a translation.
    pub fn set_translation(
        &self,
        locale: impl Into<String>,
        key: impl Into<String>,
        content: impl Into<String>,
    ) -> Translation {
        let translation = Translation {
            locale: locale.into(),
            key: key.into(),
            content: content.into(),
        };
        self.translations.write().insert(
            (translation.locale.clone(), translation.key.clone()),
            translation.clone(),
        );
        translation
    }

    /// All translations for a locale as a key → content map.
    ///
    /// Unknown locales yield an empty map, not an error.
    pub fn translations_for(&self, locale: &str) -> BTreeMap<String, String> {
        self.translations
            .read()
            .values()
            .filter(|t| t.locale == locale)
            .map(|t| (t.key.clone(), t.content.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languages_are_upserts_sorted_by_code() {
        let store = ContentStore::new();
        store.set_language("fr", "French");
        store.set_language("en", "English");
        store.set_language("fr", "Français");

        let codes: Vec<(String, String)> = store
            .languages()
            .into_iter()
            .map(|l| (l.code, l.name))
            .collect();
        assert_eq!(
            codes,
            vec![
                ("en".to_string(), "English".to_string()),
                ("fr".to_string(), "Français".to_string()),
            ]
        );
    }

    #[test]
    fn test_translations_scoped_by_locale() {
        let store = ContentStore::new();
        store.set_translation("en", "welcome_title", "Welcome");
        store.set_translation("fr", "welcome_title", "Bienvenue");
        store.set_translation("en", "welcome_title", "Welcome!");

        let en = store.translations_for("en");
        assert_eq!(en.len(), 1);
        assert_eq!(en["welcome_title"], "Welcome!");

        assert!(store.translations_for("de").is_empty());
    }
}
