//! Translatable UI content served to library-node frontends.

use serde::{Deserialize, Serialize};

/// A language available for translated content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    /// ISO 639-1 code (unique, e.g. "en").
    pub code: String,
    /// Human-readable name (e.g. "English").
    pub name: String,
}

/// A single translated string, keyed by locale and translation key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    /// Locale the translation belongs to (a `Language` code).
    pub locale: String,
    /// Translation key (unique within a locale).
    pub key: String,
    /// Translated content.
    pub content: String,
}
