//! Directory entries and this node's own library identity.

use serde::{Deserialize, Serialize};

/// How long after the last heartbeat a library still counts as active,
/// in seconds. The comparison is strict: a heartbeat exactly this old
/// is already inactive.
pub const HEARTBEAT_WINDOW_SECS: u64 = 3600;

/// A library registered in this hub's directory.
///
/// Entries are self-reported by the libraries themselves and are never
/// evicted; liveness is derived from `last_heartbeat` at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredLibrary {
    /// Unique registration ID.
    pub id: u64,
    /// Display name of the library.
    pub name: String,
    /// Library-node address (unique; registering it again refreshes the entry).
    pub url: String,
    /// Free-form capability/topic tags.
    pub tags: Vec<String>,
    /// Optional description.
    pub description: Option<String>,
    /// When the library last checked in (Unix timestamp).
    pub last_heartbeat: u64,
    /// When the entry was first created (Unix timestamp).
    pub created_at: u64,
}

impl RegisteredLibrary {
    /// Create an entry with an explicit clock reading.
    pub fn new_at(
        id: u64,
        name: String,
        url: String,
        tags: Vec<String>,
        description: Option<String>,
        now: u64,
    ) -> Self {
        Self {
            id,
            name,
            url,
            tags,
            description,
            last_heartbeat: now,
            created_at: now,
        }
    }

    /// Whether the library counts as active at the given clock reading.
    pub fn is_active_at(&self, now: u64) -> bool {
        now.saturating_sub(self.last_heartbeat) < HEARTBEAT_WINDOW_SECS
    }

    /// Whether the library counts as active right now.
    pub fn is_active(&self) -> bool {
        self.is_active_at(crate::unix_now())
    }
}

/// This node's own display identity, announced to peers and shown on
/// the home endpoint. Read from configuration; the protocol core only
/// ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryIdentity {
    /// Display name of this library.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

impl LibraryIdentity {
    /// Create a new identity.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }
}
