//! In-memory directory registry.

use crate::error::{Result, StoreError};
use atheneum_types::{unix_now, RegisteredLibrary};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe in-memory registry of self-reported libraries.
///
/// Registration is an upsert keyed by address, heartbeats refresh the
/// liveness clock, and queries derive liveness lazily. Entries are never
/// evicted.
///
/// Every time-sensitive operation has an `_at` variant taking Unix
/// seconds; the plain variants read the wall clock.
///
/// Lock order where both locks are taken: `url_index` before `libraries`.
#[derive(Debug, Default)]
pub struct DirectoryRegistry {
    /// Next available ID for new entries.
    next_id: AtomicU64,

    /// Entries by ID.
    libraries: RwLock<HashMap<u64, RegisteredLibrary>>,

    /// Address to ID mapping.
    url_index: RwLock<HashMap<String, u64>>,
}

impl DirectoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Register a library, or refresh it if the address is already known.
    ///
    /// A re-registration replaces name, tags and description and counts
    /// as a heartbeat. The existence check and the insert happen under
    /// one write lock.
    pub fn register(
        &self,
        name: String,
        url: String,
        tags: Vec<String>,
        description: Option<String>,
    ) -> RegisteredLibrary {
        self.register_at(name, url, tags, description, unix_now())
    }

    /// [`register`](Self::register) with an explicit clock reading.
    pub fn register_at(
        &self,
        name: String,
        url: String,
        tags: Vec<String>,
        description: Option<String>,
        now: u64,
    ) -> RegisteredLibrary {
        let tags: Vec<String> = tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let mut index = self.url_index.write();
        let mut libraries = self.libraries.write();

        if let Some(&id) = index.get(&url) {
            if let Some(entry) = libraries.get_mut(&id) {
                entry.name = name;
                entry.tags = tags;
                entry.description = description;
                entry.last_heartbeat = now;
                return entry.clone();
            }
        }

        let id = self.next_id();
        let entry = RegisteredLibrary::new_at(id, name, url.clone(), tags, description, now);
        libraries.insert(id, entry.clone());
        index.insert(url, id);
        entry
    }

    /// Record a heartbeat for a registered library.
    pub fn heartbeat(&self, url: &str) -> Result<RegisteredLibrary> {
        self.heartbeat_at(url, unix_now())
    }

    /// [`heartbeat`](Self::heartbeat) with an explicit clock reading.
    pub fn heartbeat_at(&self, url: &str, now: u64) -> Result<RegisteredLibrary> {
        let id = self
            .url_index
            .read()
            .get(url)
            .copied()
            .ok_or_else(|| StoreError::NotFound(format!("library '{url}'")))?;

        let mut libraries = self.libraries.write();
        let entry = libraries
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("library '{url}'")))?;
        entry.last_heartbeat = now;
        Ok(entry.clone())
    }

    /// Get an entry by exact address.
    pub fn find_by_url(&self, url: &str) -> Option<RegisteredLibrary> {
        let id = self.url_index.read().get(url).copied()?;
        self.libraries.read().get(&id).cloned()
    }

    /// Query active libraries by tags.
    ///
    /// An empty tag set matches everything; otherwise an entry matches
    /// when its tag set intersects the requested tags. Results keep
    /// registration order (ID ascending) and are capped at `limit`.
    pub fn query(&self, tags: &[String], limit: usize) -> Vec<RegisteredLibrary> {
        self.query_at(tags, limit, unix_now())
    }

    /// [`query`](Self::query) with an explicit clock reading.
    pub fn query_at(&self, tags: &[String], limit: usize, now: u64) -> Vec<RegisteredLibrary> {
        let mut matches: Vec<RegisteredLibrary> = self
            .libraries
            .read()
            .values()
            .filter(|lib| lib.is_active_at(now))
            .filter(|lib| tags.is_empty() || lib.tags.iter().any(|t| tags.contains(t)))
            .cloned()
            .collect();
        matches.sort_by_key(|lib| lib.id);
        matches.truncate(limit);
        matches
    }

    /// Case-insensitive substring search on name and description.
    ///
    /// No liveness filter: this feeds human-facing search, where a
    /// currently-quiet library is still a useful answer.
    pub fn search(&self, query: &str, limit: usize) -> Vec<RegisteredLibrary> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<RegisteredLibrary> = self
            .libraries
            .read()
            .values()
            .filter(|lib| {
                lib.name.to_lowercase().contains(&needle)
                    || lib
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        matches.sort_by_key(|lib| lib.id);
        matches.truncate(limit);
        matches
    }

    /// List every entry, ordered by ID.
    pub fn list_all(&self) -> Vec<RegisteredLibrary> {
        let mut all: Vec<RegisteredLibrary> = self.libraries.read().values().cloned().collect();
        all.sort_by_key(|lib| lib.id);
        all
    }

    /// Number of entries counting as active at the given clock reading.
    pub fn count_active_at(&self, now: u64) -> usize {
        self.libraries
            .read()
            .values()
            .filter(|lib| lib.is_active_at(now))
            .count()
    }

    /// Number of entries counting as active right now.
    pub fn count_active(&self) -> usize {
        self.count_active_at(unix_now())
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.libraries.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.libraries.read().is_empty()
    }
}
