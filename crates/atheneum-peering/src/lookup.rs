//! Pluggable external directory lookup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A library suggested by an external directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryCandidate {
    /// Display name.
    pub name: String,
    /// Library-node address.
    pub url: String,
}

/// Source of additional search candidates beyond this hub's own peers.
///
/// There is no central directory server today; this seam is where one
/// would plug in. Implementations must be best-effort: return what you
/// have, never an error.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Find up to `limit` candidates matching `query`.
    async fn find(&self, query: &str, limit: usize) -> Vec<DirectoryCandidate>;
}

/// The default lookup: no directory, no candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDirectory;

#[async_trait]
impl DirectoryLookup for NoDirectory {
    async fn find(&self, _query: &str, _limit: usize) -> Vec<DirectoryCandidate> {
        Vec::new()
    }
}
