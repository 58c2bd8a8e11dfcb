//! Peer search across local state and the optional external directory.

use crate::lookup::DirectoryLookup;
use atheneum_store::PeerStore;
use atheneum_types::PeerStatus;
use serde::Serialize;
use std::sync::Arc;

/// Where a search hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// A peer this hub already knows.
    Local,
    /// A candidate contributed by the external directory.
    Directory,
}

/// One search result.
///
/// Directory candidates are not peers yet, so they carry neither a
/// local ID nor a handshake status.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Local peer ID, when the hit is a known peer.
    pub id: Option<u64>,
    /// Display name.
    pub name: String,
    /// Library-node address.
    pub url: String,
    /// Handshake status, when the hit is a known peer.
    pub status: Option<PeerStatus>,
    /// Which source produced the hit.
    pub source: SearchSource,
}

/// Case-insensitive peer search, local peers first.
pub struct Discovery {
    peers: Arc<PeerStore>,
    directory: Arc<dyn DirectoryLookup>,
}

impl Discovery {
    /// Create a search service over the given peer store and directory.
    pub fn new(peers: Arc<PeerStore>, directory: Arc<dyn DirectoryLookup>) -> Self {
        Self { peers, directory }
    }

    /// Find peers whose name contains `query`, then fill any remaining
    /// room with directory candidates. Blank queries match nothing.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = self
            .peers
            .list_by_status(&[PeerStatus::Pending, PeerStatus::Active, PeerStatus::Rejected])
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .take(limit)
            .map(|p| SearchHit {
                id: Some(p.id),
                name: p.name,
                url: p.url,
                status: Some(p.status),
                source: SearchSource::Local,
            })
            .collect();

        if hits.len() < limit {
            let room = limit - hits.len();
            for candidate in self.directory.find(query, room).await {
                hits.push(SearchHit {
                    id: None,
                    name: candidate.name,
                    url: candidate.url,
                    status: None,
                    source: SearchSource::Directory,
                });
            }
            hits.truncate(limit);
        }

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{DirectoryCandidate, NoDirectory};
    use async_trait::async_trait;
    use atheneum_types::Direction;

    struct FixedDirectory(Vec<DirectoryCandidate>);

    #[async_trait]
    impl DirectoryLookup for FixedDirectory {
        async fn find(&self, query: &str, limit: usize) -> Vec<DirectoryCandidate> {
            let needle = query.to_lowercase();
            self.0
                .iter()
                .filter(|c| c.name.to_lowercase().contains(&needle))
                .take(limit)
                .cloned()
                .collect()
        }
    }

    fn store_with_peers() -> Arc<PeerStore> {
        let store = Arc::new(PeerStore::new());
        for (name, url, status) in [
            ("Central Library", "http://central.local", PeerStatus::Active),
            ("City Archive", "http://archive.local", PeerStatus::Pending),
            ("Village Reading Room", "http://village.local", PeerStatus::Rejected),
        ] {
            store
                .create(name.into(), url.into(), Direction::Outgoing, status)
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_search_matches_names_case_insensitively() {
        let discovery = Discovery::new(store_with_peers(), Arc::new(NoDirectory));

        let hits = discovery.search("LIBRARY", 10).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Central Library");
        assert_eq!(hits[0].source, SearchSource::Local);
        assert_eq!(hits[0].status, Some(PeerStatus::Active));

        assert!(discovery.search("   ", 10).await.is_empty());
        assert!(discovery.search("nothing", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_directory_candidates_come_after_local_hits() {
        let directory = FixedDirectory(vec![
            DirectoryCandidate {
                name: "National Library".into(),
                url: "http://national.example".into(),
            },
            DirectoryCandidate {
                name: "Library Barge".into(),
                url: "http://barge.example".into(),
            },
        ]);
        let discovery = Discovery::new(store_with_peers(), Arc::new(directory));

        let hits = discovery.search("library", 10).await;
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].source, SearchSource::Local);
        assert_eq!(hits[1].name, "National Library");
        assert_eq!(hits[1].id, None);
        assert_eq!(hits[1].status, None);
        assert_eq!(hits[2].name, "Library Barge");
    }

    #[tokio::test]
    async fn test_limit_caps_the_merged_list() {
        let directory = FixedDirectory(vec![DirectoryCandidate {
            name: "National Library".into(),
            url: "http://national.example".into(),
        }]);
        let discovery = Discovery::new(store_with_peers(), Arc::new(directory));

        let hits = discovery.search("library", 1).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, SearchSource::Local);

        assert!(discovery.search("library", 0).await.is_empty());
    }
}
