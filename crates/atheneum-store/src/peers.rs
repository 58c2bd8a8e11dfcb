//! In-memory peer store.

use crate::error::{Result, StoreError};
use atheneum_types::{Direction, Peer, PeerStatus};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe in-memory store for peer records.
///
/// This is a pure persistence boundary: it enforces address uniqueness
/// and serializes row-level writes, but knows nothing about which status
/// transitions are legal or who gets notified. That policy lives in the
/// handshake coordinator.
///
/// Lock order where both locks are taken: `url_index` before `peers`.
#[derive(Debug, Default)]
pub struct PeerStore {
    /// Next available ID for new peers.
    next_id: AtomicU64,

    /// Peers by ID.
    peers: RwLock<HashMap<u64, Peer>>,

    /// Canonical address to ID mapping.
    url_index: RwLock<HashMap<String, u64>>,
}

impl PeerStore {
    /// Create a new empty peer store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a new unique ID.
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Create a new peer.
    ///
    /// The uniqueness check and the insert happen under one write lock,
    /// so two concurrent creates with the same address produce exactly
    /// one record; the loser gets [`StoreError::DuplicateAddress`] and
    /// can look up the winner.
    ///
    /// The address is stored exactly as given; callers normalize first.
    pub fn create(
        &self,
        name: String,
        url: String,
        direction: Direction,
        status: PeerStatus,
    ) -> Result<Peer> {
        let mut index = self.url_index.write();
        if index.contains_key(&url) {
            return Err(StoreError::DuplicateAddress(url));
        }

        let id = self.next_id();
        let peer = Peer::new(id, name, url.clone(), direction, status);

        self.peers.write().insert(id, peer.clone());
        index.insert(url, id);

        Ok(peer)
    }

    /// Get a peer by ID.
    pub fn find_by_id(&self, id: u64) -> Option<Peer> {
        self.peers.read().get(&id).cloned()
    }

    /// Get a peer by exact address. Normalization is the caller's job.
    pub fn find_by_url(&self, url: &str) -> Option<Peer> {
        let id = self.url_index.read().get(url).copied()?;
        self.find_by_id(id)
    }

    /// List peers whose status is one of the given set, ordered by name
    /// ascending (case-insensitive, ID as tie-breaker).
    pub fn list_by_status(&self, statuses: &[PeerStatus]) -> Vec<Peer> {
        let mut peers: Vec<Peer> = self
            .peers
            .read()
            .values()
            .filter(|p| statuses.contains(&p.status))
            .cloned()
            .collect();
        peers.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        peers
    }

    /// List pending peers, newest first (creation time descending, ID
    /// descending as tie-breaker within one second).
    pub fn list_pending(&self) -> Vec<Peer> {
        let mut peers: Vec<Peer> = self
            .peers
            .read()
            .values()
            .filter(|p| p.status == PeerStatus::Pending)
            .cloned()
            .collect();
        peers.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.cmp(&a.id))
        });
        peers
    }

    /// List all peers, ordered by ID.
    pub fn list_all(&self) -> Vec<Peer> {
        let mut peers: Vec<Peer> = self.peers.read().values().cloned().collect();
        peers.sort_by_key(|p| p.id);
        peers
    }

    /// Write back a modified record.
    ///
    /// Only `name` and `status` are taken from the given record; the
    /// stored `url`, `direction` and `created_at` are immutable and kept
    /// as they are (which also keeps the address index consistent).
    pub fn update(&self, peer: &Peer) -> Result<Peer> {
        let mut peers = self.peers.write();
        let stored = peers
            .get_mut(&peer.id)
            .ok_or_else(|| StoreError::NotFound(format!("peer {}", peer.id)))?;

        stored.name = peer.name.clone();
        stored.status = peer.status;

        Ok(stored.clone())
    }

    /// Conditionally move a peer from one status to another.
    ///
    /// The read and the write happen under one row-scoped write lock:
    /// of two racing callers, exactly one wins and the other observes
    /// [`StoreError::StatusConflict`] with the winner's status.
    pub fn update_status(&self, id: u64, from: PeerStatus, to: PeerStatus) -> Result<Peer> {
        let mut peers = self.peers.write();
        let stored = peers
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("peer {}", id)))?;

        if stored.status != from {
            return Err(StoreError::StatusConflict {
                expected: from,
                actual: stored.status,
            });
        }

        stored.status = to;
        Ok(stored.clone())
    }

    /// Delete a peer in any status.
    pub fn delete(&self, id: u64) -> Result<()> {
        let mut index = self.url_index.write();
        let mut peers = self.peers.write();
        let peer = peers
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("peer {}", id)))?;
        index.remove(&peer.url);
        Ok(())
    }

    /// Number of stored peers.
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store_with_peer(status: PeerStatus) -> (PeerStore, Peer) {
        let store = PeerStore::new();
        let peer = store
            .create(
                "Lib B".into(),
                "http://library-b:8000".into(),
                Direction::Outgoing,
                status,
            )
            .unwrap();
        (store, peer)
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let store = PeerStore::new();
        let a = store
            .create("A".into(), "http://a".into(), Direction::Outgoing, PeerStatus::Pending)
            .unwrap();
        let b = store
            .create("B".into(), "http://b".into(), Direction::Incoming, PeerStatus::Pending)
            .unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn test_duplicate_address_is_rejected() {
        let (store, peer) = store_with_peer(PeerStatus::Pending);
        let err = store
            .create(
                "Other name".into(),
                peer.url.clone(),
                Direction::Incoming,
                PeerStatus::Pending,
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateAddress(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_find_by_url_is_exact() {
        let (store, peer) = store_with_peer(PeerStatus::Pending);
        assert!(store.find_by_url(&peer.url).is_some());
        assert!(store.find_by_url("http://library-b:8000/").is_none());
        assert!(store.find_by_url("http://LIBRARY-B:8000").is_none());
    }

    #[test]
    fn test_list_by_status_orders_by_name() {
        let store = PeerStore::new();
        for (name, url, status) in [
            ("central library", "http://c", PeerStatus::Active),
            ("Archive", "http://a", PeerStatus::Active),
            ("Branch", "http://b", PeerStatus::Pending),
            ("rejected one", "http://r", PeerStatus::Rejected),
        ] {
            store
                .create(name.into(), url.into(), Direction::Outgoing, status)
                .unwrap();
        }

        let listed = store.list_by_status(&[PeerStatus::Active, PeerStatus::Pending]);
        let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Archive", "Branch", "central library"]);
    }

    #[test]
    fn test_list_pending_is_newest_first() {
        let store = PeerStore::new();
        for (name, url) in [("First", "http://1"), ("Second", "http://2"), ("Third", "http://3")] {
            store
                .create(name.into(), url.into(), Direction::Incoming, PeerStatus::Pending)
                .unwrap();
        }
        store
            .create("Done".into(), "http://4".into(), Direction::Incoming, PeerStatus::Active)
            .unwrap();

        let pending = store.list_pending();
        let names: Vec<&str> = pending.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[test]
    fn test_update_keeps_url_and_direction() {
        let (store, mut peer) = store_with_peer(PeerStatus::Pending);
        peer.name = "Renamed".into();
        peer.url = "http://somewhere-else".into();
        peer.status = PeerStatus::Active;

        let updated = store.update(&peer).unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.status, PeerStatus::Active);
        assert_eq!(updated.url, "http://library-b:8000");
        assert!(store.find_by_url("http://library-b:8000").is_some());
        assert!(store.find_by_url("http://somewhere-else").is_none());
    }

    #[test]
    fn test_update_status_requires_expected_current() {
        let (store, peer) = store_with_peer(PeerStatus::Pending);

        let active = store
            .update_status(peer.id, PeerStatus::Pending, PeerStatus::Active)
            .unwrap();
        assert_eq!(active.status, PeerStatus::Active);

        let err = store
            .update_status(peer.id, PeerStatus::Pending, PeerStatus::Rejected)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::StatusConflict {
                actual: PeerStatus::Active,
                ..
            }
        ));
        assert_eq!(store.find_by_id(peer.id).unwrap().status, PeerStatus::Active);
    }

    #[test]
    fn test_update_status_unknown_peer() {
        let store = PeerStore::new();
        let err = store
            .update_status(99, PeerStatus::Pending, PeerStatus::Active)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_delete_frees_the_address() {
        let (store, peer) = store_with_peer(PeerStatus::Active);
        store.delete(peer.id).unwrap();
        assert!(store.find_by_id(peer.id).is_none());

        // The address can be reused for a fresh handshake.
        let recreated = store
            .create("Lib B".into(), peer.url.clone(), Direction::Outgoing, PeerStatus::Pending)
            .unwrap();
        assert_ne!(recreated.id, peer.id);
    }

    #[test]
    fn test_delete_unknown_peer() {
        let store = PeerStore::new();
        assert!(matches!(store.delete(7), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_concurrent_creates_with_same_url_yield_one_record() {
        let store = Arc::new(PeerStore::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.create(
                    format!("Racer {i}"),
                    "http://library-b:8000".into(),
                    Direction::Outgoing,
                    PeerStatus::Pending,
                )
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
        for r in results {
            if let Err(err) = r {
                assert!(matches!(err, StoreError::DuplicateAddress(_)));
            }
        }
    }

    #[test]
    fn test_concurrent_activation_has_one_winner() {
        let (store, peer) = store_with_peer(PeerStatus::Pending);
        let store = Arc::new(store);
        let id = peer.id;

        let mut handles = Vec::new();
        for to in [PeerStatus::Active, PeerStatus::Rejected] {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.update_status(id, PeerStatus::Pending, to)
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
        assert!(store.find_by_id(id).unwrap().status.is_terminal());
    }
}
