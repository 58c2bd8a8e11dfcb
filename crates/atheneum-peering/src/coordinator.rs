//! The connection handshake coordinator.

use crate::error::{HandshakeError, Result};
use crate::netmap::NetMap;
use crate::relay::{Notification, Notifier, PeerAnnounce, StatusNotice};
use crate::transitions;
use atheneum_store::{PeerStore, StoreError};
use atheneum_types::{Direction, LibraryIdentity, Peer, PeerStatus};
use std::sync::Arc;

/// This hub's own coordinates, announced in outbound notifications.
#[derive(Debug, Clone)]
pub struct HubProfile {
    /// Display identity of the library behind this hub.
    pub identity: LibraryIdentity,
    /// Externally-reachable library-node address other hubs know us by.
    pub public_url: String,
    /// Our own backing library node, target of activation syncs.
    pub library_url: String,
}

impl HubProfile {
    /// Create a profile.
    pub fn new(
        identity: LibraryIdentity,
        public_url: impl Into<String>,
        library_url: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            public_url: public_url.into(),
            library_url: library_url.into(),
        }
    }
}

/// Drives the peer connection handshake.
///
/// All policy lives here: which transitions are legal, who gets
/// notified when, and the idempotency of repeated connection requests.
/// State always commits to the store before any notification goes out,
/// and no store lock is held across a dispatch; a lost notification
/// leaves a pending row on one side, never an inconsistent one.
pub struct Coordinator {
    peers: Arc<PeerStore>,
    netmap: Arc<NetMap>,
    profile: HubProfile,
    notifier: Arc<dyn Notifier>,
}

impl Coordinator {
    /// Create a coordinator.
    pub fn new(
        peers: Arc<PeerStore>,
        netmap: Arc<NetMap>,
        profile: HubProfile,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            peers,
            netmap,
            profile,
            notifier,
        }
    }

    /// This hub's profile.
    pub fn profile(&self) -> &HubProfile {
        &self.profile
    }

    /// Find or create the peer row for a canonical address.
    ///
    /// Losing a create race against a concurrent request for the same
    /// address is handled by looking the winner up again.
    fn ensure_peer(&self, name: &str, canonical: &str, direction: Direction) -> Result<(Peer, bool)> {
        if let Some(existing) = self.peers.find_by_url(canonical) {
            return Ok((existing, false));
        }

        match self.peers.create(
            name.to_string(),
            canonical.to_string(),
            direction,
            PeerStatus::Pending,
        ) {
            Ok(peer) => Ok((peer, true)),
            Err(StoreError::DuplicateAddress(_)) => match self.peers.find_by_url(canonical) {
                Some(existing) => Ok((existing, false)),
                None => Err(HandshakeError::Store(StoreError::DuplicateAddress(
                    canonical.to_string(),
                ))),
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Start (or re-start) a connection to a remote library.
    ///
    /// If the address is already known the existing record comes back
    /// unchanged and nothing is sent; repeating a request never spams
    /// the remote side. A fresh record is pending/outgoing, and exactly
    /// one connection request goes to the peer's hub afterwards. The
    /// returned flag says whether a record was created.
    pub async fn request_connection(&self, name: &str, url: &str) -> Result<(Peer, bool)> {
        let canonical = self.netmap.normalize(url);
        let (peer, created) = self.ensure_peer(name, &canonical, Direction::Outgoing)?;

        if created {
            tracing::info!(peer_id = peer.id, url = %peer.url, "connection requested");
            self.notifier
                .notify(
                    &peer.url,
                    Notification::ConnectionRequest(PeerAnnounce {
                        name: self.profile.identity.name.clone(),
                        url: self.profile.public_url.clone(),
                    }),
                )
                .await;
        }

        Ok((peer, created))
    }

    /// Record a connection request arriving from a remote hub.
    ///
    /// Same idempotency as [`request_connection`](Self::request_connection),
    /// but the record is pending/incoming and nothing is sent back: the
    /// remote side initiated this exchange, so answering it over the
    /// relay would start the request ping-ponging between the two hubs.
    pub fn receive_connection(&self, name: &str, url: &str) -> Result<(Peer, bool)> {
        let canonical = self.netmap.normalize(url);
        let (peer, created) = self.ensure_peer(name, &canonical, Direction::Incoming)?;
        if created {
            tracing::info!(peer_id = peer.id, url = %peer.url, "connection request received");
        }
        Ok((peer, created))
    }

    /// Decide a pending handshake.
    ///
    /// Legality and side effects come from the transition table; the
    /// store's conditional write makes one of two racing deciders lose
    /// with [`HandshakeError::InvalidTransition`]. On activation the
    /// peer is pushed to our own library node, then the remote hub is
    /// told; both are single best-effort attempts after the local
    /// commit.
    pub async fn set_status(&self, peer_id: u64, requested: PeerStatus) -> Result<Peer> {
        let peer = self
            .peers
            .find_by_id(peer_id)
            .ok_or_else(|| HandshakeError::PeerNotFound(format!("peer {peer_id}")))?;

        let transition = transitions::evaluate(peer.status, requested)?;

        let updated = self
            .peers
            .update_status(peer_id, PeerStatus::Pending, requested)
            .map_err(|err| match err {
                StoreError::StatusConflict { actual, .. } => HandshakeError::InvalidTransition {
                    from: actual,
                    to: requested,
                },
                StoreError::NotFound(what) => HandshakeError::PeerNotFound(what),
                other => HandshakeError::Store(other),
            })?;

        tracing::info!(peer_id, status = %updated.status, "peer status decided");

        if transition.sync_library {
            self.notifier
                .notify(
                    &self.profile.library_url,
                    Notification::LibrarySync(PeerAnnounce {
                        name: updated.name.clone(),
                        url: updated.url.clone(),
                    }),
                )
                .await;
        }

        if transition.notify_peer {
            self.notifier
                .notify(
                    &updated.url,
                    Notification::StatusUpdate(StatusNotice {
                        url: self.profile.public_url.clone(),
                        status: requested,
                    }),
                )
                .await;
        }

        Ok(updated)
    }

    /// Apply a status update announced by a remote hub.
    ///
    /// The peer is looked up by the announced address exactly as given
    /// first, then in canonical form. The status is written as
    /// announced, without consulting the transition table: the remote
    /// hub already decided, this side only mirrors. Never sends
    /// anything back; this is the terminal leg of the exchange, and
    /// re-notifying here would bounce the update between the two hubs
    /// forever.
    pub fn receive_status_update(&self, url: &str, status: PeerStatus) -> Result<Peer> {
        let peer = self
            .peers
            .find_by_url(url)
            .or_else(|| self.peers.find_by_url(&self.netmap.normalize(url)))
            .ok_or_else(|| HandshakeError::PeerNotFound(format!("peer '{url}'")))?;

        let mut updated = peer;
        updated.status = status;
        let stored = self.peers.update(&updated)?;

        tracing::info!(peer_id = stored.id, status = %stored.status, "peer status mirrored");
        Ok(stored)
    }

    /// Remove a peer in any status. No notification: the remote side
    /// keeps its own view until it talks to us again.
    pub fn remove_peer(&self, peer_id: u64) -> Result<()> {
        self.peers.delete(peer_id).map_err(|err| match err {
            StoreError::NotFound(what) => HandshakeError::PeerNotFound(what),
            other => HandshakeError::Store(other),
        })?;
        tracing::info!(peer_id, "peer removed");
        Ok(())
    }
}
