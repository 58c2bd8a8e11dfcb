//! Peer types for hub-to-hub connection relationships.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a peer relationship.
///
/// `Active` and `Rejected` are terminal: once reached, the only way
/// forward is deleting the peer and starting a new handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerStatus {
    /// Awaiting a decision on one of the two sides.
    Pending,
    /// Both sides agreed to the connection.
    Active,
    /// The connection request was declined.
    Rejected,
}

impl PeerStatus {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(PeerStatus::Pending),
            "active" => Some(PeerStatus::Active),
            "rejected" => Some(PeerStatus::Rejected),
            _ => None,
        }
    }

    /// Whether this status admits no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PeerStatus::Active | PeerStatus::Rejected)
    }
}

impl std::fmt::Display for PeerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerStatus::Pending => write!(f, "pending"),
            PeerStatus::Active => write!(f, "active"),
            PeerStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Which side initiated the connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// This hub asked the remote library for a connection.
    Outgoing,
    /// The remote library asked this hub for a connection.
    Incoming,
}

impl Direction {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "outgoing" => Some(Direction::Outgoing),
            "incoming" => Some(Direction::Incoming),
            _ => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Outgoing => write!(f, "outgoing"),
            Direction::Incoming => write!(f, "incoming"),
        }
    }
}

/// A remote library this hub has a connection relationship with.
///
/// The `url` is the peer's library-node address in canonical form and is
/// unique across all peers. It never changes after creation; neither does
/// `direction`. Only `status` moves, and only through the handshake
/// coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peer {
    /// Unique peer ID.
    pub id: u64,
    /// Display name of the remote library.
    pub name: String,
    /// Canonical library-node address (unique).
    pub url: String,
    /// Current handshake status.
    pub status: PeerStatus,
    /// Which side initiated the relationship.
    pub direction: Direction,
    /// When the peer record was created (Unix timestamp).
    pub created_at: u64,
}

impl Peer {
    /// Create a new peer record stamped with the current time.
    pub fn new(id: u64, name: String, url: String, direction: Direction, status: PeerStatus) -> Self {
        Self::new_at(id, name, url, direction, status, crate::unix_now())
    }

    /// Create a new peer record with an explicit creation time.
    pub fn new_at(
        id: u64,
        name: String,
        url: String,
        direction: Direction,
        status: PeerStatus,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            name,
            url,
            status,
            direction,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(PeerStatus::from_str("Active"), Some(PeerStatus::Active));
        assert_eq!(PeerStatus::from_str(" pending "), Some(PeerStatus::Pending));
        assert_eq!(PeerStatus::from_str("REJECTED"), Some(PeerStatus::Rejected));
        assert!(PeerStatus::from_str("approved").is_none());
        assert!(PeerStatus::from_str("").is_none());
    }

    #[test]
    fn test_status_terminality() {
        assert!(!PeerStatus::Pending.is_terminal());
        assert!(PeerStatus::Active.is_terminal());
        assert!(PeerStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PeerStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&Direction::Incoming).unwrap(),
            "\"incoming\""
        );
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::from_str("outgoing"), Some(Direction::Outgoing));
        assert_eq!(Direction::from_str("Incoming"), Some(Direction::Incoming));
        assert!(Direction::from_str("sideways").is_none());
    }
}
