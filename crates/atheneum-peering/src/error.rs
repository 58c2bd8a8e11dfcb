//! Error types for the peering crate.

use atheneum_store::StoreError;
use atheneum_types::PeerStatus;
use thiserror::Error;

/// Errors that can occur while coordinating peer relationships.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// No peer matches the given ID or address.
    #[error("peer not found: {0}")]
    PeerNotFound(String),

    /// The requested status change is not allowed from the current status.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the peer is currently in.
        from: PeerStatus,
        /// Status the caller asked for.
        to: PeerStatus,
    },

    /// An underlying store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The relay's HTTP client could not be built.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for peering operations.
pub type Result<T> = std::result::Result<T, HandshakeError>;
