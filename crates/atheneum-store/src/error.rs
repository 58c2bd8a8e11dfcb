//! Error types for the store crate.

use atheneum_types::PeerStatus;
use thiserror::Error;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A peer with the same canonical address already exists.
    #[error("duplicate address: {0}")]
    DuplicateAddress(String),

    /// A conditional status write found a different current status.
    #[error("status conflict: expected {expected}, found {actual}")]
    StatusConflict {
        /// The status the caller required.
        expected: PeerStatus,
        /// The status actually stored.
        actual: PeerStatus,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
