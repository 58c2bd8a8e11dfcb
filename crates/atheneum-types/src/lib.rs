//! Common types used throughout Atheneum.
//!
//! This crate provides the core data model for the Atheneum
//! decentralized library network: peers, directory entries, and
//! translatable content.

mod content;
mod library;
mod peer;

pub use content::{Language, Translation};
pub use library::{LibraryIdentity, RegisteredLibrary, HEARTBEAT_WINDOW_SECS};
pub use peer::{Direction, Peer, PeerStatus};

/// Current wall-clock time as Unix seconds.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
