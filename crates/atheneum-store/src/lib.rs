//! Thread-safe in-memory stores for Atheneum.
//!
//! This crate provides:
//! - **PeerStore**: peer records with unique canonical addresses and
//!   row-scoped conditional status writes
//! - **DirectoryRegistry**: self-reported library directory with
//!   heartbeats and derived liveness
//! - **ContentStore**: languages and translated UI strings
//!
//! Stores are pure persistence: business rules (which transitions are
//! legal, who gets notified) live in `atheneum-peering`.
//!
//! # Example
//!
//! ```
//! use atheneum_store::PeerStore;
//! use atheneum_types::{Direction, PeerStatus};
//!
//! let store = PeerStore::new();
//!
//! let peer = store.create(
//!     "Lib B".into(),
//!     "http://library-b:8000".into(),
//!     Direction::Outgoing,
//!     PeerStatus::Pending,
//! ).unwrap();
//!
//! // A second create with the same address loses to the first.
//! assert!(store.create(
//!     "Lib B again".into(),
//!     "http://library-b:8000".into(),
//!     Direction::Outgoing,
//!     PeerStatus::Pending,
//! ).is_err());
//!
//! let activated = store
//!     .update_status(peer.id, PeerStatus::Pending, PeerStatus::Active)
//!     .unwrap();
//! assert_eq!(activated.status, PeerStatus::Active);
//! ```

mod content;
mod error;
mod peers;
mod registry;

pub use content::ContentStore;
pub use error::{Result, StoreError};
pub use peers::PeerStore;
pub use registry::DirectoryRegistry;
