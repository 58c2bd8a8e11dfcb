//! # Atheneum Peering
//!
//! The protocol core of the Atheneum hub: address mapping between
//! library nodes and their coordination hubs, the connection handshake
//! state machine, the best-effort notification relay, and peer search.
//!
//! The flow between two hubs A and B:
//!
//! 1. A's operator asks A to connect to B's library. A stores a
//!    pending/outgoing peer, then sends one connection request to B's
//!    hub.
//! 2. B mirrors it as pending/incoming and stays silent.
//! 3. B's operator activates (or rejects) the request. On activation B
//!    pushes the peer to its own library node and tells A's hub.
//! 4. A mirrors the new status and stays silent.
//!
//! Every dispatch is a single attempt with a bounded timeout, sent only
//! after the local state is committed; a lost message leaves one side
//! pending, which a later request or decision reconciles.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod coordinator;
mod discovery;
mod error;
mod lookup;
mod netmap;
mod relay;
pub mod transitions;

pub use coordinator::{Coordinator, HubProfile};
pub use discovery::{Discovery, SearchHit, SearchSource};
pub use error::{HandshakeError, Result};
pub use lookup::{DirectoryCandidate, DirectoryLookup, NoDirectory};
pub use netmap::{NetMap, NodePair};
pub use relay::{
    HttpRelay, Notification, Notifier, NullNotifier, PeerAnnounce, StatusNotice,
    DEFAULT_RELAY_TIMEOUT,
};
