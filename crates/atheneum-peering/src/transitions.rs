//! The status transition table.
//!
//! Everything a status change may do is decided here, in one place:
//!
//! | from    | to       | allowed | sync library | notify peer |
//! |---------|----------|---------|--------------|-------------|
//! | pending | active   | yes     | yes          | yes         |
//! | pending | rejected | yes     | no           | no          |
//! | any     | anything else | no | —            | —           |
//!
//! `Active` and `Rejected` are terminal; re-asserting a terminal status
//! is just as illegal as leaving it.

use crate::error::{HandshakeError, Result};
use atheneum_types::PeerStatus;

/// Side effects a legal transition carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Push the peer to our own library node.
    pub sync_library: bool,
    /// Tell the remote hub about the new status.
    pub notify_peer: bool,
}

/// Decide whether `current -> requested` is legal and what it triggers.
pub fn evaluate(current: PeerStatus, requested: PeerStatus) -> Result<Transition> {
    match (current, requested) {
        (PeerStatus::Pending, PeerStatus::Active) => Ok(Transition {
            sync_library: true,
            notify_peer: true,
        }),
        (PeerStatus::Pending, PeerStatus::Rejected) => Ok(Transition {
            sync_library: false,
            notify_peer: false,
        }),
        (from, to) => Err(HandshakeError::InvalidTransition { from, to }),
    }
}
