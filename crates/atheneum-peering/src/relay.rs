//! Best-effort notification relay between hubs and library nodes.

use crate::netmap::NetMap;
use async_trait::async_trait;
use atheneum_types::PeerStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default per-attempt timeout for outbound notifications.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(2);

/// Announcement of a library to another node: "this library exists at
/// this address". Sent both hub-to-hub and hub-to-own-library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAnnounce {
    /// Display name of the announced library.
    pub name: String,
    /// Library-node address of the announced library.
    pub url: String,
}

/// Hub-to-hub notice that a handshake reached a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNotice {
    /// Address identifying the sender's library on the receiving hub.
    pub url: String,
    /// The status the sender moved the relationship to.
    pub status: PeerStatus,
}

/// A single outbound notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Ask a remote hub to mirror a new pending connection.
    ConnectionRequest(PeerAnnounce),
    /// Tell a remote hub its request was activated.
    StatusUpdate(StatusNotice),
    /// Push an activated peer to our own library node.
    LibrarySync(PeerAnnounce),
}

impl Notification {
    /// Endpoint path the notification is POSTed to.
    pub fn path(&self) -> &'static str {
        match self {
            Notification::ConnectionRequest(_) => "/api/peers/receive_connection",
            Notification::StatusUpdate(_) => "/api/peers/receive_status_update",
            Notification::LibrarySync(_) => "/api/peers/connect",
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::ConnectionRequest(_) => "connection_request",
            Notification::StatusUpdate(_) => "status_update",
            Notification::LibrarySync(_) => "library_sync",
        }
    }
}

/// Dispatches notifications without ever failing the caller.
///
/// Implementations make exactly one attempt per call and absorb every
/// error; handshake state is already committed by the time a
/// notification goes out, and the two sides reconcile through later
/// calls rather than retries.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one notification towards `target`.
    async fn notify(&self, target: &str, notification: Notification);
}

/// Where a notification must be addressed, given the raw target.
///
/// Hub-to-hub notifications go to the coordination endpoint paired with
/// the target's canonical address; the library sync goes to the library
/// node itself.
fn resolve_base(netmap: &NetMap, target: &str, notification: &Notification) -> String {
    match notification {
        Notification::LibrarySync(_) => netmap.normalize(target),
        _ => netmap.coordination_endpoint(target),
    }
}

/// HTTP notifier with a bounded per-attempt timeout.
pub struct HttpRelay {
    client: reqwest::Client,
    netmap: Arc<NetMap>,
}

impl HttpRelay {
    /// Build a relay with the given timeout.
    pub fn new(netmap: Arc<NetMap>, timeout: Duration) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("atheneum-hub")
            .timeout(timeout)
            .build()?;
        Ok(Self { client, netmap })
    }
}

#[async_trait]
impl Notifier for HttpRelay {
    async fn notify(&self, target: &str, notification: Notification) {
        let base = resolve_base(&self.netmap, target, &notification);
        let url = format!("{}{}", base.trim_end_matches('/'), notification.path());

        let request = self.client.post(&url);
        let request = match &notification {
            Notification::ConnectionRequest(announce) | Notification::LibrarySync(announce) => {
                request.json(announce)
            }
            Notification::StatusUpdate(notice) => request.json(notice),
        };

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(kind = notification.kind(), %url, "notification delivered");
            }
            Ok(response) => {
                tracing::warn!(
                    kind = notification.kind(),
                    %url,
                    status = %response.status(),
                    "notification rejected by remote"
                );
            }
            Err(err) => {
                tracing::warn!(
                    kind = notification.kind(),
                    %url,
                    error = %err,
                    "notification failed"
                );
            }
        }
    }
}

/// Discards every notification. For hubs running without a network and
/// for router tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _target: &str, _notification: Notification) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Records notifications instead of sending them.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        sent: Mutex<Vec<(String, Notification)>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent(&self) -> Vec<(String, Notification)> {
            self.sent.lock().clone()
        }

        pub fn count(&self) -> usize {
            self.sent.lock().len()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, target: &str, notification: Notification) {
            self.sent.lock().push((target.to_string(), notification));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announce() -> PeerAnnounce {
        PeerAnnounce {
            name: "Lib A".into(),
            url: "http://library-a:8000".into(),
        }
    }

    #[test]
    fn test_paths_per_kind() {
        assert_eq!(
            Notification::ConnectionRequest(announce()).path(),
            "/api/peers/receive_connection"
        );
        assert_eq!(
            Notification::StatusUpdate(StatusNotice {
                url: "http://library-a:8000".into(),
                status: PeerStatus::Active,
            })
            .path(),
            "/api/peers/receive_status_update"
        );
        assert_eq!(
            Notification::LibrarySync(announce()).path(),
            "/api/peers/connect"
        );
    }

    #[test]
    fn test_hub_notifications_go_to_coordination_endpoint() {
        let netmap = NetMap::dev_default();

        let base = resolve_base(
            &netmap,
            "http://library-b:8000",
            &Notification::ConnectionRequest(announce()),
        );
        assert_eq!(base, "http://hub-b:8080");

        // Alias first, then pairing.
        let base = resolve_base(
            &netmap,
            "http://localhost:8002/",
            &Notification::StatusUpdate(StatusNotice {
                url: "http://library-a:8000".into(),
                status: PeerStatus::Active,
            }),
        );
        assert_eq!(base, "http://hub-b:8080");
    }

    #[test]
    fn test_library_sync_stays_on_the_node_address() {
        let netmap = NetMap::dev_default();
        let base = resolve_base(
            &netmap,
            "http://library-a:8000",
            &Notification::LibrarySync(announce()),
        );
        assert_eq!(base, "http://library-a:8000");
    }

    #[test]
    fn test_status_notice_wire_shape() {
        let notice = StatusNotice {
            url: "http://library-a:8000".into(),
            status: PeerStatus::Active,
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"url": "http://library-a:8000", "status": "active"})
        );
    }

    #[tokio::test]
    async fn test_unreachable_target_is_absorbed() {
        let relay = HttpRelay::new(
            Arc::new(NetMap::empty()),
            Duration::from_millis(250),
        )
        .unwrap();

        // Nothing listens here; the error is logged and swallowed.
        relay
            .notify("http://127.0.0.1:1", Notification::ConnectionRequest(announce()))
            .await;
    }
}
