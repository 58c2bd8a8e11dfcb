//! Prometheus metrics behind `/metrics`.
//!
//! One global [`MetricsState`]: HTTP counts and latency, relay
//! dispatches by notification kind, and gauges for the peer and
//! directory populations. Handlers refresh the gauges at the mutation
//! sites, so scraping never touches the stores.

use async_trait::async_trait;
use atheneum_peering::{Notification, Notifier};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use std::sync::Arc;

/// HTTP request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    /// HTTP method (GET, POST, ...).
    pub method: String,
    /// Route template, with parametrized segments collapsed.
    pub path: String,
    /// Response status code.
    pub status: u16,
}

/// Notification relay labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RelayLabels {
    /// Notification kind (connection_request, status_update, library_sync)
    pub kind: String,
}

/// Global metrics state.
pub static METRICS: Lazy<MetricsState> = Lazy::new(MetricsState::new);

/// Metrics state container.
#[derive(Clone)]
pub struct MetricsState {
    /// Prometheus registry.
    pub registry: Arc<RwLock<Registry>>,
    /// HTTP request counter.
    pub http_requests_total: Family<HttpLabels, Counter>,
    /// HTTP request duration histogram (seconds).
    pub http_request_duration_seconds: Family<HttpLabels, Histogram>,
    /// Relay dispatch counter by notification kind.
    pub relay_notifications_total: Family<RelayLabels, Counter>,
    /// Known peers gauge.
    pub peers_total: Gauge,
    /// Registered libraries gauge.
    pub libraries_total: Gauge,
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsState {
    /// Create a new metrics state with all metrics registered.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        // HTTP metrics
        let http_requests_total = Family::<HttpLabels, Counter>::default();
        registry.register(
            "atheneum_http_requests",
            "Total HTTP requests",
            http_requests_total.clone(),
        );

        let http_request_duration_seconds =
            Family::<HttpLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.001, 2.0, 16))
            });
        registry.register(
            "atheneum_http_request_duration_seconds",
            "HTTP request duration in seconds",
            http_request_duration_seconds.clone(),
        );

        // Relay metrics
        let relay_notifications_total = Family::<RelayLabels, Counter>::default();
        registry.register(
            "atheneum_relay_notifications",
            "Total notification relay dispatches",
            relay_notifications_total.clone(),
        );

        // Business metrics
        let peers_total = Gauge::default();
        registry.register(
            "atheneum_peers",
            "Total number of known peers",
            peers_total.clone(),
        );

        let libraries_total = Gauge::default();
        registry.register(
            "atheneum_libraries",
            "Total number of registered libraries",
            libraries_total.clone(),
        );

        Self {
            registry: Arc::new(RwLock::new(registry)),
            http_requests_total,
            http_request_duration_seconds,
            relay_notifications_total,
            peers_total,
            libraries_total,
        }
    }

    /// Record an HTTP request. `path` is expected to be a route
    /// template already, not a raw request path.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let labels = HttpLabels {
            method: method.to_string(),
            path: path.to_string(),
            status,
        };

        self.http_requests_total.get_or_create(&labels).inc();
        self.http_request_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Record a notification relay dispatch.
    pub fn record_relay(&self, kind: &str) {
        self.relay_notifications_total
            .get_or_create(&RelayLabels {
                kind: kind.to_string(),
            })
            .inc();
    }

    /// Set the known-peers gauge.
    pub fn set_peers_total(&self, count: usize) {
        self.peers_total.set(count as i64);
    }

    /// Set the registered-libraries gauge.
    pub fn set_libraries_total(&self, count: usize) {
        self.libraries_total.set(count as i64);
    }

    /// Encode metrics for Prometheus scraping.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        let registry = self.registry.read();
        prometheus_client::encoding::text::encode(&mut buffer, &registry)
            .expect("Failed to encode metrics");
        buffer
    }
}

/// Counts relay dispatches by kind before handing off to the real relay.
pub struct MeteredNotifier {
    inner: Arc<dyn Notifier>,
}

impl MeteredNotifier {
    /// Wrap a notifier.
    pub fn new(inner: Arc<dyn Notifier>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Notifier for MeteredNotifier {
    async fn notify(&self, target: &str, notification: Notification) {
        METRICS.record_relay(notification.kind());
        self.inner.notify(target, notification).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atheneum_peering::{NullNotifier, PeerAnnounce};

    #[test]
    fn test_metrics_state_creation() {
        let metrics = MetricsState::new();
        metrics.record_http_request("GET", "/health", 200, 0.001);
        let encoded = metrics.encode();
        assert!(encoded.contains("atheneum_http_requests"));
    }

    #[tokio::test]
    async fn test_metered_notifier_counts_dispatches() {
        let notifier = MeteredNotifier::new(Arc::new(NullNotifier));
        notifier
            .notify(
                "http://library-b:8000",
                Notification::ConnectionRequest(PeerAnnounce {
                    name: "Lib A".into(),
                    url: "http://library-a:8000".into(),
                }),
            )
            .await;
        assert!(METRICS.encode().contains("atheneum_relay_notifications"));
    }
}
