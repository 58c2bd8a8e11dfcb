//! Logging, metrics and request tracking for the hub.
//!
//! Three pieces, wired together by the router and the serve loop:
//!
//! - [`init_logging`] installs the process-wide `tracing` subscriber,
//!   pretty or JSON.
//! - [`middleware`] tags requests with IDs and feeds the HTTP metrics.
//! - [`METRICS`] is the global Prometheus registry behind `/metrics`,
//!   with a [`MeteredNotifier`] wrapper counting relay dispatches.
//!
//! ```rust,ignore
//! use atheneum_hub::observability::{init_logging, middleware, LogFormat};
//!
//! init_logging("info", LogFormat::Json);
//!
//! let app: axum::Router<()> = axum::Router::new()
//!     .layer(axum::middleware::from_fn(middleware::request_id_middleware));
//! ```

mod logging;
mod metrics;
pub mod middleware;

pub use logging::{init_logging, init_stderr_logging, LogFormat};
pub use metrics::{MeteredNotifier, MetricsState, METRICS};
pub use middleware::REQUEST_ID_HEADER;
