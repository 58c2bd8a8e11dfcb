//! Logging setup for the hub binary.
//!
//! One subscriber for the whole process: an `EnvFilter` seeded from the
//! configured level (overridable with `RUST_LOG`) under either a pretty
//! or a JSON fmt layer. The MCP bridge gets a stderr-only variant so
//! stdout stays reserved for the protocol stream.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for development.
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

impl LogFormat {
    /// Parse a format name; anything but "json" means pretty.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Filter directives covering the hub's own crates at `level`, with
/// HTTP plumbing pinned to its usual verbosity.
fn default_filter(level: &str) -> String {
    format!(
        "atheneum_hub={level},atheneum_peering={level},atheneum_store={level},\
         tower_http=debug,axum::rejection=trace"
    )
}

/// Install the process-wide subscriber.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_logging(level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into());

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }

    tracing::info!(level = %level, format = ?format, "Logging initialized");
}

/// Install a stderr-only subscriber.
///
/// The MCP bridge speaks line-delimited JSON on stdout, so its logs
/// must stay off that stream.
pub fn init_stderr_logging(level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
