//! Structured logging configuration.
//!
//! Library code logs through the `log` facade; [`init`] installs a
//! `tracing-subscriber` that also picks those records up.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels come from the `RUST_LOG` env var and default to `info`.
///
/// # Example
///
/// ```no_run
/// use caro_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a client that exceeded its message allowance
///
/// # Arguments
///
/// * `session` - Session id of the client
/// * `window` - Which limiter tripped (`burst` or `sustained`)
pub fn log_rate_limited(session: &str, window: &str) {
    tracing::warn!(
        session = session,
        window = window,
        "RATE LIMIT: dropping client message"
    );
}

/// Log the lifetime of a finished WebSocket connection
pub fn log_connection_closed(session: &str, duration_ms: u64, messages: u64) {
    tracing::info!(
        session = session,
        duration_ms = duration_ms,
        messages = messages,
        "WebSocket connection closed"
    );
}

/// Log handling time of one client message, flagging slow ones
pub fn log_message_handled(session: &str, duration_ms: u64) {
    if duration_ms > 100 {
        tracing::warn!(
            session = session,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow message handling"
        );
    } else {
        tracing::trace!(
            session = session,
            duration_ms = duration_ms,
            "Message handled"
        );
    }
}
