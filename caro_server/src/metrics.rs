//! Prometheus metrics for monitoring server health and activity.
//!
//! Metrics are exposed in Prometheus text format when an exporter address is
//! configured. Without one the `metrics` macros are no-ops.
//!
//! Room and game counters are derived from outbound events by
//! [`MeteredSink`], which wraps the real [`EventSink`].
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use caro_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::websocket_connections_active(10);
//! ```

use caro::{
    ServerEvent,
    game::Winner,
    session::{EventSink, RoomId, SessionId, TransportError},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{net::SocketAddr, sync::Arc};

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Set current active WebSocket connections count.
pub fn websocket_connections_active(count: usize) {
    metrics::gauge!("websocket_connections_active").set(count as f64);
}

/// Increment total WebSocket connections counter.
pub fn websocket_connections_total() {
    metrics::counter!("websocket_connections_total").increment(1);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}

/// Increment WebSocket messages received counter.
pub fn websocket_messages_received() {
    metrics::counter!("websocket_messages_received").increment(1);
}

/// Increment rate limit hits counter.
pub fn rate_limit_hits_total(window: &str) {
    metrics::counter!("rate_limit_hits_total",
        "window" => window.to_string()
    )
    .increment(1);
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Set current live rooms count.
pub fn rooms_active(count: usize) {
    metrics::gauge!("rooms_active").set(count as f64);
}

/// Increment rooms created counter.
pub fn rooms_created_total() {
    metrics::counter!("rooms_created_total").increment(1);
}

/// Increment state updates counter.
pub fn state_updates_total() {
    metrics::counter!("state_updates_total").increment(1);
}

/// Increment finished games counter.
pub fn games_finished_total(winner: Winner) {
    metrics::counter!("games_finished_total",
        "winner" => winner.to_string()
    )
    .increment(1);
}

/// [`EventSink`] wrapper that records game metrics for room broadcasts.
pub struct MeteredSink<S> {
    inner: Arc<S>,
}

impl<S> MeteredSink<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self { inner }
    }
}

impl<S: EventSink> EventSink for MeteredSink<S> {
    fn send_to(&self, session: SessionId, event: ServerEvent) -> Result<(), TransportError> {
        self.inner.send_to(session, event)
    }

    fn join_group(&self, room: &RoomId, session: SessionId) -> Result<(), TransportError> {
        self.inner.join_group(room, session)
    }

    fn broadcast(&self, room: &RoomId, event: ServerEvent) -> Result<(), TransportError> {
        match &event {
            ServerEvent::StartGame { .. } => rooms_created_total(),
            ServerEvent::StateUpdate(snapshot) => {
                state_updates_total();
                if let Some(winner) = snapshot.winner {
                    games_finished_total(winner);
                }
            }
            _ => {}
        }
        self.inner.broadcast(room, event)
    }

    fn close_group(&self, room: &RoomId) {
        self.inner.close_group(room)
    }
}
