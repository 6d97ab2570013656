//! HTTP/WebSocket API for the Caro server.
//!
//! # Endpoints Overview
//!
//! - `GET /ws` - Game event channel (see [`websocket`])
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use caro_server::{api::{AppState, create_router}, config::ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_router(AppState::new(ServerConfig::default()));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively, matching the browser client which may be
//! served from any origin.

pub mod rate_limiter;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use caro::{ChannelHub, GameService, SessionRegistry};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::{config::ServerConfig, metrics::MeteredSink};

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned for each request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Game event handling
    pub service: Arc<GameService>,
    /// Per-session outbound queues, shared with the service's sink
    pub hub: Arc<ChannelHub>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build a fresh registry, hub and service for `config`.
    pub fn new(config: ServerConfig) -> Self {
        let hub = Arc::new(ChannelHub::new());
        let sink = Arc::new(MeteredSink::new(hub.clone()));
        let service = GameService::new(Arc::new(SessionRegistry::new()), sink);
        Self {
            service: Arc::new(service),
            hub,
            config: Arc::new(config),
        }
    }
}

/// Create the API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:5000/health
/// # {"status":"healthy","version":"1.0.0","rooms":{"active":3},"waiting":false,"connections":7,"timestamp":"2026-10-16T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.service.registry();
    let active_rooms = registry.room_count().await;
    let waiting = registry.waiting().await.is_some();

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": {
            "active": active_rooms,
        },
        "waiting": waiting,
        "connections": state.hub.session_count(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
