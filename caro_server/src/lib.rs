//! Caro game server: WebSocket transport, configuration, logging and metrics
//! around the [`caro`] engine.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
