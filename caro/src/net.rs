//! Wire protocol between clients and the session core.
//!
//! Events are JSON objects of the form `{"event": <name>, "data": {...}}`,
//! mirroring a named-event socket protocol.

/// Protocol error types.
pub mod errors;

/// Inbound and outbound event payloads.
pub mod messages;
