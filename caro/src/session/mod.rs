//! Connected sessions, rooms and matchmaking.
//!
//! [`GameService`] is the entry point a transport drives: it receives decoded
//! client events, updates the [`SessionRegistry`] and emits server events
//! through an [`EventSink`].

pub mod matchmaking;
pub mod models;
pub mod registry;
pub mod service;
pub mod transport;

pub use matchmaking::{MatchmakingService, Pairing};
pub use models::{Participant, Players, RoomId, SessionId};
pub use registry::{RegistryError, RoomEntry, SessionRegistry};
pub use service::GameService;
pub use transport::{ChannelHub, EventSink, TransportError};
