//! Pairing of incoming game requests into rooms.

use std::sync::Arc;

use super::{
    models::{Players, RoomId, SessionId},
    registry::{RegistryError, RoomEntry, SessionRegistry},
    transport::{EventSink, TransportError},
};
use crate::{
    bot::{AiConfig, AiEngine},
    game::{entities::Symbol, state_machine::GameRoom},
    net::messages::ServerEvent,
};

/// Result of a multiplayer request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Pairing {
    /// The caller is parked in the waiting slot.
    Waiting,
    /// The caller was paired and the room started.
    Started(RoomId),
}

/// Creates solo rooms on demand and pairs multiplayer requests two by two.
pub struct MatchmakingService {
    registry: Arc<SessionRegistry>,
    sink: Arc<dyn EventSink>,
    ai_config: AiConfig,
}

impl MatchmakingService {
    pub fn new(registry: Arc<SessionRegistry>, sink: Arc<dyn EventSink>, ai_config: AiConfig) -> Self {
        Self {
            registry,
            sink,
            ai_config,
        }
    }

    /// Start a room against the AI right away.
    pub async fn request_solo(&self, session: SessionId) -> Result<RoomId, RegistryError> {
        let game = GameRoom::solo(AiEngine::with_config(self.ai_config.clone()));
        let entry = self
            .registry
            .create_room(Players::solo(session), game)
            .await?;
        log::info!("Solo room {} created for {}", entry.id, session);

        self.subscribe(&entry, session);
        self.notify(
            session,
            ServerEvent::RoomJoined {
                room: entry.id.clone(),
                symbol: Symbol::X,
            },
        );
        self.start(&entry);
        Ok(entry.id.clone())
    }

    /// Wait for an opponent, or pair with the one already waiting.
    ///
    /// The waiting player gets `X` and the caller `O`. A session that is
    /// already waiting is told to keep waiting instead of being paired with
    /// itself.
    pub async fn request_multiplayer(&self, session: SessionId) -> Result<Pairing, RegistryError> {
        let mut slot = self.registry.waiting().await;
        let opponent = match slot.holder() {
            None => {
                slot.park(session);
                drop(slot);
                log::info!("{} is waiting for an opponent", session);
                self.notify(session, ServerEvent::waiting());
                return Ok(Pairing::Waiting);
            }
            Some(waiting) if waiting == session => {
                drop(slot);
                self.notify(session, ServerEvent::waiting());
                return Ok(Pairing::Waiting);
            }
            Some(waiting) => waiting,
        };

        // The slot stays locked until both players have been told about the
        // room, so a disconnect of the waiting player only sees a started room.
        let entry = self
            .registry
            .create_room(Players::pair(opponent, session), GameRoom::multiplayer())
            .await?;
        slot.take();
        log::info!(
            "Room {} created: {} (X) vs {} (O)",
            entry.id,
            opponent,
            session
        );

        self.subscribe(&entry, opponent);
        self.subscribe(&entry, session);
        self.notify(
            opponent,
            ServerEvent::RoomJoined {
                room: entry.id.clone(),
                symbol: Symbol::X,
            },
        );
        self.notify(
            session,
            ServerEvent::RoomJoined {
                room: entry.id.clone(),
                symbol: Symbol::O,
            },
        );
        self.start(&entry);
        drop(slot);
        Ok(Pairing::Started(entry.id.clone()))
    }

    fn subscribe(&self, entry: &RoomEntry, session: SessionId) {
        if let Err(e) = self.sink.join_group(&entry.id, session) {
            log_transport_error(&e, "subscribe", &entry.id);
        }
    }

    fn notify(&self, session: SessionId, event: ServerEvent) {
        if let Err(e) = self.sink.send_to(session, event) {
            log::warn!("Failed to notify {}: {}", session, e);
        }
    }

    fn start(&self, entry: &RoomEntry) {
        let event = ServerEvent::StartGame { turn: Symbol::X };
        if let Err(e) = self.sink.broadcast(&entry.id, event) {
            log_transport_error(&e, "start", &entry.id);
        }
    }
}

pub(crate) fn log_transport_error(error: &TransportError, action: &str, room: &RoomId) {
    log::warn!("Room {}: {} delivery failed: {}", room, action, error);
}
