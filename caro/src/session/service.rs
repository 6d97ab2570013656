//! Event handling for connected sessions.

use serde_json::Value;
use std::sync::Arc;

use super::{
    matchmaking::{MatchmakingService, Pairing, log_transport_error},
    models::{RoomId, SessionId},
    registry::SessionRegistry,
    transport::EventSink,
};
use crate::{
    bot::AiConfig,
    game::entities::Coord,
    net::{
        errors::ProtocolError,
        messages::{
            ClientEvent, INVALID_COORDINATE_MESSAGE, INVALID_FORMAT_MESSAGE, ServerEvent,
            parse_coordinate,
        },
    },
};

/// Routes client events to matchmaking and room state, and emits the
/// resulting events through the sink.
///
/// Illegal but well-formed requests (wrong turn, occupied cell, unknown
/// room, finished game) are dropped without a reply. Only undecodable input
/// earns an `error` event.
pub struct GameService {
    registry: Arc<SessionRegistry>,
    sink: Arc<dyn EventSink>,
    matchmaking: MatchmakingService,
}

impl GameService {
    pub fn new(registry: Arc<SessionRegistry>, sink: Arc<dyn EventSink>) -> Self {
        Self::with_ai_config(registry, sink, AiConfig::default())
    }

    pub fn with_ai_config(
        registry: Arc<SessionRegistry>,
        sink: Arc<dyn EventSink>,
        ai_config: AiConfig,
    ) -> Self {
        let matchmaking = MatchmakingService::new(registry.clone(), sink.clone(), ai_config);
        Self {
            registry,
            sink,
            matchmaking,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Acknowledge a freshly connected session with its id.
    pub fn connect(&self, session: SessionId) {
        log::info!("Session {} connected", session);
        self.reply(session, ServerEvent::Connected { sid: session });
    }

    /// Decode and handle one raw event from `session`.
    pub async fn handle_text(&self, session: SessionId, text: &str) {
        match ClientEvent::from_json(text) {
            Ok(event) => self.handle_event(session, event).await,
            Err(e) => {
                log::warn!("Session {}: {}", session, e);
                self.reply(session, ServerEvent::error(INVALID_FORMAT_MESSAGE));
            }
        }
    }

    pub async fn handle_event(&self, session: SessionId, event: ClientEvent) {
        log::debug!("Session {}: {}", session, event);
        match event {
            ClientEvent::FindRoom { solo } => self.find_room(session, solo).await,
            ClientEvent::MakeMove { room, row, col } => {
                self.make_move(session, &room, &row, &col).await;
            }
            ClientEvent::Timeout { room } => self.timeout(session, &room).await,
        }
    }

    pub async fn find_room(&self, session: SessionId, solo: bool) {
        let result = if solo {
            self.matchmaking.request_solo(session).await.map(Pairing::Started)
        } else {
            self.matchmaking.request_multiplayer(session).await
        };
        if let Err(e) = result {
            log::error!("Session {}: could not create room: {}", session, e);
            self.reply(session, ServerEvent::error(e.to_string()));
        }
    }

    /// Apply a move and broadcast the new state.
    pub async fn make_move(&self, session: SessionId, room: &RoomId, row: &Value, col: &Value) {
        let (row, col) = match (parse_coordinate(row), parse_coordinate(col)) {
            (Ok(row), Ok(col)) => (row, col),
            (Err(e), _) | (_, Err(e)) => {
                self.reject(session, &e);
                return;
            }
        };

        let Some(entry) = self.registry.get_room(room).await else {
            log::debug!("Session {}: move for unknown room {}", session, room);
            return;
        };
        let Some(symbol) = entry.players.symbol_of(session) else {
            log::debug!("Session {}: not seated in room {}", session, room);
            return;
        };
        let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) else {
            log::debug!("Session {}: negative coordinate ({}, {})", session, row, col);
            return;
        };

        // Broadcasting under the room lock keeps snapshots in order.
        let mut game = entry.game.lock().await;
        match game.apply_move(symbol, Coord::new(row, col)) {
            Ok(outcome) => {
                log::debug!("Room {}: {} played {}", room, outcome.mover, outcome.coord);
                if let Some(reply) = outcome.ai_reply {
                    log::debug!("Room {}: AI answered {} with {}", room, outcome.coord, reply);
                }
                if let Some(winner) = outcome.snapshot.winner {
                    log::info!("Room {}: game over, winner {}", room, winner);
                }
                self.broadcast(room, ServerEvent::StateUpdate(outcome.snapshot));
            }
            Err(e) => log::debug!("Room {}: move by {} ignored: {}", room, session, e),
        }
    }

    /// Forfeit the caller's game after their move clock ran out.
    pub async fn timeout(&self, session: SessionId, room: &RoomId) {
        let Some(entry) = self.registry.get_room(room).await else {
            return;
        };
        let Some(loser) = entry.players.symbol_of(session) else {
            return;
        };

        let mut game = entry.game.lock().await;
        if let Some(snapshot) = game.apply_timeout(loser) {
            log::info!("Room {}: {} timed out and forfeits", room, loser);
            self.broadcast(room, ServerEvent::StateUpdate(snapshot));
        }
    }

    /// Release everything held by a departing session.
    ///
    /// Clears the waiting slot if the session holds it, then tears down every
    /// room it sits in and tells the other human there that they are alone.
    pub async fn disconnect(&self, session: SessionId) {
        if self.registry.waiting().await.clear_if(session) {
            log::info!("Session {} left the waiting slot", session);
        }

        for entry in self.registry.remove_rooms_of(session).await {
            for other in entry.players.humans().filter(|&other| other != session) {
                self.reply(other, ServerEvent::opponent_left());
            }
            self.sink.close_group(&entry.id);
            log::info!("Room {} closed after {} disconnected", entry.id, session);
        }
        log::info!("Session {} disconnected", session);
    }

    fn reject(&self, session: SessionId, error: &ProtocolError) {
        log::debug!("Session {}: {}", session, error);
        self.reply(session, ServerEvent::error(INVALID_COORDINATE_MESSAGE));
    }

    fn reply(&self, session: SessionId, event: ServerEvent) {
        if let Err(e) = self.sink.send_to(session, event) {
            log::warn!("Failed to reply to {}: {}", session, e);
        }
    }

    fn broadcast(&self, room: &RoomId, event: ServerEvent) {
        if let Err(e) = self.sink.broadcast(room, event) {
            log_transport_error(&e, "state", room);
        }
    }
}
