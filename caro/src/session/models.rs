//! Session and room identity models.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::game::entities::Symbol;

/// Transient handle for one connected client.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Opaque room identifier, a short decimal string on the wire.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Who holds a seat in a room.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Participant {
    Human(SessionId),
    /// The computer opponent of a solo room.
    Ai,
}

impl Participant {
    pub fn session(self) -> Option<SessionId> {
        match self {
            Self::Human(session) => Some(session),
            Self::Ai => None,
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human(session) => write!(f, "{session}"),
            Self::Ai => write!(f, "AI"),
        }
    }
}

/// The two seats of a room. Fixed for the room's whole life.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Players {
    pub x: Participant,
    pub o: Participant,
}

impl Players {
    /// A solo room: the human plays X against the AI.
    pub fn solo(human: SessionId) -> Self {
        Self {
            x: Participant::Human(human),
            o: Participant::Ai,
        }
    }

    /// A multiplayer room: the player who waited plays X.
    pub fn pair(first: SessionId, second: SessionId) -> Self {
        Self {
            x: Participant::Human(first),
            o: Participant::Human(second),
        }
    }

    pub fn symbol_of(&self, session: SessionId) -> Option<Symbol> {
        if self.x == Participant::Human(session) {
            Some(Symbol::X)
        } else if self.o == Participant::Human(session) {
            Some(Symbol::O)
        } else {
            None
        }
    }

    pub fn contains(&self, session: SessionId) -> bool {
        self.symbol_of(session).is_some()
    }

    pub fn is_solo(&self) -> bool {
        self.o == Participant::Ai || self.x == Participant::Ai
    }

    /// Human sessions seated here, X first.
    pub fn humans(&self) -> impl Iterator<Item = SessionId> + use<> {
        [self.x, self.o].into_iter().filter_map(Participant::session)
    }
}
