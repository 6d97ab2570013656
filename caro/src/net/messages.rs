use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::errors::{ProtocolError, Result};
use crate::{
    game::{entities::Symbol, state_machine::StateSnapshot},
    session::models::{RoomId, SessionId},
};

pub const WAITING_MESSAGE: &str = "Looking for an opponent...";
pub const INVALID_COORDINATE_MESSAGE: &str = "Invalid coordinates";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid message format";
pub const OPPONENT_LEFT_MESSAGE: &str = "Your opponent left the room";

/// An event sent by a client.
///
/// Connecting and disconnecting are signalled by the transport itself and
/// are not part of this enum.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Ask for a game, against the AI when `solo` is set.
    FindRoom {
        #[serde(default)]
        solo: bool,
    },
    /// Place a stone. Coordinates are kept raw so that a bad value can be
    /// reported as an invalid coordinate rather than a malformed event.
    MakeMove {
        #[serde(default)]
        room: RoomId,
        #[serde(default)]
        row: Value,
        #[serde(default)]
        col: Value,
    },
    /// The client's move clock ran out; the sender forfeits.
    Timeout {
        #[serde(default)]
        room: RoomId,
    },
}

impl ClientEvent {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl fmt::Display for ClientEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindRoom { solo: true } => write!(f, "find_room (solo)"),
            Self::FindRoom { solo: false } => write!(f, "find_room"),
            Self::MakeMove { room, row, col } => write!(f, "make_move {room} ({row}, {col})"),
            Self::Timeout { room } => write!(f, "timeout {room}"),
        }
    }
}

/// Parse one move coordinate.
///
/// Integers, integral floats and numeric strings are accepted. Floats are
/// truncated toward zero. Anything else, including booleans and `null`, is
/// an invalid coordinate. Range checking is left to the board.
pub fn parse_coordinate(value: &Value) -> Result<i64> {
    let invalid = || ProtocolError::InvalidCoordinate(value.to_string());
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            })
            .ok_or_else(invalid),
        Value::String(text) => text.trim().parse().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// An event sent by the server to one or more sessions.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected { sid: SessionId },
    Waiting { msg: String },
    RoomJoined { room: RoomId, symbol: Symbol },
    StartGame { turn: Symbol },
    StateUpdate(StateSnapshot),
    Error { msg: String },
    OpponentLeft { msg: String },
}

impl ServerEvent {
    pub fn waiting() -> Self {
        Self::Waiting {
            msg: WAITING_MESSAGE.to_string(),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error { msg: msg.into() }
    }

    pub fn opponent_left() -> Self {
        Self::OpponentLeft {
            msg: OPPONENT_LEFT_MESSAGE.to_string(),
        }
    }

    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Waiting { .. } => "waiting",
            Self::RoomJoined { .. } => "room_joined",
            Self::StartGame { .. } => "start_game",
            Self::StateUpdate(_) => "state_update",
            Self::Error { .. } => "error",
            Self::OpponentLeft { .. } => "opponent_left",
        }
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected { sid } => write!(f, "connected as {sid}"),
            Self::RoomJoined { room, symbol } => write!(f, "joined room {room} as {symbol}"),
            Self::StartGame { turn } => write!(f, "game started, {turn} to move"),
            Self::StateUpdate(snapshot) => match (snapshot.turn, snapshot.winner) {
                (_, Some(winner)) => write!(f, "state update, winner {winner}"),
                (Some(turn), None) => write!(f, "state update, {turn} to move"),
                (None, None) => write!(f, "state update"),
            },
            Self::Waiting { msg } | Self::Error { msg } | Self::OpponentLeft { msg } => {
                write!(f, "{}: {msg}", self.name())
            }
        }
    }
}
