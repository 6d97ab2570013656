//! # Caro
//!
//! Real-time server core for Caro (Gomoku on a 16x16 board, five in a row
//! wins).
//!
//! Players either pair up through a single waiting slot or play solo against
//! a heuristic AI. Every room owns its board and turn state behind its own
//! lock; the transport layer only has to deliver [`net::messages::ServerEvent`]
//! values to sessions and room groups.
//!
//! ## Core Modules
//!
//! - [`game`]: Board, win detection and the per-room state machine
//! - [`bot`]: Layered heuristic AI for solo rooms
//! - [`net`]: Wire events exchanged with clients
//! - [`session`]: Session registry, matchmaking and event handling
//!
//! ## Example
//!
//! ```
//! use caro::game::{GameRoom, Coord, Symbol};
//!
//! let mut room = GameRoom::multiplayer();
//! let outcome = room.apply_move(Symbol::X, Coord::new(7, 7)).unwrap();
//! assert_eq!(outcome.snapshot.turn, Some(Symbol::O));
//! ```

/// Computer opponent for solo rooms.
pub mod bot;

/// Board, rules and room state machine.
pub mod game;
pub use game::{
    GameRoom, MoveError, StateSnapshot,
    constants::{self, BOARD_SIZE, WIN_LENGTH},
    entities,
};

/// Wire protocol between clients and server.
pub mod net;
pub use net::messages::{self, ClientEvent, ServerEvent};

/// Sessions, rooms and matchmaking.
pub mod session;
pub use session::{ChannelHub, EventSink, GameService, SessionId, SessionRegistry};
