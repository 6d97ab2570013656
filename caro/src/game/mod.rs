//! Caro game engine: board, win detection and the per-room state machine.

pub mod constants;
pub mod entities;
pub mod rules;
pub mod state_machine;

pub use entities::{Board, Cell, Coord, Symbol, Winner};
pub use rules::{find_winning_move, has_five_in_row, run_length_through};
pub use state_machine::{GameRoom, MoveError, MoveOutcome, StateSnapshot};
