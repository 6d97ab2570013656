//! Computer opponent for solo rooms.
//!
//! The engine is a layered heuristic rather than a search:
//!
//! 1. **Win**: complete a five for `O` if possible
//! 2. **Block**: occupy the cell that would complete a five for `X`
//! 3. **Threat suppression**: cut any `X` run that would reach 4, then 3
//! 4. **Proximity**: play the empty cell most surrounded by `X` stones
//! 5. **Random**: any empty cell
//!
//! ## Example
//!
//! ```
//! use caro::bot::AiEngine;
//! use caro::game::entities::{Board, Coord, Symbol};
//!
//! let mut board = Board::default();
//! board.place(Coord::new(7, 7), Symbol::X);
//!
//! let mut ai = AiEngine::seeded(1);
//! let reply = ai.choose_move(&board).unwrap();
//! assert!(board.is_empty_at(reply));
//! ```

pub mod decision;

pub use decision::{AI_SYMBOL, AiConfig, AiEngine, HUMAN_SYMBOL, MoveReason};
