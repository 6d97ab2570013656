//! Per-room turn state machine.
//!
//! A [`GameRoom`] is either in progress or finished. Moves are validated,
//! applied, and checked for a five or a full board; solo rooms answer the
//! human's move with the AI's reply inside the same call so clients never
//! see the AI's turn as a separate state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    entities::{Board, Coord, Symbol, Winner},
    rules::{self, WinningLine},
};
use crate::bot::AiEngine;

/// Reasons a well-formed move is not applied.
///
/// None of these are reported to clients; the session layer drops them.
#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum MoveError {
    #[error("game already finished")]
    GameFinished,
    #[error("not your turn")]
    NotYourTurn,
    #[error("cell {0} is occupied")]
    CellOccupied(Coord),
    #[error("cell {0} is off the board")]
    OutOfBounds(Coord),
}

/// Lifecycle phase of a room.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    InProgress { turn: Symbol },
    Finished { winner: Winner },
}

/// Full room state as broadcast to clients after each accepted change.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub board: Board,
    pub turn: Option<Symbol>,
    pub finished: bool,
    pub winner: Option<Winner>,
    pub winner_positions: Vec<Coord>,
}

/// What happened during one accepted move.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MoveOutcome {
    pub mover: Symbol,
    pub coord: Coord,
    /// The AI's reply in a solo room, if it got to move.
    pub ai_reply: Option<Coord>,
    pub snapshot: StateSnapshot,
}

/// Board, turn and completion state of one game.
///
/// Solo rooms own the engine that plays `O` for them.
#[derive(Debug)]
pub struct GameRoom {
    board: Board,
    phase: Phase,
    ai: Option<AiEngine>,
    winner_positions: Vec<Coord>,
}

impl GameRoom {
    /// A fresh two-player game on the protocol-size board, X to move.
    pub fn multiplayer() -> Self {
        Self::with_board(Board::default(), None)
    }

    /// A fresh game against `ai`, which plays `O`.
    pub fn solo(ai: AiEngine) -> Self {
        Self::with_board(Board::default(), Some(ai))
    }

    /// A game starting from an arbitrary position with X to move.
    pub fn with_board(board: Board, ai: Option<AiEngine>) -> Self {
        Self {
            board,
            phase: Phase::InProgress { turn: Symbol::X },
            ai,
            winner_positions: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    pub fn turn(&self) -> Option<Symbol> {
        match self.phase {
            Phase::InProgress { turn } => Some(turn),
            Phase::Finished { .. } => None,
        }
    }

    pub fn winner(&self) -> Option<Winner> {
        match self.phase {
            Phase::InProgress { .. } => None,
            Phase::Finished { winner } => Some(winner),
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            board: self.board.clone(),
            turn: self.turn(),
            finished: self.is_finished(),
            winner: self.winner(),
            winner_positions: self.winner_positions.clone(),
        }
    }

    /// Apply a move for the player holding `mover`.
    ///
    /// In a solo room a non-terminal human move is followed by the AI's
    /// reply, and the turn comes back to the human unless the reply ends
    /// the game.
    pub fn apply_move(&mut self, mover: Symbol, coord: Coord) -> Result<MoveOutcome, MoveError> {
        let turn = match self.phase {
            Phase::Finished { .. } => return Err(MoveError::GameFinished),
            Phase::InProgress { turn } => turn,
        };
        if turn != mover {
            return Err(MoveError::NotYourTurn);
        }
        if !self.board.contains(coord) {
            return Err(MoveError::OutOfBounds(coord));
        }
        if !self.board.place(coord, mover) {
            return Err(MoveError::CellOccupied(coord));
        }
        self.settle(mover);

        let mut ai_reply = None;
        if self.turn() == Some(Symbol::O)
            && let Some(ai) = self.ai.as_mut()
            && let Some(reply) = ai.choose_move(&self.board)
        {
            self.board.place(reply, Symbol::O);
            self.settle(Symbol::O);
            ai_reply = Some(reply);
        }

        Ok(MoveOutcome {
            mover,
            coord,
            ai_reply,
            snapshot: self.snapshot(),
        })
    }

    /// Finish the game as a forfeit by `loser`, whatever the current turn.
    ///
    /// Returns `None` when the game was already over.
    pub fn apply_timeout(&mut self, loser: Symbol) -> Option<StateSnapshot> {
        if self.is_finished() {
            return None;
        }
        self.finish(Winner::Symbol(loser.opponent()), None);
        Some(self.snapshot())
    }

    /// Post-placement bookkeeping: win, draw or hand the turn over.
    fn settle(&mut self, mover: Symbol) {
        if let Some(line) = rules::has_five_in_row(&self.board, mover) {
            self.finish(Winner::Symbol(mover), Some(line));
        } else if self.board.is_full() {
            self.finish(Winner::Draw, None);
        } else {
            self.phase = Phase::InProgress {
                turn: mover.opponent(),
            };
        }
    }

    fn finish(&mut self, winner: Winner, line: Option<WinningLine>) {
        self.phase = Phase::Finished { winner };
        self.winner_positions = line.map(|l| l.to_vec()).unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solo_room(board: Board) -> GameRoom {
        GameRoom::with_board(board, Some(AiEngine::seeded(7)))
    }

    #[test]
    fn test_new_room_starts_with_x() {
        let room = GameRoom::multiplayer();
        assert_eq!(room.turn(), Some(Symbol::X));
        assert!(!room.is_finished());
        let snapshot = room.snapshot();
        assert_eq!(snapshot.board.size(), 16);
        assert!(snapshot.winner_positions.is_empty());
    }

    #[test]
    fn test_multiplayer_turn_alternates() {
        let mut room = GameRoom::multiplayer();
        room.apply_move(Symbol::X, Coord::new(0, 0)).unwrap();
        assert_eq!(room.turn(), Some(Symbol::O));
        assert_eq!(
            room.apply_move(Symbol::X, Coord::new(0, 1)),
            Err(MoveError::NotYourTurn)
        );
        room.apply_move(Symbol::O, Coord::new(0, 1)).unwrap();
        assert_eq!(room.turn(), Some(Symbol::X));
    }

    #[test]
    fn test_occupied_and_off_board_rejected_without_change() {
        let mut room = GameRoom::multiplayer();
        room.apply_move(Symbol::X, Coord::new(3, 3)).unwrap();
        let before = room.snapshot();
        assert_eq!(
            room.apply_move(Symbol::O, Coord::new(3, 3)),
            Err(MoveError::CellOccupied(Coord::new(3, 3)))
        );
        assert_eq!(
            room.apply_move(Symbol::O, Coord::new(16, 0)),
            Err(MoveError::OutOfBounds(Coord::new(16, 0)))
        );
        assert_eq!(room.snapshot(), before);
    }

    #[test]
    fn test_five_finishes_with_positions() {
        let board = Board::from_rows(&[
            "XXXX.", //
            "OOOO.",
            ".....",
            ".....",
            ".....",
        ]);
        let mut room = GameRoom::with_board(board, None);
        let outcome = room
            .apply_move(Symbol::X, Coord::new(0, 4))
            .unwrap();
        let snapshot = outcome.snapshot;
        assert!(snapshot.finished);
        assert_eq!(snapshot.turn, None);
        assert_eq!(snapshot.winner, Some(Winner::Symbol(Symbol::X)));
        assert_eq!(snapshot.winner_positions.len(), 5);
        assert_eq!(snapshot.winner_positions[4], Coord::new(0, 4));
    }

    #[test]
    fn test_finished_room_never_changes() {
        let board = Board::from_rows(&["XXXX.", "OOOO.", ".....", ".....", "....."]);
        let mut room = GameRoom::with_board(board, None);
        room.apply_move(Symbol::X, Coord::new(0, 4)).unwrap();
        let before = room.snapshot();
        assert_eq!(
            room.apply_move(Symbol::O, Coord::new(1, 4)),
            Err(MoveError::GameFinished)
        );
        assert_eq!(room.apply_timeout(Symbol::X), None);
        assert_eq!(room.snapshot(), before);
    }

    #[test]
    fn test_full_board_without_five_is_draw() {
        // 2x2 board: nothing can ever make five.
        let board = Board::from_rows(&["XO", "O."]);
        let mut room = GameRoom::with_board(board, None);
        let outcome = room
            .apply_move(Symbol::X, Coord::new(1, 1))
            .unwrap();
        assert!(outcome.snapshot.finished);
        assert_eq!(outcome.snapshot.winner, Some(Winner::Draw));
        assert!(outcome.snapshot.winner_positions.is_empty());
    }

    #[test]
    fn test_solo_ai_replies_and_turn_returns_to_human() {
        let mut room = solo_room(Board::default());
        let outcome = room
            .apply_move(Symbol::X, Coord::new(7, 7))
            .unwrap();
        let reply = outcome.ai_reply.expect("AI should reply on an open board");
        assert_ne!(reply, Coord::new(7, 7));
        assert!(room.board().holds(Coord::new(7, 7), Symbol::X));
        assert!(room.board().holds(reply, Symbol::O));
        assert_eq!(room.turn(), Some(Symbol::X));
        assert_eq!(outcome.snapshot.turn, Some(Symbol::X));
    }

    #[test]
    fn test_solo_ai_winning_reply_finishes_game() {
        let board = Board::from_rows(&[
            "OOOO.....",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            "X........",
        ]);
        let mut room = solo_room(board);
        let outcome = room
            .apply_move(Symbol::X, Coord::new(8, 8))
            .unwrap();
        assert_eq!(outcome.ai_reply, Some(Coord::new(0, 4)));
        assert_eq!(room.winner(), Some(Winner::Symbol(Symbol::O)));
        assert_eq!(outcome.snapshot.turn, None);
    }

    #[test]
    fn test_solo_human_win_skips_ai() {
        let board = Board::from_rows(&["XXXX.", "OOO..", ".....", ".....", "....."]);
        let mut room = solo_room(board);
        let outcome = room
            .apply_move(Symbol::X, Coord::new(0, 4))
            .unwrap();
        assert_eq!(outcome.ai_reply, None);
        assert_eq!(room.winner(), Some(Winner::Symbol(Symbol::X)));
    }

    #[test]
    fn test_solo_ai_reply_filling_board_is_draw() {
        // After X takes (2,0) only (2,1) is left, and no five fits on 3x3.
        let board = Board::from_rows(&["XOX", "OXO", "..O"]);
        let mut room = solo_room(board);
        let outcome = room.apply_move(Symbol::X, Coord::new(2, 0)).unwrap();
        assert_eq!(outcome.ai_reply, Some(Coord::new(2, 1)));
        assert!(room.board().is_full());
        assert_eq!(room.winner(), Some(Winner::Draw));
        assert_eq!(outcome.snapshot.turn, None);
        assert!(outcome.snapshot.winner_positions.is_empty());
    }

    #[test]
    fn test_timeout_awards_opponent_regardless_of_turn() {
        let mut room = GameRoom::multiplayer();
        let snapshot = room.apply_timeout(Symbol::O).unwrap();
        assert!(snapshot.finished);
        assert_eq!(snapshot.winner, Some(Winner::Symbol(Symbol::X)));
        assert!(snapshot.winner_positions.is_empty());
        assert_eq!(room.turn(), None);
    }
}
