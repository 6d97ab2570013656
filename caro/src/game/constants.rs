//! Protocol-visible constants shared by the engine and its clients.

/// Side length of every room's board.
pub const BOARD_SIZE: usize = 16;

/// Run length that wins the game.
pub const WIN_LENGTH: usize = 5;

pub const MARK_X: &str = "X";
pub const MARK_O: &str = "O";
pub const MARK_EMPTY: &str = "";

/// Wire value of `winner` when the board fills up without a five.
pub const DRAW: &str = "draw";
