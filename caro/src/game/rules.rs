//! Five-in-a-row detection.
//!
//! Everything here is a pure function over a [`Board`]; nothing mutates the
//! board it is given.

use super::{
    constants::WIN_LENGTH,
    entities::{Board, Coord, Symbol},
};

/// The four line directions as `(d_row, d_col)`.
pub const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// A winning run, in scan order.
pub type WinningLine = [Coord; WIN_LENGTH];

/// Checks the window starting at `origin` and stepping by `(d_row, d_col)`.
fn window(
    board: &Board,
    origin: Coord,
    d_row: isize,
    d_col: isize,
    symbol: Symbol,
) -> Option<WinningLine> {
    let mut line = [origin; WIN_LENGTH];
    for (k, slot) in line.iter_mut().enumerate() {
        let k = k as isize;
        let coord = origin.offset(d_row * k, d_col * k)?;
        if !board.holds(coord, symbol) {
            return None;
        }
        *slot = coord;
    }
    Some(line)
}

/// Find a five-in-a-row of `symbol`.
///
/// Windows are scanned in a fixed order: horizontal (row-major, left to
/// right), vertical (column-major, top to bottom), main diagonals (top-left
/// origin), then anti-diagonals (bottom-left origin, stepping up and right).
/// The first match wins, so when several runs exist the reported one is
/// deterministic.
pub fn has_five_in_row(board: &Board, symbol: Symbol) -> Option<WinningLine> {
    let n = board.size();
    if n < WIN_LENGTH {
        return None;
    }
    let span = n - WIN_LENGTH + 1;

    let horizontal = (0..n)
        .flat_map(|row| (0..span).map(move |col| (Coord::new(row, col), 0, 1)));
    let vertical = (0..n)
        .flat_map(|col| (0..span).map(move |row| (Coord::new(row, col), 1, 0)));
    let main_diagonal = (0..span)
        .flat_map(|row| (0..span).map(move |col| (Coord::new(row, col), 1, 1)));
    let anti_diagonal = (WIN_LENGTH - 1..n)
        .flat_map(|row| (0..span).map(move |col| (Coord::new(row, col), -1, 1)));

    horizontal
        .chain(vertical)
        .chain(main_diagonal)
        .chain(anti_diagonal)
        .find_map(|(origin, d_row, d_col)| window(board, origin, d_row, d_col, symbol))
}

/// Length of the contiguous run of `symbol` through `coord` along one
/// direction, counting `coord` itself as holding `symbol`.
fn run_along(board: &Board, coord: Coord, d_row: isize, d_col: isize, symbol: Symbol) -> usize {
    let mut count = 1;
    for sign in [1, -1] {
        let mut cursor = coord.offset(d_row * sign, d_col * sign);
        while let Some(next) = cursor.filter(|&c| board.holds(c, symbol)) {
            count += 1;
            cursor = next.offset(d_row * sign, d_col * sign);
        }
    }
    count
}

/// Longest run of `symbol` through `coord` over all four directions, as if
/// `symbol` were placed at `coord`. The cell's current content is ignored.
pub fn run_length_through(board: &Board, coord: Coord, symbol: Symbol) -> usize {
    DIRECTIONS
        .iter()
        .map(|&(d_row, d_col)| run_along(board, coord, d_row, d_col, symbol))
        .max()
        .unwrap_or(1)
}

/// First empty cell, in row-major order, where placing `symbol` completes a
/// five.
///
/// A placement can only create a new five through the placed cell, so only
/// the runs through each candidate are measured. If the board already holds
/// a five of `symbol`, every empty cell counts as winning and the first one
/// is returned.
pub fn find_winning_move(board: &Board, symbol: Symbol) -> Option<Coord> {
    if has_five_in_row(board, symbol).is_some() {
        return board.empty_cells().next();
    }
    board
        .empty_cells()
        .find(|&coord| run_length_through(board, coord, symbol) >= WIN_LENGTH)
}
