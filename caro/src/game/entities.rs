use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;

use super::constants::{self, BOARD_SIZE};

/// One of the two markers placed on the board.
///
/// `X` always moves first: it is the waiting player in a multiplayer pairing
/// and the human in a solo room. `O` is the second player or the AI.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    pub const fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => constants::MARK_X,
            Self::O => constants::MARK_O,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = String::deserialize(deserializer)?;
        match repr.as_str() {
            constants::MARK_X => Ok(Self::X),
            constants::MARK_O => Ok(Self::O),
            other => Err(de::Error::custom(format!("unknown symbol {other:?}"))),
        }
    }
}

/// A single board square.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Taken(Symbol),
}

impl Cell {
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => constants::MARK_EMPTY,
            Self::Taken(symbol) => symbol.as_str(),
        }
    }
}

impl From<Symbol> for Cell {
    fn from(symbol: Symbol) -> Self {
        Self::Taken(symbol)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = String::deserialize(deserializer)?;
        match repr.as_str() {
            constants::MARK_EMPTY => Ok(Self::Empty),
            constants::MARK_X => Ok(Self::Taken(Symbol::X)),
            constants::MARK_O => Ok(Self::Taken(Symbol::O)),
            other => Err(de::Error::custom(format!("unknown cell {other:?}"))),
        }
    }
}

/// Board position. Serialized as a `[row, col]` pair, which is what clients
/// expect inside `winner_positions`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step by a signed offset, returning `None` when the result would be
    /// negative. Upper bounds are checked by the board.
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl Serialize for Coord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.row, self.col).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (row, col) = <(usize, usize)>::deserialize(deserializer)?;
        Ok(Self { row, col })
    }
}

/// Outcome of a finished game.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Winner {
    Symbol(Symbol),
    Draw,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Symbol(symbol) => symbol.as_str(),
            Self::Draw => constants::DRAW,
        };
        write!(f, "{repr}")
    }
}

impl Serialize for Winner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Winner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = String::deserialize(deserializer)?;
        match repr.as_str() {
            constants::DRAW => Ok(Self::Draw),
            constants::MARK_X => Ok(Self::Symbol(Symbol::X)),
            constants::MARK_O => Ok(Self::Symbol(Symbol::O)),
            other => Err(de::Error::custom(format!("unknown winner {other:?}"))),
        }
    }
}

/// Square grid of cells stored row-major.
///
/// Rooms always use [`BOARD_SIZE`], but the rules work on any square board,
/// which keeps tests small.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_SIZE)
    }
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Build a board from row strings, using `X`, `O` and `.` for empty.
    /// Any other character is treated as empty. Rows shorter than the
    /// board are padded with empty cells.
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut board = Self::new(rows.len());
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().take(board.size).enumerate() {
                let cell = match ch {
                    'X' => Cell::Taken(Symbol::X),
                    'O' => Cell::Taken(Symbol::O),
                    _ => Cell::Empty,
                };
                board.cells[row * board.size + col] = cell;
            }
        }
        board
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn contains(&self, coord: Coord) -> bool {
        coord.row < self.size && coord.col < self.size
    }

    pub fn get(&self, coord: Coord) -> Option<Cell> {
        self.contains(coord)
            .then(|| self.cells[coord.row * self.size + coord.col])
    }

    /// Whether `coord` is on the board and holds `symbol`.
    pub fn holds(&self, coord: Coord, symbol: Symbol) -> bool {
        self.get(coord) == Some(Cell::Taken(symbol))
    }

    pub fn is_empty_at(&self, coord: Coord) -> bool {
        self.get(coord) == Some(Cell::Empty)
    }

    /// Place a symbol. Returns `false` without touching the board when the
    /// cell is off the board or already taken.
    pub fn place(&mut self, coord: Coord, symbol: Symbol) -> bool {
        if !self.is_empty_at(coord) {
            return false;
        }
        self.cells[coord.row * self.size + coord.col] = Cell::Taken(symbol);
        true
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Coord::new(row, col)))
    }

    /// Empty coordinates in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.coords().filter(|&coord| self.is_empty_at(coord))
    }

    /// Coordinates holding `symbol` in row-major order.
    pub fn cells_of(&self, symbol: Symbol) -> impl Iterator<Item = Coord> + '_ {
        self.coords().filter(move |&coord| self.holds(coord, symbol))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.max(1))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => '.',
                    Cell::Taken(Symbol::X) => 'X',
                    Cell::Taken(Symbol::O) => 'O',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Serialized as a list of rows, each a list of `""`, `"X"` or `"O"`.
impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<Vec<Cell>>::deserialize(deserializer)?;
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return Err(de::Error::custom("board must be square"));
        }
        Ok(Self {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_serializes_as_string_grid() {
        let mut board = Board::new(2);
        board.place(Coord::new(0, 1), Symbol::X);
        board.place(Coord::new(1, 0), Symbol::O);

        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json, serde_json::json!([["", "X"], ["O", ""]]));
    }

    #[test]
    fn test_default_board_is_protocol_size() {
        let board = Board::default();
        assert_eq!(board.size(), 16);
        assert_eq!(board.empty_cells().count(), 256);
    }

    #[test]
    fn test_place_rejects_taken_and_off_board_cells() {
        let mut board = Board::new(3);
        assert!(board.place(Coord::new(1, 1), Symbol::X));
        assert!(!board.place(Coord::new(1, 1), Symbol::O));
        assert!(!board.place(Coord::new(3, 0), Symbol::O));
        assert_eq!(board.get(Coord::new(1, 1)), Some(Cell::Taken(Symbol::X)));
    }

    #[test]
    fn test_from_rows_matches_display() {
        let board = Board::from_rows(&["X..", ".O.", "..X"]);
        assert_eq!(board.to_string(), "X..\n.O.\n..X\n");
    }

    #[test]
    fn test_winner_and_coord_wire_format() {
        assert_eq!(serde_json::to_value(Winner::Draw).unwrap(), "draw");
        assert_eq!(serde_json::to_value(Winner::Symbol(Symbol::O)).unwrap(), "O");
        assert_eq!(
            serde_json::to_value(Coord::new(3, 4)).unwrap(),
            serde_json::json!([3, 4])
        );
    }

    #[test]
    fn test_coord_offset_stops_at_zero() {
        assert_eq!(Coord::new(0, 2).offset(-1, 0), None);
        assert_eq!(Coord::new(1, 2).offset(-1, 1), Some(Coord::new(0, 3)));
    }
}
