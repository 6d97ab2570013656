//! Move selection for the computer-controlled `O` player.

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use std::{collections::HashMap, fmt};

use crate::game::{
    entities::{Board, Coord, Symbol},
    rules::{find_winning_move, run_length_through},
};

/// The AI always plays `O`.
pub const AI_SYMBOL: Symbol = Symbol::O;

/// The human opponent of the AI.
pub const HUMAN_SYMBOL: Symbol = Symbol::X;

/// Tunables for the layered heuristic.
///
/// The defaults reproduce the protocol's reference behaviour; tests rely on
/// them for deterministic replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    /// Human run lengths that must be cut, checked as full-board passes in
    /// this order.
    ///
    /// **Default**: `[4, 3]`
    pub threat_lengths: Vec<usize>,

    /// Chebyshev distance from a human stone within which empty cells are
    /// considered "near the action".
    ///
    /// **Default**: 2 (a 5x5 window)
    pub proximity_radius: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            threat_lengths: vec![4, 3],
            proximity_radius: 2,
        }
    }
}

/// Which rule produced a move.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MoveReason {
    /// Completes a five for the AI.
    Win,
    /// Stops the human from completing a five next move.
    Block,
    /// Cuts a human run of at least this length.
    Threat(usize),
    /// Most crowded empty cell near the human's stones.
    Proximity,
    /// No rule applied.
    Random,
}

impl fmt::Display for MoveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => write!(f, "win"),
            Self::Block => write!(f, "block"),
            Self::Threat(len) => write!(f, "threat-{len}"),
            Self::Proximity => write!(f, "proximity"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// Layered heuristic player.
///
/// Rules are tried in strict priority order and the first one that yields a
/// cell decides the move: win, block, threat suppression, proximity, random.
/// Tactics are never missed; there is no look-ahead beyond one move.
#[derive(Debug)]
pub struct AiEngine {
    rng: StdRng,
    config: AiConfig,
}

impl Default for AiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AiEngine {
    /// Create an engine with default config and a randomly seeded fallback.
    pub fn new() -> Self {
        Self::with_config(AiConfig::default())
    }

    pub fn with_config(config: AiConfig) -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
            config,
        }
    }

    /// Create an engine whose random fallback is reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config: AiConfig::default(),
        }
    }

    /// Pick the AI's next cell, or `None` if the board is full.
    pub fn choose_move(&mut self, board: &Board) -> Option<Coord> {
        self.choose_move_with_reason(board).map(|(coord, _)| coord)
    }

    /// Like [`choose_move`](Self::choose_move) but also reports the rule
    /// that fired.
    pub fn choose_move_with_reason(&mut self, board: &Board) -> Option<(Coord, MoveReason)> {
        let empties: Vec<Coord> = board.empty_cells().collect();
        if empties.is_empty() {
            return None;
        }

        if let Some(coord) = find_winning_move(board, AI_SYMBOL) {
            return Some((coord, MoveReason::Win));
        }

        if let Some(coord) = find_winning_move(board, HUMAN_SYMBOL) {
            return Some((coord, MoveReason::Block));
        }

        if let Some((coord, len)) = self.threat_cut(board, &empties) {
            return Some((coord, MoveReason::Threat(len)));
        }

        if let Some(coord) = self.nearest_to_human(board) {
            return Some((coord, MoveReason::Proximity));
        }

        let coord = *empties.choose(&mut self.rng)?;
        log::debug!("AI falling back to random cell {coord}");
        Some((coord, MoveReason::Random))
    }

    /// First empty cell, row-major, where a human stone would make a run of
    /// at least the current threat length. Longer threats are checked over
    /// the whole board before shorter ones.
    fn threat_cut(&self, board: &Board, empties: &[Coord]) -> Option<(Coord, usize)> {
        self.config.threat_lengths.iter().find_map(|&len| {
            empties
                .iter()
                .find(|&&coord| run_length_through(board, coord, HUMAN_SYMBOL) >= len)
                .map(|&coord| (coord, len))
        })
    }

    /// Empty cell appearing most often in the windows around human stones.
    ///
    /// Human stones are visited in row-major order and each window is walked
    /// row-major; ties go to the cell seen first.
    fn nearest_to_human(&self, board: &Board) -> Option<Coord> {
        let radius = self.config.proximity_radius;
        let size = board.size();
        let mut order: Vec<Coord> = Vec::new();
        let mut counts: HashMap<Coord, usize> = HashMap::new();

        for stone in board.cells_of(HUMAN_SYMBOL) {
            let rows = stone.row.saturating_sub(radius)..(stone.row + radius + 1).min(size);
            for row in rows {
                let cols = stone.col.saturating_sub(radius)..(stone.col + radius + 1).min(size);
                for col in cols {
                    let coord = Coord::new(row, col);
                    if !board.is_empty_at(coord) {
                        continue;
                    }
                    let count = counts.entry(coord).or_insert(0);
                    if *count == 0 {
                        order.push(coord);
                    }
                    *count += 1;
                }
            }
        }

        let mut best: Option<(Coord, usize)> = None;
        for coord in order {
            let count = counts[&coord];
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((coord, count));
            }
        }
        best.map(|(coord, _)| coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::BOARD_SIZE;

    fn board_with(x: &[(usize, usize)], o: &[(usize, usize)]) -> Board {
        let mut board = Board::new(BOARD_SIZE);
        for &(r, c) in x {
            board.place(Coord::new(r, c), Symbol::X);
        }
        for &(r, c) in o {
            board.place(Coord::new(r, c), Symbol::O);
        }
        board
    }

    #[test]
    fn test_full_board_has_no_move() {
        let board = Board::from_rows(&["XO", "OX"]);
        assert_eq!(AiEngine::seeded(1).choose_move(&board), None);
    }

    #[test]
    fn test_takes_immediate_win() {
        let board = board_with(&[(5, 5), (6, 6)], &[(2, 0), (2, 1), (2, 2), (2, 3)]);
        let mut ai = AiEngine::seeded(1);
        assert_eq!(
            ai.choose_move_with_reason(&board),
            Some((Coord::new(2, 4), MoveReason::Win))
        );
    }

    #[test]
    fn test_blocks_immediate_loss() {
        let board = board_with(&[(9, 1), (9, 2), (9, 3), (9, 4)], &[(0, 0)]);
        let mut ai = AiEngine::seeded(1);
        // Both (9,0) and (9,5) block; row-major picks (9,0).
        assert_eq!(
            ai.choose_move_with_reason(&board),
            Some((Coord::new(9, 0), MoveReason::Block))
        );
    }

    #[test]
    fn test_win_beats_block() {
        let board = board_with(
            &[(10, 0), (10, 1), (10, 2), (10, 3)],
            &[(12, 0), (12, 1), (12, 2), (12, 3)],
        );
        let mut ai = AiEngine::seeded(1);
        assert_eq!(
            ai.choose_move_with_reason(&board),
            Some((Coord::new(12, 4), MoveReason::Win))
        );
    }

    #[test]
    fn test_four_in_a_row_is_answered_before_anything_else() {
        let board = board_with(&[(0, 0), (0, 1), (0, 2), (0, 3)], &[]);
        let mut ai = AiEngine::seeded(1);
        assert_eq!(ai.choose_move(&board), Some(Coord::new(0, 4)));

        // The threat pass on its own lands on the same cell.
        let empties: Vec<Coord> = board.empty_cells().collect();
        assert_eq!(ai.threat_cut(&board, &empties), Some((Coord::new(0, 4), 4)));
    }

    #[test]
    fn test_open_three_is_cut() {
        // X X X in the middle of row 7, both ends open.
        let board = board_with(&[(7, 6), (7, 7), (7, 8)], &[(0, 0)]);
        let mut ai = AiEngine::seeded(1);
        assert_eq!(
            ai.choose_move_with_reason(&board),
            Some((Coord::new(7, 5), MoveReason::Threat(4)))
        );
    }

    #[test]
    fn test_four_threat_pass_runs_before_three_threat_pass() {
        // A pair near the top gives a 3-run at (0,2); the split three further
        // down gives a 4-run at (8,7). The 4 wins despite coming later.
        let board = board_with(&[(0, 0), (0, 1), (8, 5), (8, 6), (8, 8)], &[]);
        let mut ai = AiEngine::seeded(1);
        assert_eq!(
            ai.choose_move_with_reason(&board),
            Some((Coord::new(8, 7), MoveReason::Threat(4)))
        );
    }

    #[test]
    fn test_two_stones_make_three_threat() {
        let board = board_with(&[(4, 4), (4, 5)], &[]);
        let mut ai = AiEngine::seeded(1);
        assert_eq!(
            ai.choose_move_with_reason(&board),
            Some((Coord::new(4, 3), MoveReason::Threat(3)))
        );
    }

    #[test]
    fn test_single_stone_uses_proximity() {
        let board = board_with(&[(7, 7)], &[]);
        let mut ai = AiEngine::seeded(1);
        // Every cell in the window appears once; the first one wins the tie.
        assert_eq!(
            ai.choose_move_with_reason(&board),
            Some((Coord::new(5, 5), MoveReason::Proximity))
        );
    }

    #[test]
    fn test_proximity_prefers_shared_neighbours() {
        // Stones far enough apart that no pair lines up, but whose windows
        // overlap on column 9.
        let board = board_with(&[(5, 7), (6, 11)], &[]);
        let mut ai = AiEngine::seeded(1);
        let (coord, reason) = ai.choose_move_with_reason(&board).unwrap();
        assert_eq!(reason, MoveReason::Proximity);
        assert_eq!(coord, Coord::new(4, 9));
    }

    #[test]
    fn test_proximity_window_is_clamped_at_edges() {
        let board = board_with(&[(0, 0)], &[]);
        let mut ai = AiEngine::seeded(1);
        assert_eq!(ai.choose_move(&board), Some(Coord::new(0, 1)));
    }

    #[test]
    fn test_empty_board_falls_back_to_random() {
        let board = Board::new(BOARD_SIZE);
        let mut ai = AiEngine::seeded(42);
        let (coord, reason) = ai.choose_move_with_reason(&board).unwrap();
        assert_eq!(reason, MoveReason::Random);
        assert!(board.is_empty_at(coord));
    }

    #[test]
    fn test_choose_move_leaves_board_untouched() {
        let board = board_with(&[(3, 3), (3, 4), (3, 5)], &[(4, 4)]);
        let before = board.clone();
        AiEngine::seeded(3).choose_move(&board);
        assert_eq!(board, before);
    }
}
