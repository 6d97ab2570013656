use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use caro::{
    bot::AiEngine,
    game::{Board, Coord, GameRoom, Symbol, find_winning_move, has_five_in_row},
};

/// Board with `stones` moves played in rings around the centre. The
/// `XXOO` stripe pattern never lines up more than two of a kind.
fn midgame_board(stones: usize) -> Board {
    let mut board = Board::default();
    let centre = board.size() / 2;
    let ring = (0..centre).flat_map(|radius| {
        (centre - radius..=centre + radius).flat_map(move |row| {
            (centre - radius..=centre + radius).map(move |col| Coord::new(row, col))
        })
    });
    let mut placed = 0;
    for coord in ring {
        if placed == stones {
            break;
        }
        let symbol = if (2 * coord.row + coord.col) % 4 < 2 {
            Symbol::X
        } else {
            Symbol::O
        };
        if board.place(coord, symbol) {
            placed += 1;
        }
    }
    board
}

/// Benchmark the full-board five scan
fn bench_has_five_in_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_five_in_row");
    for stones in [0, 20, 60] {
        let board = midgame_board(stones);
        group.bench_with_input(BenchmarkId::from_parameter(stones), &board, |b, board| {
            b.iter(|| has_five_in_row(black_box(board), Symbol::X));
        });
    }
    group.finish();
}

/// Benchmark the winning-move search the AI runs twice per reply
fn bench_find_winning_move(c: &mut Criterion) {
    let board = midgame_board(60);
    c.bench_function("find_winning_move/60_stones", |b| {
        b.iter(|| find_winning_move(black_box(&board), Symbol::O));
    });
}

/// Benchmark AI move selection at different stages of a game
fn bench_ai_choose_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("ai_choose_move");
    for stones in [1, 20, 60] {
        let board = midgame_board(stones);
        group.bench_with_input(BenchmarkId::from_parameter(stones), &board, |b, board| {
            let mut ai = AiEngine::seeded(7);
            b.iter(|| ai.choose_move(black_box(board)));
        });
    }
    group.finish();
}

/// Benchmark a human move plus AI reply in a solo room
fn bench_solo_turn(c: &mut Criterion) {
    c.bench_function("solo_turn", |b| {
        b.iter(|| {
            let mut room = GameRoom::solo(AiEngine::seeded(7));
            room.apply_move(Symbol::X, Coord::new(7, 7))
        });
    });
}

criterion_group!(
    benches,
    bench_has_five_in_row,
    bench_find_winning_move,
    bench_ai_choose_move,
    bench_solo_turn
);
criterion_main!(benches);
