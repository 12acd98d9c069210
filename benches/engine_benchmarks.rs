use chess_opponent::{
    engine::{choose_move, Difficulty},
    Board, START_BOARD_FEN,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const MIDDLE_GAME_FEN: &str =
    "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("choose_move");
    group.sample_size(10);
    for (name, fen) in [("start", START_BOARD_FEN), ("middle_game", MIDDLE_GAME_FEN)] {
        let board = Board::from_fen(fen).unwrap();
        for difficulty in [Difficulty::Medium, Difficulty::Hard] {
            group.bench_with_input(
                BenchmarkId::new(name, difficulty),
                &board,
                |b, board| {
                    b.iter(|| {
                        let mut board = board.clone();
                        choose_move(&mut board, difficulty).unwrap()
                    });
                },
            );
        }
    }
    group.finish();
}

fn legal_moves_benchmark(c: &mut Criterion) {
    use chess_opponent::Rules;

    let board = Board::from_fen(MIDDLE_GAME_FEN).unwrap();
    c.bench_function("legal_moves", |b| b.iter(|| board.legal_moves()));
}

criterion_group!(benches, criterion_benchmark, legal_moves_benchmark);
criterion_main!(benches);
