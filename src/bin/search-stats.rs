use std::{env, time::Instant};

use anyhow::Context;
use chess_opponent::engine::{selector::select_move, Difficulty, SearchStats};
use chess_opponent::{Board, Result, Rules, START_BOARD_FEN};
use rand::thread_rng;

/// Usage: `search-stats [FEN]`, logging is configured through `RUST_LOG`.
fn main() -> Result<()> {
    env_logger::init();

    let fen = env::args().nth(1).unwrap_or_else(|| START_BOARD_FEN.to_string());
    let board = Board::from_fen(&fen).with_context(|| format!("parsing FEN {fen:?}"))?;

    if let Some(outcome) = board.outcome() {
        println!("Game is already over: {outcome:?}");
        return Ok(());
    }

    for difficulty in Difficulty::ALL {
        search_stats(board.clone(), difficulty)?;
    }
    Ok(())
}

fn search_stats(mut board: Board, difficulty: Difficulty) -> Result<()> {
    let mut stats = SearchStats::default();

    let start = Instant::now();
    let best_move = select_move(&mut board, difficulty, &mut thread_rng(), &mut stats)?;
    let elapsed = start.elapsed();

    let best_move = match best_move {
        Some(mve) => mve.to_string(),
        None => "none".to_string(),
    };
    println!(
        "Stats after a {difficulty} search for {} in {}:",
        board.side_to_move(),
        board.generate_fen(),
    );
    println!("best move: {best_move}\ntime: {elapsed:?}\n{stats:#?}");
    Ok(())
}
