use std::{fmt::Display, str::FromStr};

use anyhow::bail;
use log::debug;
use rand::{thread_rng, Rng};

use super::{
    eval::Score,
    search::{search_with_stats, SearchStats},
};
use crate::{Color, Move, Result, Rules};

/// Chance that [Difficulty::Easy] plays a random legal move instead of searching.
pub const EASY_RANDOM_MOVE_CHANCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// search depth in plies, the root move included
    pub const fn depth(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    pub const fn random_move_chance(self) -> Option<f64> {
        match self {
            Difficulty::Easy => Some(EASY_RANDOM_MOVE_CHANCE),
            Difficulty::Medium | Difficulty::Hard => None,
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => f.write_str("easy"),
            Difficulty::Medium => f.write_str("medium"),
            Difficulty::Hard => f.write_str("hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => bail!("Unknown difficulty {s:?}, expected easy, medium or hard"),
        }
    }
}

/// Picks a move for the side to move, or `None` if it has no legal move.
pub fn choose_move<R: Rules + ?Sized>(
    position: &mut R,
    difficulty: Difficulty,
) -> Result<Option<Move>> {
    choose_move_with_rng(position, difficulty, &mut thread_rng())
}

/// [choose_move] with a caller provided random number generator. Only
/// [Difficulty::Easy] draws from it.
pub fn choose_move_with_rng<R: Rules + ?Sized>(
    position: &mut R,
    difficulty: Difficulty,
    rng: &mut impl Rng,
) -> Result<Option<Move>> {
    let mut stats = SearchStats::default();
    select_move(position, difficulty, rng, &mut stats)
}

/// Root of the search. Every legal move is played and scored by a search one
/// ply shallower than the difficulty's depth. White keeps the first move with
/// the highest score, black the first with the lowest.
///
/// On [Difficulty::Easy] a random number is drawn before anything is searched;
/// below [EASY_RANDOM_MOVE_CHANCE] a uniformly random legal move is returned
/// instead. Promotions are always returned as queen promotions.
pub fn select_move<R: Rules + ?Sized>(
    position: &mut R,
    difficulty: Difficulty,
    rng: &mut impl Rng,
    stats: &mut SearchStats,
) -> Result<Option<Move>> {
    let moves = position.legal_moves();
    let Some(&first) = moves.first() else {
        return Ok(None);
    };

    if let Some(chance) = difficulty.random_move_chance() {
        if rng.gen::<f64>() < chance {
            let mve = moves[rng.gen_range(0..moves.len())];
            debug!("{difficulty}: playing random move {mve}");
            return Ok(Some(mve.with_queen_promotion()));
        }
    }

    let depth = difficulty.depth();
    let root_color = position.side_to_move();
    let mut best_move = first;
    let mut best_score = match root_color {
        Color::White => Score::MIN,
        Color::Black => Score::MAX,
    };

    for mve in moves {
        position.apply_move(mve)?;
        let maximizing = position.side_to_move() == Color::White;
        let score = search_with_stats(
            position,
            depth - 1,
            Score::MIN,
            Score::MAX,
            maximizing,
            stats,
        );
        position.undo_move()?;
        let score = score?;

        let better = match root_color {
            Color::White => score > best_score,
            Color::Black => score < best_score,
        };
        if better {
            best_score = score;
            best_move = mve;
        }
    }

    debug!(
        "{difficulty}: best move {best_move} with score {best_score} after checking {} positions",
        stats.positions_checked
    );
    Ok(Some(best_move.with_queen_promotion()))
}
