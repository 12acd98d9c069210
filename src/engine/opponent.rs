use anyhow::{bail, Context};
use log::{debug, warn};

use super::{
    selector::{choose_move, Difficulty},
    Engine, Result,
};
use crate::{Board, Move, Rules};
use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

/// Delay before the opponent starts searching, so its reply doesn't appear
/// instantly.
pub const DEFAULT_MOVE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpponentConfig {
    pub difficulty: Difficulty,
    pub delay: Duration,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        OpponentConfig {
            difficulty: Difficulty::default(),
            delay: DEFAULT_MOVE_DELAY,
        }
    }
}

/// A move that is being chosen on a background thread.
///
/// There is no way to cancel it. Dropping a `PendingMove` detaches the
/// thread, which still runs to completion.
#[derive(Debug)]
pub struct PendingMove {
    handle: JoinHandle<Result<Option<Move>>>,
}

impl PendingMove {
    /// true once the delay has passed and the search finished
    pub fn is_ready(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the move is chosen.
    pub fn wait(self) -> Result<Option<Move>> {
        match self.handle.join() {
            Ok(result) => result.context("choosing a move"),
            Err(search_panic) => bail!("Search thread panicked: {search_panic:?}"),
        }
    }
}

/// Chooses a move for `position` without blocking the caller.
///
/// The background thread first sleeps for `delay` and only then searches.
/// `position` is moved onto that thread, so the caller's own copy of the game
/// is never touched.
pub fn request_move<R>(mut position: R, difficulty: Difficulty, delay: Duration) -> PendingMove
where
    R: Rules + Send + 'static,
{
    let handle = thread::spawn(move || {
        thread::sleep(delay);
        choose_move(&mut position, difficulty)
    });
    PendingMove { handle }
}

/// Computer opponent following a game.
///
/// Moves of both sides are fed in with [Engine::accept_move]. A search runs
/// on a background thread on a copy of the game, see [request_move].
pub struct AiOpponent {
    board: Board,
    config: OpponentConfig,
    pending: Option<PendingMove>,
    best_move: Option<Move>,
}

impl Engine for AiOpponent {
    fn new_from_board(board: Board) -> Self {
        AiOpponent::with_config(board, OpponentConfig::default())
    }

    fn accept_move(&mut self, mve: Move) -> Result<()> {
        if self.pending.is_some() {
            warn!("accepting {mve} while a search is running, waiting for it first");
            self.end_search()?;
        }
        if !self.board.legal_moves().contains(&mve) {
            bail!(
                "{mve} is not a legal move in {}",
                self.board.generate_fen()
            );
        }
        self.board.apply_move(mve)?;
        self.best_move = None;
        Ok(())
    }

    fn start_search(&mut self) {
        if self.pending.is_some() {
            return;
        }

        debug!(
            "starting {} search in {} after {:?}",
            self.config.difficulty,
            self.board.generate_fen(),
            self.config.delay
        );
        self.best_move = None;
        self.pending = Some(request_move(
            self.board.clone(),
            self.config.difficulty,
            self.config.delay,
        ));
    }

    fn end_search(&mut self) -> Result<()> {
        if let Some(pending) = self.pending.take() {
            self.best_move = pending.wait().context("end search")?;
        }
        Ok(())
    }

    fn best_move(&self) -> Option<Move> {
        self.best_move
    }
}

impl AiOpponent {
    pub fn with_config(board: Board, config: OpponentConfig) -> Self {
        AiOpponent {
            board,
            config,
            pending: None,
            best_move: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> OpponentConfig {
        self.config
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
    }

    pub fn is_searching(&self) -> bool {
        self.pending.as_ref().is_some_and(|pending| !pending.is_ready())
    }

    /// Searches from the current position and plays the chosen move.
    /// Returns `None` without changing anything if no move is left.
    pub fn play_reply(&mut self) -> Result<Option<Move>> {
        self.start_search();
        self.end_search()?;
        let Some(mve) = self.best_move else {
            return Ok(None);
        };
        self.accept_move(mve)?;
        Ok(Some(mve))
    }
}

#[cfg(test)]
mod test {
    use super::{request_move, AiOpponent, OpponentConfig, DEFAULT_MOVE_DELAY};
    use crate::{
        engine::{
            selector::{choose_move, Difficulty},
            Engine,
        },
        parse_square, Board, Color, Move, Rules, START_BOARD_FEN,
    };
    use std::time::{Duration, Instant};

    const NO_DELAY: Duration = Duration::ZERO;

    #[test]
    fn default_config() {
        let config = OpponentConfig::default();
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert_eq!(config.delay, DEFAULT_MOVE_DELAY);
    }

    #[test]
    fn request_matches_synchronous_choice() {
        let mut board = Board::from_fen(START_BOARD_FEN).unwrap();
        let expected = choose_move(&mut board, Difficulty::Medium).unwrap();

        let pending = request_move(board.clone(), Difficulty::Medium, NO_DELAY);
        assert_eq!(pending.wait().unwrap(), expected);
    }

    #[test]
    fn request_waits_for_delay() {
        let board = Board::from_fen(START_BOARD_FEN).unwrap();
        let delay = Duration::from_millis(150);

        let start = Instant::now();
        let pending = request_move(board, Difficulty::Medium, delay);
        assert!(!pending.is_ready());
        let mve = pending.wait().unwrap();
        assert!(start.elapsed() >= delay);
        assert!(mve.is_some());
    }

    #[test]
    fn request_without_moves_resolves_to_none() {
        let board = Board::from_fen("k7/8/1Q6/8/8/8/8/7K b - - 0 1").unwrap();
        let pending = request_move(board, Difficulty::Hard, NO_DELAY);
        assert_eq!(pending.wait().unwrap(), None);
    }

    #[test]
    fn changing_difficulty_keeps_delay() {
        let board = Board::from_fen(START_BOARD_FEN).unwrap();
        let mut opponent = AiOpponent::new_from_board(board);
        assert_eq!(opponent.config(), OpponentConfig::default());

        opponent.set_difficulty(Difficulty::Hard);
        assert_eq!(
            opponent.config(),
            OpponentConfig {
                difficulty: Difficulty::Hard,
                delay: DEFAULT_MOVE_DELAY,
            }
        );
    }

    #[test]
    fn searches_with_the_new_difficulty() {
        let config = OpponentConfig {
            difficulty: Difficulty::Easy,
            delay: NO_DELAY,
        };
        let mut board = Board::from_fen("k2r4/8/8/8/3Q4/8/8/7K w - - 0 1").unwrap();
        let expected = choose_move(&mut board, Difficulty::Hard).unwrap();

        let mut opponent = AiOpponent::with_config(board, config);
        opponent.set_difficulty(Difficulty::Hard);
        opponent.start_search();
        opponent.end_search().unwrap();
        assert_eq!(opponent.best_move(), expected);
    }

    #[test]
    fn opponent_plays_a_game() {
        let config = OpponentConfig {
            difficulty: Difficulty::Medium,
            delay: NO_DELAY,
        };
        let board = Board::from_fen(START_BOARD_FEN).unwrap();
        let mut opponent = AiOpponent::with_config(board, config);

        let e4 = Move::new(parse_square("e2").unwrap(), parse_square("e4").unwrap());
        opponent.accept_move(e4).unwrap();
        assert_eq!(opponent.board().side_to_move(), Color::Black);
        assert_eq!(opponent.best_move(), None);

        opponent.start_search();
        opponent.end_search().unwrap();
        let reply = opponent.best_move().unwrap();
        assert!(opponent.board().legal_moves().contains(&reply));

        opponent.accept_move(reply).unwrap();
        assert_eq!(opponent.board().side_to_move(), Color::White);
        assert_eq!(opponent.board().history_len(), 2);
    }

    #[test]
    fn opponent_rejects_illegal_moves() {
        let board = Board::from_fen(START_BOARD_FEN).unwrap();
        let mut opponent = AiOpponent::new_from_board(board);
        let illegal = Move::new(parse_square("e2").unwrap(), parse_square("e5").unwrap());
        assert!(opponent.accept_move(illegal).is_err());
        assert_eq!(opponent.board().history_len(), 0);
    }

    #[test]
    fn accept_move_waits_for_running_search() {
        let config = OpponentConfig {
            difficulty: Difficulty::Easy,
            delay: Duration::from_millis(50),
        };
        let board = Board::from_fen(START_BOARD_FEN).unwrap();
        let mut opponent = AiOpponent::with_config(board, config);
        opponent.start_search();
        assert!(opponent.is_searching());

        let e4 = Move::new(parse_square("e2").unwrap(), parse_square("e4").unwrap());
        opponent.accept_move(e4).unwrap();
        assert!(!opponent.is_searching());
        assert_eq!(opponent.best_move(), None);
        assert_eq!(opponent.board().side_to_move(), Color::Black);
    }

    #[test]
    fn self_play_stops_at_game_over() {
        let config = OpponentConfig {
            difficulty: Difficulty::Easy,
            delay: NO_DELAY,
        };
        // king and rook against king, the game ends by mate or a drawing rule
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let mut opponent = AiOpponent::with_config(board, config);
        for _ in 0..20 {
            if opponent.board().is_game_over() {
                break;
            }
            assert!(opponent.play_reply().unwrap().is_some());
        }
        assert!(opponent.board().history_len() <= 20);
    }
}
