use crate::{Board, Move, Result};

pub trait Engine {
    /// creates a new engine in the given position
    fn new_from_board(board: Board) -> Self;

    /// advance the position by `mve`. Waits for a running search first.
    fn accept_move(&mut self, mve: Move) -> Result<()>;

    /// start searching for the best move. This is done on a separate thread.
    fn start_search(&mut self);

    /// wait for the running search to finish. Searches can't be aborted.
    fn end_search(&mut self) -> Result<()>;

    /// returns the move the last finished search chose or `None`.
    /// This is `Some` after [Engine::start_search] and [Engine::end_search]
    /// have been called, unless the side to move had no legal move.
    fn best_move(&self) -> Option<Move>;
}

pub mod eval;
pub mod opponent;
pub mod search;
pub mod selector;

pub use eval::{evaluate, Score};
pub use opponent::{request_move, AiOpponent, OpponentConfig, PendingMove};
pub use search::{search, SearchStats};
pub use selector::{choose_move, choose_move_with_rng, Difficulty};
