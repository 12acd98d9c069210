use super::eval::{evaluate, Score};
use crate::{Result, Rules};

/// Counters collected while searching. They never influence the result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// every call of the recursive search, leaves included
    pub positions_checked: u64,
    pub cutoffs: u64,
}

/// Minimax with alpha-beta pruning over `depth` plies.
///
/// Returns the score of `position` from white's point of view. `maximizing`
/// has to be true when white is to move. Moves are searched in the order the
/// rules engine generates them and a sibling loop stops as soon as
/// `beta <= alpha`.
///
/// The position is restored before returning, also when a cutoff happened or
/// the rules engine failed.
pub fn search<R: Rules + ?Sized>(
    position: &mut R,
    depth: u32,
    alpha: Score,
    beta: Score,
    maximizing: bool,
) -> Result<Score> {
    let mut stats = SearchStats::default();
    search_with_stats(position, depth, alpha, beta, maximizing, &mut stats)
}

pub fn search_with_stats<R: Rules + ?Sized>(
    position: &mut R,
    depth: u32,
    mut alpha: Score,
    mut beta: Score,
    maximizing: bool,
    stats: &mut SearchStats,
) -> Result<Score> {
    stats.positions_checked += 1;

    if depth == 0 || position.is_game_over() {
        return Ok(evaluate(&*position));
    }

    let moves = position.legal_moves();

    let mut best = if maximizing { Score::MIN } else { Score::MAX };
    for mve in moves {
        position.apply_move(mve)?;
        let score = search_with_stats(position, depth - 1, alpha, beta, !maximizing, stats);
        position.undo_move()?;
        let score = score?;

        if maximizing {
            best = best.max(score);
            alpha = alpha.max(score);
        } else {
            best = best.min(score);
            beta = beta.min(score);
        }
        if beta <= alpha {
            stats.cutoffs += 1;
            break;
        }
    }

    Ok(best)
}

#[cfg(test)]
mod test {
    use super::{search, search_with_stats, SearchStats};
    use crate::{
        board::test::{ENDGAME_PINS, KIWIPETE, PROMOTIONS},
        engine::eval::{evaluate, Score},
        Board, Color, Result, Rules, START_BOARD_FEN,
    };

    /// Plain minimax, every move of every node is visited.
    fn minimax(position: &mut Board, depth: u32, maximizing: bool) -> Score {
        if depth == 0 || position.is_game_over() {
            return evaluate(&*position);
        }
        let mut best = if maximizing { Score::MIN } else { Score::MAX };
        for mve in position.legal_moves() {
            position.apply_move(mve).unwrap();
            let score = minimax(position, depth - 1, !maximizing);
            position.undo_move().unwrap();
            best = if maximizing {
                best.max(score)
            } else {
                best.min(score)
            };
        }
        best
    }

    fn full_search(board: &mut Board, depth: u32) -> (Score, SearchStats) {
        let maximizing = board.side_to_move() == Color::White;
        let mut stats = SearchStats::default();
        let score =
            search_with_stats(board, depth, Score::MIN, Score::MAX, maximizing, &mut stats)
                .unwrap();
        (score, stats)
    }

    #[test]
    fn depth_zero_is_evaluation() {
        let mut board = Board::from_fen(KIWIPETE).unwrap();
        let expected = evaluate(&board);
        assert_eq!(
            search(&mut board, 0, Score::MIN, Score::MAX, true).unwrap(),
            expected
        );
    }

    #[test]
    fn game_over_is_evaluation() {
        // no mate bonus, the mated side's material is scored as is
        let mut board =
            Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        let expected = evaluate(&board);
        let (score, stats) = full_search(&mut board, 3);
        assert_eq!(score, expected);
        assert_eq!(stats.positions_checked, 1);
    }

    #[test]
    fn pruning_matches_minimax() {
        let positions: &[(&str, u32)] = &[
            (START_BOARD_FEN, 2),
            (START_BOARD_FEN, 3),
            (KIWIPETE, 2),
            (ENDGAME_PINS, 3),
            (PROMOTIONS, 2),
            ("7k/8/8/8/8/8/1q6/K7 w - - 0 1", 3),
            ("6k1/5ppp/8/8/8/8/5PPP/3R2K1 b - - 0 1", 3),
            ("4k3/8/3q4/8/3Q4/8/8/4K3 w - - 0 1", 3),
        ];
        for &(fen, depth) in positions {
            let mut board = Board::from_fen(fen).unwrap();
            let maximizing = board.side_to_move() == Color::White;
            let expected = minimax(&mut board, depth, maximizing);
            let (score, _) = full_search(&mut board, depth);
            assert_eq!(score, expected, "depth {depth} at fen \"{fen}\"");
        }
    }

    #[test]
    fn pruning_skips_work() {
        let mut board = Board::from_fen(START_BOARD_FEN).unwrap();
        let (_, stats) = full_search(&mut board, 3);
        assert!(stats.cutoffs > 0);
        // 1 + 20 + 400 + 8902 nodes without pruning
        assert!(stats.positions_checked < 1 + 20 + 400 + 8902);
    }

    #[test]
    fn position_is_restored() {
        for fen in [START_BOARD_FEN, KIWIPETE, ENDGAME_PINS, PROMOTIONS] {
            let mut board = Board::from_fen(fen).unwrap();
            let before = board.clone();
            for depth in 0..=2 {
                let (_, stats) = full_search(&mut board, depth);
                assert_eq!(board, before, "depth {depth}, {stats:?}");
                assert_eq!(board.zobrist_hash, before.zobrist_hash);
                assert_eq!(board.side_to_move(), before.side_to_move());
                assert_eq!(board.repetition_count(), before.repetition_count());
                assert_eq!(board.history_len(), 0);
            }
        }
    }

    #[test]
    fn narrow_window_cuts_and_restores() {
        let mut board = Board::from_fen(KIWIPETE).unwrap();
        let before = board.clone();
        let mut stats = SearchStats::default();
        search_with_stats(&mut board, 2, 0, 0, true, &mut stats).unwrap();
        assert!(stats.cutoffs > 0);
        assert_eq!(board, before);
        assert_eq!(board.history_len(), 0);
    }

    /// Rules engine whose moves can't be taken back.
    struct BrokenUndo(Board);

    impl Rules for BrokenUndo {
        fn side_to_move(&self) -> Color {
            self.0.side_to_move()
        }
        fn is_game_over(&self) -> bool {
            self.0.is_game_over()
        }
        fn legal_moves(&self) -> Vec<crate::Move> {
            self.0.legal_moves()
        }
        fn legal_moves_from(&self, square: u8) -> Vec<crate::Move> {
            self.0.legal_moves_from(square)
        }
        fn apply_move(&mut self, mve: crate::Move) -> Result<()> {
            self.0.apply_move(mve)
        }
        fn undo_move(&mut self) -> Result<()> {
            anyhow::bail!("undo is not supported")
        }
        fn piece_at(&self, square: u8) -> Option<crate::Piece> {
            self.0.piece_at(square)
        }
    }

    #[test]
    fn rules_errors_propagate() {
        let mut broken = BrokenUndo(Board::from_fen(START_BOARD_FEN).unwrap());
        let err = search(&mut broken, 2, Score::MIN, Score::MAX, true).unwrap_err();
        assert!(err.to_string().contains("undo is not supported"));
    }
}
