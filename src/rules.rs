use crate::{Board, Color, Move, Piece, Result};

/// The rules-engine interface the search consumes. Implementors own the
/// position and know how to generate, play and take back legal moves.
///
/// [Rules::apply_move] and [Rules::undo_move] form a stack: every applied
/// move must be undone before the caller that applied it returns.
pub trait Rules {
    fn side_to_move(&self) -> Color;

    /// true on checkmate, stalemate and any drawing rule
    fn is_game_over(&self) -> bool;

    fn legal_moves(&self) -> Vec<Move>;

    /// Legal moves of the piece on `square`, empty if it does not belong to
    /// the side to move.
    fn legal_moves_from(&self, square: u8) -> Vec<Move>;

    fn apply_move(&mut self, mve: Move) -> Result<()>;

    /// Reverts the most recent [Rules::apply_move].
    fn undo_move(&mut self) -> Result<()>;

    fn piece_at(&self, square: u8) -> Option<Piece>;
}

impl Rules for Board {
    #[inline]
    fn side_to_move(&self) -> Color {
        self.next_move
    }

    fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    fn legal_moves(&self) -> Vec<Move> {
        self.generate_legal_moves()
    }

    fn legal_moves_from(&self, square: u8) -> Vec<Move> {
        self.generate_legal_moves_for_piece(square)
    }

    fn apply_move(&mut self, mve: Move) -> Result<()> {
        self.play_move(mve)
    }

    fn undo_move(&mut self) -> Result<()> {
        Board::undo_move(self)
    }

    #[inline]
    fn piece_at(&self, square: u8) -> Option<Piece> {
        self[square]
    }
}

#[cfg(test)]
mod test {
    use super::Rules;
    use crate::{Board, Color, PieceType, START_BOARD_FEN};

    #[test]
    fn board_through_rules() {
        let mut board = Board::from_fen(START_BOARD_FEN).unwrap();
        assert_eq!(board.side_to_move(), Color::White);
        assert!(!board.is_game_over());
        assert_eq!(Rules::legal_moves(&board).len(), 20);
        assert_eq!(board.legal_moves_from(62).len(), 2);
        assert_eq!(board.piece_at(60).map(|p| p.typ()), Some(PieceType::King));
        assert_eq!(board.piece_at(36), None);

        let mve = board.legal_moves()[0];
        board.apply_move(mve).unwrap();
        assert_eq!(board.side_to_move(), Color::Black);
        Rules::undo_move(&mut board).unwrap();
        assert_eq!(board, Board::from_fen(START_BOARD_FEN).unwrap());
    }

    #[test]
    fn mated_position_is_over() {
        let board =
            Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert!(board.is_game_over());
        assert!(board.legal_moves().is_empty());
    }
}
