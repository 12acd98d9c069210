use std::{collections::HashMap, ops::Index};

use anyhow::{bail, Context};
use log::trace;

use crate::{
    parse_square, square_name, zobrist::ZOBRIST_KEYS, Color, Move, MoveType, Piece, PieceType,
    Result,
};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
    (1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

/// Board index of column `x` and row `y`, if both are on the board.
/// Row 0 is the 8th rank.
#[inline]
fn bidx(x: i8, y: i8) -> Option<u8> {
    if (0..8).contains(&x) && (0..8).contains(&y) {
        Some((y * 8 + x) as u8)
    } else {
        None
    }
}

#[inline]
fn coords(square: u8) -> (i8, i8) {
    ((square % 8) as i8, (square / 8) as i8)
}

#[inline]
fn castle_row(color: Color) -> i8 {
    match color {
        Color::White => 7,
        Color::Black => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiecePositions {
    pub king: Option<u8>,
    pub castle_king: bool,
    pub castle_queen: bool,
}

impl PiecePositions {
    fn castle_hash(&self, color: Color) -> u64 {
        let keys = ZOBRIST_KEYS.castle(color);
        let mut hash = 0;
        if self.castle_king {
            hash ^= keys.king_side;
        }
        if self.castle_queen {
            hash ^= keys.queen_side;
        }
        hash
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    FiftyMoves,
    Repetition,
    InsufficientMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawReason),
}

/// Everything [Board::undo_move] needs to restore the position before a move.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    fields: [Option<Piece>; 64],
    white_pieces: PiecePositions,
    black_pieces: PiecePositions,
    next_move: Color,
    en_passant_square: Option<u8>,
    half_moves_since_capture: u32,
    full_move_count: u32,
    zobrist_hash: u64,
}

#[derive(Debug, Clone)]
pub struct Board {
    fields: [Option<Piece>; 64],

    pub white_pieces: PiecePositions,
    pub black_pieces: PiecePositions,

    pub next_move: Color,

    pub en_passant_square: Option<u8>,

    pub half_moves_since_capture: u32,
    pub full_move_count: u32,

    pub zobrist_hash: u64,

    previous_positions: HashMap<u64, u8>,
    history: Vec<Snapshot>,
}

impl PartialEq<Board> for Board {
    fn eq(&self, other: &Board) -> bool {
        // position only, move history and repetition counts are not compared
        self.fields == other.fields
            && self.white_pieces == other.white_pieces
            && self.black_pieces == other.black_pieces
            && self.next_move == other.next_move
            && self.en_passant_square == other.en_passant_square
            && self.half_moves_since_capture == other.half_moves_since_capture
            && self.full_move_count == other.full_move_count
    }
}
impl Eq for Board {}

impl Board {
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut parts = fen.split_whitespace();

        let placement = parts.next().context("Expected piece placement in FEN")?;
        let mut fields = [None; 64];
        let mut white_king = None;
        let mut black_king = None;

        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            bail!("Expected 8 rows in FEN, got {}", rows.len());
        }
        for (y, row) in rows.iter().enumerate() {
            let mut x = 0usize;
            for c in row.chars() {
                if let Some(empty) = c.to_digit(10) {
                    x += empty as usize;
                    continue;
                }
                let piece =
                    Piece::from_fen_char(c).with_context(|| format!("Unknown piece '{c}'"))?;
                if x >= 8 {
                    bail!("Row {} of FEN is longer than 8 squares", y + 1);
                }
                let idx = (y * 8 + x) as u8;
                if piece.typ() == PieceType::King {
                    match piece.color() {
                        Color::White => white_king = Some(idx),
                        Color::Black => black_king = Some(idx),
                    }
                }
                fields[idx as usize] = Some(piece);
                x += 1;
            }
            if x != 8 {
                bail!("Row {} of FEN does not cover 8 squares", y + 1);
            }
        }

        let next_move = match parts.next() {
            Some("w") => Color::White,
            Some("b") => Color::Black,
            c => bail!("Expected 'w' or 'b' for next move, got {c:?}"),
        };

        let mut white_pieces = PiecePositions {
            king: white_king,
            castle_king: false,
            castle_queen: false,
        };
        let mut black_pieces = PiecePositions {
            king: black_king,
            castle_king: false,
            castle_queen: false,
        };
        let castling = parts.next().context("Expected castling availability")?;
        if castling != "-" {
            for c in castling.chars() {
                match c {
                    'K' => white_pieces.castle_king = true,
                    'Q' => white_pieces.castle_queen = true,
                    'k' => black_pieces.castle_king = true,
                    'q' => black_pieces.castle_queen = true,
                    c => bail!("Expected castling availability but got '{c}'"),
                }
            }
        }

        let en_passant_square = match parts.next().context("Expected en-passant")? {
            "-" => None,
            square => Some(parse_square(square).context("en-passant square")?),
        };

        let half_moves_since_capture = match parts.next() {
            Some(half_moves) => half_moves
                .parse()
                .with_context(|| format!("Could not parse half-move-count {half_moves:?}"))?,
            None => 0,
        };
        let full_move_count = match parts.next() {
            Some(full_moves) => full_moves
                .parse()
                .with_context(|| format!("Could not parse move-count {full_moves:?}"))?,
            None => 1,
        };

        if parts.next().is_some() {
            bail!("Expected end of FEN");
        }

        let mut board = Board {
            fields,
            white_pieces,
            black_pieces,
            next_move,
            en_passant_square,
            half_moves_since_capture,
            full_move_count,
            zobrist_hash: 0,
            previous_positions: HashMap::new(),
            history: Vec::new(),
        };
        board.zobrist_hash = board.calculate_zobrist_hash();
        board.previous_positions.insert(board.zobrist_hash, 1);

        Ok(board)
    }

    pub fn calculate_zobrist_hash(&self) -> u64 {
        let mut hash = 0;
        if self.next_move == Color::Black {
            hash ^= ZOBRIST_KEYS.black_move;
        }
        if let Some(en_passant) = self.en_passant_square {
            hash ^= ZOBRIST_KEYS.en_passant(en_passant);
        }
        hash ^= self.white_pieces.castle_hash(Color::White);
        hash ^= self.black_pieces.castle_hash(Color::Black);

        for (i, piece) in self.fields.iter().enumerate() {
            if let Some(piece) = *piece {
                hash ^= ZOBRIST_KEYS.piece(i as u8, piece);
            }
        }

        hash
    }

    pub fn generate_fen(&self) -> String {
        let mut fen = String::new();

        for row in 0..8u8 {
            let mut empty_count = 0;
            for col in 0..8u8 {
                match self[row * 8 + col] {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(piece.fen_char())
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if row != 7 {
                fen.push('/');
            }
        }

        fen.push(' ');
        match self.next_move {
            Color::White => fen.push('w'),
            Color::Black => fen.push('b'),
        }
        fen.push(' ');

        let castling_start = fen.len();
        if self.white_pieces.castle_king {
            fen.push('K');
        }
        if self.white_pieces.castle_queen {
            fen.push('Q');
        }
        if self.black_pieces.castle_king {
            fen.push('k');
        }
        if self.black_pieces.castle_queen {
            fen.push('q');
        }
        if fen.len() == castling_start {
            fen.push('-');
        }
        fen.push(' ');

        match self.en_passant_square {
            Some(square) => fen.push_str(&square_name(square)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(
            " {} {}",
            self.half_moves_since_capture, self.full_move_count
        ));

        fen
    }

    #[inline]
    pub fn piece_positions(&self, color: Color) -> &PiecePositions {
        match color {
            Color::White => &self.white_pieces,
            Color::Black => &self.black_pieces,
        }
    }

    #[inline]
    fn piece_positions_mut(&mut self, color: Color) -> &mut PiecePositions {
        match color {
            Color::White => &mut self.white_pieces,
            Color::Black => &mut self.black_pieces,
        }
    }

    /// How often the current position occurred in this game, including now.
    pub fn repetition_count(&self) -> u8 {
        self.previous_positions
            .get(&self.zobrist_hash)
            .copied()
            .unwrap_or(0)
    }

    /// Number of moves that can be taken back with [Board::undo_move].
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn is_square_attacked(&self, square: u8, by: Color) -> bool {
        let (x, y) = coords(square);
        let is = |sq: Option<u8>, typ: PieceType| {
            sq.and_then(|sq| self[sq]) == Some(Piece::new(typ, by))
        };

        // a white pawn attacks towards row 0, so it sits one row below its target
        let pawn_row = match by {
            Color::White => y + 1,
            Color::Black => y - 1,
        };
        if is(bidx(x - 1, pawn_row), PieceType::Pawn) || is(bidx(x + 1, pawn_row), PieceType::Pawn)
        {
            return true;
        }

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(dx, dy)| is(bidx(x + dx, y + dy), PieceType::Knight))
        {
            return true;
        }
        if KING_OFFSETS
            .iter()
            .any(|&(dx, dy)| is(bidx(x + dx, y + dy), PieceType::King))
        {
            return true;
        }

        let slider_hits = |directions: &[(i8, i8)], typ: PieceType| {
            directions.iter().any(|&(dx, dy)| {
                let (mut px, mut py) = (x + dx, y + dy);
                while let Some(sq) = bidx(px, py) {
                    if let Some(piece) = self[sq] {
                        return piece.color() == by
                            && (piece.typ() == typ || piece.typ() == PieceType::Queen);
                    }
                    px += dx;
                    py += dy;
                }
                false
            })
        };

        slider_hits(&ROOK_DIRECTIONS[..], PieceType::Rook)
            || slider_hits(&BISHOP_DIRECTIONS[..], PieceType::Bishop)
    }

    pub fn is_in_check(&self, king_color: Color) -> bool {
        match self.piece_positions(king_color).king {
            Some(king) => self.is_square_attacked(king, !king_color),
            None => false,
        }
    }

    pub fn generate_legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(218);
        for pos in 0..64u8 {
            if let Some(piece) = self[pos] {
                if piece.color() == self.next_move {
                    moves = self.generate_pseudo_legal_moves(pos, piece, moves);
                }
            }
        }
        self.retain_legal(moves)
    }

    pub fn generate_legal_moves_for_piece(&self, piece_at: u8) -> Vec<Move> {
        let Some(piece) = self[piece_at] else {
            return vec![];
        };
        if piece.color() != self.next_move {
            return vec![];
        }

        // max moves for queen is 27, rook 14, bishop/pawn 12, king/knight 8
        let moves = self.generate_pseudo_legal_moves(piece_at, piece, Vec::with_capacity(14));
        self.retain_legal(moves)
    }

    pub fn has_legal_move(&self) -> bool {
        let mut scratch = self.scratch();
        for pos in 0..64u8 {
            if let Some(piece) = self[pos] {
                if piece.color() == self.next_move {
                    let moves = self.generate_pseudo_legal_moves(pos, piece, Vec::new());
                    if moves.into_iter().any(|m| scratch.leaves_king_safe(m)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if !self.has_legal_move() {
            return if self.is_in_check(self.next_move) {
                Some(Outcome::Checkmate {
                    winner: !self.next_move,
                })
            } else {
                Some(Outcome::Stalemate)
            };
        }
        if self.half_moves_since_capture >= 100 {
            return Some(Outcome::Draw(DrawReason::FiftyMoves));
        }
        if self.repetition_count() >= 3 {
            return Some(Outcome::Draw(DrawReason::Repetition));
        }
        if self.insufficient_material() {
            return Some(Outcome::Draw(DrawReason::InsufficientMaterial));
        }
        None
    }

    /// Bare kings, a single minor piece, or bishops that all stand on the same
    /// square color.
    pub fn insufficient_material(&self) -> bool {
        let mut others = 0;
        let mut minors = 0;
        let mut bishop_square_colors = [0u8; 2];
        for (i, piece) in self.fields.iter().enumerate() {
            let Some(piece) = piece else { continue };
            match piece.typ() {
                PieceType::King => {}
                PieceType::Bishop => {
                    others += 1;
                    minors += 1;
                    let (x, y) = coords(i as u8);
                    bishop_square_colors[((x + y) % 2) as usize] += 1;
                }
                PieceType::Knight => {
                    others += 1;
                    minors += 1;
                }
                _ => others += 1,
            }
        }

        let bishops = bishop_square_colors[0] + bishop_square_colors[1];
        others == 0
            || (others == 1 && minors == 1)
            || (others == bishops && bishop_square_colors.contains(&0))
    }

    /// Applies `mve` and records it so it can be taken back. This checks that
    /// a piece of the side to move stands on `mve.from`, but otherwise trusts
    /// the move to be legal.
    pub fn play_move(&mut self, mve: Move) -> Result<()> {
        match self[mve.from] {
            Some(piece) if piece.color() == self.next_move => {}
            Some(piece) => bail!(
                "Can't play {mve}: {:?} on {} belongs to {} but {} is to move",
                piece.typ(),
                square_name(mve.from),
                piece.color(),
                self.next_move
            ),
            None => bail!("Can't play {mve}: no piece on {}", square_name(mve.from)),
        }

        self.history.push(self.snapshot());
        self.play_unchecked(mve);
        *self.previous_positions.entry(self.zobrist_hash).or_insert(0) += 1;
        Ok(())
    }

    /// Takes back the last move made with [Board::play_move].
    pub fn undo_move(&mut self) -> Result<()> {
        let snapshot = self.history.pop().context("No move to undo")?;

        if let Some(count) = self.previous_positions.get_mut(&self.zobrist_hash) {
            *count -= 1;
            if *count == 0 {
                self.previous_positions.remove(&self.zobrist_hash);
            }
        }
        self.restore(snapshot);
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            fields: self.fields,
            white_pieces: self.white_pieces,
            black_pieces: self.black_pieces,
            next_move: self.next_move,
            en_passant_square: self.en_passant_square,
            half_moves_since_capture: self.half_moves_since_capture,
            full_move_count: self.full_move_count,
            zobrist_hash: self.zobrist_hash,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.fields = snapshot.fields;
        self.white_pieces = snapshot.white_pieces;
        self.black_pieces = snapshot.black_pieces;
        self.next_move = snapshot.next_move;
        self.en_passant_square = snapshot.en_passant_square;
        self.half_moves_since_capture = snapshot.half_moves_since_capture;
        self.full_move_count = snapshot.full_move_count;
        self.zobrist_hash = snapshot.zobrist_hash;
    }

    /// A copy of the position without game history, for trying out moves.
    fn scratch(&self) -> Board {
        let mut board = Board {
            fields: [None; 64],
            white_pieces: self.white_pieces,
            black_pieces: self.black_pieces,
            next_move: self.next_move,
            en_passant_square: None,
            half_moves_since_capture: 0,
            full_move_count: 0,
            zobrist_hash: 0,
            previous_positions: HashMap::new(),
            history: Vec::new(),
        };
        board.restore(self.snapshot());
        board
    }

    /// `self` must be a scratch board. Plays `mve` and takes it back again.
    fn leaves_king_safe(&mut self, mve: Move) -> bool {
        let color = self.next_move;
        let snapshot = self.snapshot();
        self.play_unchecked(mve);
        let safe = !self.is_in_check(color);
        self.restore(snapshot);
        safe
    }

    fn retain_legal(&self, mut moves: Vec<Move>) -> Vec<Move> {
        let mut scratch = self.scratch();
        moves.retain(|m| scratch.leaves_king_safe(*m));
        moves
    }

    fn generate_pseudo_legal_moves(
        &self,
        piece_at: u8,
        piece: Piece,
        moves: Vec<Move>,
    ) -> Vec<Move> {
        match piece.typ() {
            PieceType::King => self.generate_king_moves(piece_at, piece, moves),
            PieceType::Queen => {
                let moves = self.generate_sliding_moves(piece_at, piece, &ROOK_DIRECTIONS, moves);
                self.generate_sliding_moves(piece_at, piece, &BISHOP_DIRECTIONS, moves)
            }
            PieceType::Bishop => {
                self.generate_sliding_moves(piece_at, piece, &BISHOP_DIRECTIONS, moves)
            }
            PieceType::Knight => self.generate_step_moves(piece_at, piece, &KNIGHT_OFFSETS, moves),
            PieceType::Rook => {
                self.generate_sliding_moves(piece_at, piece, &ROOK_DIRECTIONS, moves)
            }
            PieceType::Pawn => self.generate_pawn_moves(piece_at, piece, moves),
        }
    }

    fn generate_step_moves(
        &self,
        piece_at: u8,
        piece: Piece,
        offsets: &[(i8, i8)],
        mut moves: Vec<Move>,
    ) -> Vec<Move> {
        let (x, y) = coords(piece_at);
        for &(dx, dy) in offsets {
            let Some(target) = bidx(x + dx, y + dy) else {
                continue;
            };
            match self[target] {
                Some(other) if other.color() == piece.color() => {}
                _ => moves.push(Move::new(piece_at, target)),
            }
        }
        moves
    }

    fn generate_sliding_moves(
        &self,
        piece_at: u8,
        piece: Piece,
        directions: &[(i8, i8)],
        mut moves: Vec<Move>,
    ) -> Vec<Move> {
        let (x, y) = coords(piece_at);
        for &(dx, dy) in directions {
            let (mut px, mut py) = (x + dx, y + dy);
            while let Some(target) = bidx(px, py) {
                match self[target] {
                    None => moves.push(Move::new(piece_at, target)),
                    Some(other) => {
                        if other.color() != piece.color() {
                            moves.push(Move::new(piece_at, target));
                        }
                        break;
                    }
                }
                px += dx;
                py += dy;
            }
        }
        moves
    }

    fn generate_pawn_moves(&self, piece_at: u8, piece: Piece, mut moves: Vec<Move>) -> Vec<Move> {
        let color = piece.color();
        let (dir, promotion_row, double_move_start) = match color {
            Color::White => (-1, 0, 6),
            Color::Black => (1, 7, 1),
        };
        let (x, y) = coords(piece_at);

        let mut add_moves = |target: u8| {
            if coords(target).1 == promotion_row {
                for promo in PieceType::ALL_PROMOTION_TARGETS {
                    moves.push(Move::promotion(piece_at, target, Piece::new(promo, color)));
                }
            } else {
                moves.push(Move::new(piece_at, target));
            }
        };

        if let Some(one) = bidx(x, y + dir) {
            if self[one].is_none() {
                add_moves(one);
                if y == double_move_start {
                    if let Some(two) = bidx(x, y + 2 * dir) {
                        if self[two].is_none() {
                            add_moves(two);
                        }
                    }
                }
            }
        }

        let mut en_passant = None;
        for dx in [-1, 1] {
            let Some(target) = bidx(x + dx, y + dir) else {
                continue;
            };
            if self.en_passant_square == Some(target) {
                en_passant = Some(target);
            } else if let Some(other) = self[target] {
                if other.color() != color {
                    add_moves(target);
                }
            }
        }
        if let Some(target) = en_passant {
            moves.push(Move::en_passant(piece_at, target));
        }

        moves
    }

    fn generate_king_moves(&self, piece_at: u8, piece: Piece, moves: Vec<Move>) -> Vec<Move> {
        let mut moves = self.generate_step_moves(piece_at, piece, &KING_OFFSETS, moves);

        let color = piece.color();
        let row = castle_row(color);
        if bidx(4, row) != Some(piece_at) {
            return moves;
        }

        let rights = self.piece_positions(color);
        if !rights.castle_king && !rights.castle_queen {
            return moves;
        }
        if self.is_in_check(color) {
            return moves;
        }

        let empty = |x| bidx(x, row).map_or(false, |sq| self[sq].is_none());
        let safe = |x| bidx(x, row).map_or(false, |sq| !self.is_square_attacked(sq, !color));
        let own_rook = |x| {
            bidx(x, row).and_then(|sq| self[sq]) == Some(Piece::new(PieceType::Rook, color))
        };

        if rights.castle_king && own_rook(7) && empty(5) && empty(6) && safe(5) && safe(6) {
            if let Some(to) = bidx(6, row) {
                moves.push(Move::castle(piece_at, to));
            }
        }
        if rights.castle_queen
            && own_rook(0)
            && empty(1)
            && empty(2)
            && empty(3)
            && safe(2)
            && safe(3)
        {
            if let Some(to) = bidx(2, row) {
                moves.push(Move::castle(piece_at, to));
            }
        }

        moves
    }

    fn move_piece(&mut self, from: u8, to: u8, piece: Piece) {
        self.fields[from as usize] = None;
        self.fields[to as usize] = Some(piece);
        self.zobrist_hash ^= ZOBRIST_KEYS.piece(from, piece) ^ ZOBRIST_KEYS.piece(to, piece);
    }

    fn remove_piece(&mut self, square: u8) -> Option<Piece> {
        let piece = self.fields[square as usize].take()?;
        self.zobrist_hash ^= ZOBRIST_KEYS.piece(square, piece);
        Some(piece)
    }

    /// Plays a move without recording it. Assumes the move is pseudo-legal.
    fn play_unchecked(&mut self, mve: Move) {
        let Some(piece) = self[mve.from] else {
            debug_assert!(false, "no piece on {}", square_name(mve.from));
            return;
        };
        let color = piece.color();
        debug_assert_eq!(color, self.next_move);

        let castle_before = self.white_pieces.castle_hash(Color::White)
            ^ self.black_pieces.castle_hash(Color::Black);
        if let Some(old_en_passant) = self.en_passant_square.take() {
            self.zobrist_hash ^= ZOBRIST_KEYS.en_passant(old_en_passant);
        }

        let mut reset_half_moves = piece.typ() == PieceType::Pawn;

        match mve.typ {
            MoveType::EnPassant => {
                let (to_x, _) = coords(mve.to);
                let (_, from_y) = coords(mve.from);
                if let Some(captured_at) = bidx(to_x, from_y) {
                    let captured = self.remove_piece(captured_at);
                    debug_assert_eq!(captured.map(|p| p.typ()), Some(PieceType::Pawn));
                    trace!("en passant {mve}: captured pawn on {}", square_name(captured_at));
                }
                self.move_piece(mve.from, mve.to, piece);
            }
            MoveType::Castle => {
                let (rook_from, rook_to) = if mve.to > mve.from {
                    (mve.to + 1, mve.to - 1)
                } else {
                    (mve.to - 2, mve.to + 1)
                };
                self.move_piece(mve.from, mve.to, piece);
                if let Some(rook) = self[rook_from] {
                    self.move_piece(rook_from, rook_to, rook);
                }
            }
            MoveType::Normal | MoveType::Promotion => {
                if self.remove_piece(mve.to).is_some() {
                    reset_half_moves = true;
                }
                let placed = match mve.promote_to {
                    Some(target) if mve.typ == MoveType::Promotion => target,
                    _ => piece,
                };
                self.remove_piece(mve.from);
                self.fields[mve.to as usize] = Some(placed);
                self.zobrist_hash ^= ZOBRIST_KEYS.piece(mve.to, placed);
            }
        }

        if piece.typ() == PieceType::King {
            let positions = self.piece_positions_mut(color);
            positions.king = Some(mve.to);
            positions.castle_king = false;
            positions.castle_queen = false;
        }
        // a rook leaving or being captured on its corner loses the right
        for square in [mve.from, mve.to] {
            match square {
                0 => self.black_pieces.castle_queen = false,
                7 => self.black_pieces.castle_king = false,
                56 => self.white_pieces.castle_queen = false,
                63 => self.white_pieces.castle_king = false,
                _ => {}
            }
        }
        let castle_after = self.white_pieces.castle_hash(Color::White)
            ^ self.black_pieces.castle_hash(Color::Black);
        self.zobrist_hash ^= castle_before ^ castle_after;

        if piece.typ() == PieceType::Pawn && mve.to.abs_diff(mve.from) == 16 {
            let en_passant = mve.to.min(mve.from) + 8;
            self.en_passant_square = Some(en_passant);
            self.zobrist_hash ^= ZOBRIST_KEYS.en_passant(en_passant);
        }

        if reset_half_moves {
            self.half_moves_since_capture = 0;
        } else {
            self.half_moves_since_capture += 1;
        }

        self.next_move = !self.next_move;
        self.zobrist_hash ^= ZOBRIST_KEYS.black_move;
        if self.next_move == Color::White {
            self.full_move_count += 1;
        }
    }
}

impl Index<u8> for Board {
    type Output = Option<Piece>;

    fn index(&self, index: u8) -> &Self::Output {
        &self.fields[index as usize]
    }
}
