//! Static evaluation: material plus piece-square bonuses.
//!
//! Scores are from white's point of view, positive favors white. Tables are
//! laid out like the board, index 0 is a8 and index 63 is h1, so they read as
//! seen from white's side.

use crate::{Color, Piece, PieceType, Rules};

pub type Score = i32;

#[rustfmt::skip]
pub const PAWN_TABLE: [Score; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
pub const KNIGHT_TABLE: [Score; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
pub const BISHOP_TABLE: [Score; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
pub const KING_TABLE: [Score; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

#[inline]
pub const fn piece_value(piece_type: PieceType) -> Score {
    match piece_type {
        PieceType::Pawn => 100,
        PieceType::Knight => 320,
        PieceType::Bishop => 330,
        PieceType::Rook => 500,
        PieceType::Queen => 900,
        PieceType::King => 20000,
    }
}

/// Flips a square between rank 1 and rank 8, keeping its file.
#[inline]
pub const fn mirror(square: u8) -> u8 {
    square ^ 56
}

/// Positional bonus of `piece` on `square`.
///
/// Pawn and king tables are read mirrored for black. Knight and bishop tables
/// are read as is for both colors, which is not symmetric: e.g. a knight on d2
/// gets 5 while a knight on d7 gets 0, for either color.
pub fn position_bonus(piece: Piece, square: u8) -> Score {
    let own_side = match piece.color() {
        Color::White => square,
        Color::Black => mirror(square),
    } as usize;
    let square = square as usize;

    match piece.typ() {
        PieceType::Pawn => PAWN_TABLE[own_side],
        PieceType::King => KING_TABLE[own_side],
        PieceType::Knight => KNIGHT_TABLE[square],
        PieceType::Bishop => BISHOP_TABLE[square],
        PieceType::Rook | PieceType::Queen => 0,
    }
}

pub fn evaluate<R: Rules + ?Sized>(position: &R) -> Score {
    let mut score = 0;
    for square in 0..64u8 {
        if let Some(piece) = position.piece_at(square) {
            let value = piece_value(piece.typ()) + position_bonus(piece, square);
            match piece.color() {
                Color::White => score += value,
                Color::Black => score -= value,
            }
        }
    }
    score
}
