use core::fmt;
use std::{fmt::Display, num::NonZeroU8, ops::Not};

use anyhow::bail;

pub mod board;
pub mod engine;
pub mod rules;
mod zobrist;

pub use board::{Board, DrawReason, Outcome};
pub use rules::Rules;

pub type Result<T> = anyhow::Result<T>;

pub const START_BOARD_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceType {
    King = 0b001,
    Queen = 0b010,
    Bishop = 0b011,
    Knight = 0b100,
    Rook = 0b101,
    Pawn = 0b110,
}

impl PieceType {
    pub const ALL_TYPES: [PieceType; 6] = {
        use PieceType::*;
        [King, Queen, Bishop, Knight, Rook, Pawn]
    };

    /// Promotion targets in generation order. Queen comes first so a search
    /// that keeps the first of equal scores prefers it.
    pub const ALL_PROMOTION_TARGETS: [PieceType; 4] = {
        use PieceType::*;
        [Queen, Rook, Knight, Bishop]
    };

    fn from_bits(bits: u8) -> Option<PieceType> {
        use PieceType::*;
        match bits {
            0b001 => Some(King),
            0b010 => Some(Queen),
            0b011 => Some(Bishop),
            0b100 => Some(Knight),
            0b101 => Some(Rook),
            0b110 => Some(Pawn),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 0b1000,
}

impl Color {
    pub const ALL_COLORS: [Color; 2] = [Color::White, Color::Black];
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => f.write_str("White"),
            Color::Black => f.write_str("Black"),
        }
    }
}

impl Not for Color {
    type Output = Color;

    fn not(self) -> Self::Output {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// A piece packed into a single byte: the low three bits hold the
/// [PieceType], bit 3 the [Color].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece(NonZeroU8);

impl Piece {
    pub fn new(typ: PieceType, color: Color) -> Self {
        match NonZeroU8::new(typ as u8 | color as u8) {
            Some(bits) => Piece(bits),
            // every PieceType discriminant is non-zero
            None => unreachable!("piece type without bits"),
        }
    }

    #[inline(always)]
    pub fn typ(&self) -> PieceType {
        match PieceType::from_bits(self.0.get() & 0b111) {
            Some(typ) => typ,
            None => unreachable!("Invalid chess piece"),
        }
    }

    #[inline(always)]
    pub fn color(&self) -> Color {
        if self.0.get() & Color::Black as u8 == Color::Black as u8 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let typ = match c.to_ascii_lowercase() {
            'k' => PieceType::King,
            'q' => PieceType::Queen,
            'b' => PieceType::Bishop,
            'n' => PieceType::Knight,
            'r' => PieceType::Rook,
            'p' => PieceType::Pawn,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(typ, color))
    }

    pub fn fen_char(&self) -> char {
        let c = match self.typ() {
            PieceType::King => 'k',
            PieceType::Queen => 'q',
            PieceType::Bishop => 'b',
            PieceType::Knight => 'n',
            PieceType::Rook => 'r',
            PieceType::Pawn => 'p',
        };
        match self.color() {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Dense index in `0..12`, used to address per-piece tables.
    pub(crate) fn index(&self) -> usize {
        let typ = self.typ() as usize - 1;
        match self.color() {
            Color::White => typ * 2,
            Color::Black => typ * 2 + 1,
        }
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Piece")
            .field("type", &self.typ())
            .field("color", &self.color())
            .finish()
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoveType {
    #[default]
    Normal = 0,
    Castle,
    EnPassant,
    Promotion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub promote_to: Option<Piece>,
    pub typ: MoveType,
}

impl Move {
    pub fn new(from: u8, to: u8) -> Self {
        Move {
            from,
            to,
            promote_to: None,
            typ: MoveType::Normal,
        }
    }

    pub fn en_passant(from: u8, to: u8) -> Self {
        Move {
            from,
            to,
            promote_to: None,
            typ: MoveType::EnPassant,
        }
    }

    pub fn castle(from: u8, to: u8) -> Self {
        Move {
            from,
            to,
            promote_to: None,
            typ: MoveType::Castle,
        }
    }

    pub fn promotion(from: u8, to: u8, target: Piece) -> Self {
        Move {
            from,
            to,
            promote_to: Some(target),
            typ: MoveType::Promotion,
        }
    }

    /// Replaces the promotion target of a promotion with a queen of the same
    /// color. Any other move is returned as is.
    pub fn with_queen_promotion(self) -> Self {
        match self.promote_to {
            Some(piece) if self.typ == MoveType::Promotion => Move {
                promote_to: Some(Piece::new(PieceType::Queen, piece.color())),
                ..self
            },
            _ => self,
        }
    }
}

/// Coordinate notation, e.g. `e2e4` or `e7e8q`.
impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from), square_name(self.to))?;
        if let Some(piece) = self.promote_to {
            write!(f, "{}", piece.fen_char().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

/// Algebraic name of a board index. Index 0 is a8, index 63 is h1.
pub fn square_name(square: u8) -> String {
    let file = (b'a' + square % 8) as char;
    let rank = 8 - square / 8;
    format!("{file}{rank}")
}

/// Parses an algebraic square name like `e4` into a board index.
pub fn parse_square(name: &str) -> Result<u8> {
    let mut chars = name.chars();
    let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
        bail!("Expected a square like 'e4', got {name:?}");
    };
    if !('a'..='h').contains(&file) {
        bail!("Expected 'a-h' for file, got '{file}'");
    }
    if !('1'..='8').contains(&rank) {
        bail!("Expected '1-8' for rank, got '{rank}'");
    }
    let col = file as u8 - b'a';
    let row = 7 - (rank as u8 - b'1');
    Ok(row * 8 + col)
}
