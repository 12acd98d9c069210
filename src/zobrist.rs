use crate::{Color, Piece};
use lazy_static::lazy_static;
use rand::Rng;
use std::collections::HashSet;

lazy_static! {
    pub static ref ZOBRIST_KEYS: ZobristKeys = {
        #[cfg(test)]
        let mut rng = {
            use rand::rngs::StdRng;
            use rand::SeedableRng;
            StdRng::seed_from_u64(123456789)
        };
        #[cfg(not(test))]
        let mut rng = rand::thread_rng();

        ZobristKeys::new_random(&mut rng)
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastleKeys {
    pub king_side: u64,
    pub queen_side: u64,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ZobristKeys {
    pub black_move: u64,
    pub white_castle: CastleKeys,
    pub black_castle: CastleKeys,
    pub en_passant_col: [u64; 8],
    pub pieces: [[u64; 64]; 12],
}

impl ZobristKeys {
    pub fn new_random(rng: &mut impl Rng) -> Self {
        let mut used = HashSet::new();
        let mut next = || loop {
            let key = rng.next_u64();
            if key != 0 && used.insert(key) {
                break key;
            }
        };

        let black_move = next();
        let white_castle = CastleKeys {
            king_side: next(),
            queen_side: next(),
        };
        let black_castle = CastleKeys {
            king_side: next(),
            queen_side: next(),
        };
        let en_passant_col = std::array::from_fn(|_| next());
        let pieces = std::array::from_fn(|_| std::array::from_fn(|_| next()));

        ZobristKeys {
            black_move,
            white_castle,
            black_castle,
            en_passant_col,
            pieces,
        }
    }

    #[inline]
    pub fn castle(&self, color: Color) -> CastleKeys {
        match color {
            Color::White => self.white_castle,
            Color::Black => self.black_castle,
        }
    }

    #[inline]
    pub fn piece(&self, square: u8, piece: Piece) -> u64 {
        self.pieces[piece.index()][square as usize]
    }

    #[inline]
    pub fn en_passant(&self, square: u8) -> u64 {
        self.en_passant_col[(square % 8) as usize]
    }
}
