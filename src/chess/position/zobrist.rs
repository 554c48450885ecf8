//! Contains structure and data for Zobrist hash keys
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use super::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A 64-bit hash key generated from a position
///
/// Keys are built up incrementally: every element of a position which distinguishes it from
/// other positions has its own random bit string, and the key is the exclusive or of the bit
/// strings of the elements present. Toggling an element in and out again restores the key,
/// which is what makes incremental maintenance during move making possible.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Zobrist(u64);

impl Zobrist {
    /// Creates a new zobrist key
    pub fn new() -> Zobrist {
        Zobrist(0)
    }

    /// Toggles piece placement
    pub fn toggle_piece_placement(&mut self, c: Color, p: Piece, sq: Square) {
        self.0 ^= KEYS.piece_placement[c as usize][p as usize][sq as usize];
    }

    /// Toggles an en passant file
    ///
    /// Every position carries exactly one en passant element, either one of the eight files
    /// or `None`, so replacing the file means toggling the old value out and the new value
    /// in.
    pub fn toggle_en_passant(&mut self, file: Option<File>) {
        let i = match file {
            Some(file) => file as usize,
            None => File::COUNT,
        };
        self.0 ^= KEYS.en_passant[i];
    }

    /// Toggles the castling state of one player on one side of the board
    pub fn toggle_castling(&mut self, c: Color, side: CastleSide, state: CastleState) {
        self.0 ^= KEYS.castling[c as usize][side as usize][state as usize];
    }

    /// Toggles whose turn it is
    pub fn toggle_turn(&mut self) {
        self.0 ^= KEYS.black_to_move;
    }
}

impl fmt::Display for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::UpperHex for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::LowerHex for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Octal for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Binary for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Zobrist> for u64 {
    /// Allows using the key to get a hash table index
    ///
    /// # Example
    /// ```rust
    /// use windmill::chess::Position;
    ///
    /// let pos = Position::new();
    /// let hash_table_size: usize = 0x10_0000;
    /// let index = u64::from(pos.zobrist_key()) as usize & (hash_table_size - 1);
    /// ```
    fn from(key: Zobrist) -> Self {
        key.0
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The random bit strings for every element of a position
struct Keys {
    piece_placement: [[[u64; Square::COUNT]; Piece::COUNT]; Color::COUNT],
    castling: [[[u64; CastleState::COUNT]; CastleSide::COUNT]; Color::COUNT],
    en_passant: [u64; File::COUNT + 1],
    black_to_move: u64,
}

/// Seed for the key generator, fixed so every run of the program agrees on the keys
const KEY_SEED: u64 = 0x7769_6e64_6d69_6c6c;

lazy_static! {
    static ref KEYS: Keys = Keys::generate();
}

impl Keys {
    fn generate() -> Keys {
        let mut rng = StdRng::seed_from_u64(KEY_SEED);
        let mut keys = Keys {
            piece_placement: [[[0; Square::COUNT]; Piece::COUNT]; Color::COUNT],
            castling: [[[0; CastleState::COUNT]; CastleSide::COUNT]; Color::COUNT],
            en_passant: [0; File::COUNT + 1],
            black_to_move: rng.gen(),
        };

        for c in 0..Color::COUNT {
            for p in 0..Piece::COUNT {
                for sq in 0..Square::COUNT {
                    keys.piece_placement[c][p][sq] = rng.gen();
                }
            }
        }
        for c in 0..Color::COUNT {
            for side in 0..CastleSide::COUNT {
                for state in 0..CastleState::COUNT {
                    keys.castling[c][side][state] = rng.gen();
                }
            }
        }
        for i in 0..=File::COUNT {
            keys.en_passant[i] = rng.gen();
        }

        keys
    }
}
