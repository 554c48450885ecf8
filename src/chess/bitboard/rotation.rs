//! Provides occupancy boards rotated so ranks, files and diagonals can be read as bytes
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use super::*;

/// Bit offset of each a1-h8 diagonal within the rotated board, indexed by diagonal number.
///
/// Diagonal number `d` runs from 0 (the single square h1) through 7 (the long diagonal
/// a1 to h8) to 14 (the single square a8), so `d = 7 + rank - file`. Diagonals are packed
/// end to end in that order, shortest first, exactly filling the 64 bits.
const DIAG_OFFSET: [u32; 15] = [0, 1, 3, 6, 10, 15, 21, 28, 36, 43, 49, 54, 58, 61, 63];

/// Number of squares on each a1-h8 diagonal, indexed by diagonal number
const DIAG_LEN: [u32; 15] = [1, 2, 3, 4, 5, 6, 7, 8, 7, 6, 5, 4, 3, 2, 1];

/// Bit offset of the a1-h8 diagonal through each square within the rotated board
const DIAG_INDEX: [u32; Square::COUNT] = [
    28, 21, 15, 10,  6,  3,  1,  0,
    36, 28, 21, 15, 10,  6,  3,  1,
    43, 36, 28, 21, 15, 10,  6,  3,
    49, 43, 36, 28, 21, 15, 10,  6,
    54, 49, 43, 36, 28, 21, 15, 10,
    58, 54, 49, 43, 36, 28, 21, 15,
    61, 58, 54, 49, 43, 36, 28, 21,
    63, 61, 58, 54, 49, 43, 36, 28,
];

/// Occupancy mask of the a1-h8 diagonal through each square, right-justified
const DIAG_MASK: [u64; Square::COUNT] = [
    0xff, 0x7f, 0x3f, 0x1f, 0x0f, 0x07, 0x03, 0x01,
    0x7f, 0xff, 0x7f, 0x3f, 0x1f, 0x0f, 0x07, 0x03,
    0x3f, 0x7f, 0xff, 0x7f, 0x3f, 0x1f, 0x0f, 0x07,
    0x1f, 0x3f, 0x7f, 0xff, 0x7f, 0x3f, 0x1f, 0x0f,
    0x0f, 0x1f, 0x3f, 0x7f, 0xff, 0x7f, 0x3f, 0x1f,
    0x07, 0x0f, 0x1f, 0x3f, 0x7f, 0xff, 0x7f, 0x3f,
    0x03, 0x07, 0x0f, 0x1f, 0x3f, 0x7f, 0xff, 0x7f,
    0x01, 0x03, 0x07, 0x0f, 0x1f, 0x3f, 0x7f, 0xff,
];

/// Bit offset of the a8-h1 diagonal through each square within the rotated board
///
/// Anti-diagonal number `s` is simply `rank + file`, running from 0 (the single square a1)
/// through 7 (the long diagonal a8 to h1) to 14 (the single square h8).
const ANTIDIAG_INDEX: [u32; Square::COUNT] = [
     0,  1,  3,  6, 10, 15, 21, 28,
     1,  3,  6, 10, 15, 21, 28, 36,
     3,  6, 10, 15, 21, 28, 36, 43,
     6, 10, 15, 21, 28, 36, 43, 49,
    10, 15, 21, 28, 36, 43, 49, 54,
    15, 21, 28, 36, 43, 49, 54, 58,
    21, 28, 36, 43, 49, 54, 58, 61,
    28, 36, 43, 49, 54, 58, 61, 63,
];

/// Occupancy mask of the a8-h1 diagonal through each square, right-justified
const ANTIDIAG_MASK: [u64; Square::COUNT] = [
    0x01, 0x03, 0x07, 0x0f, 0x1f, 0x3f, 0x7f, 0xff,
    0x03, 0x07, 0x0f, 0x1f, 0x3f, 0x7f, 0xff, 0x7f,
    0x07, 0x0f, 0x1f, 0x3f, 0x7f, 0xff, 0x7f, 0x3f,
    0x0f, 0x1f, 0x3f, 0x7f, 0xff, 0x7f, 0x3f, 0x1f,
    0x1f, 0x3f, 0x7f, 0xff, 0x7f, 0x3f, 0x1f, 0x0f,
    0x3f, 0x7f, 0xff, 0x7f, 0x3f, 0x1f, 0x0f, 0x07,
    0x7f, 0xff, 0x7f, 0x3f, 0x1f, 0x0f, 0x07, 0x03,
    0xff, 0x7f, 0x3f, 0x1f, 0x0f, 0x07, 0x03, 0x01,
];

/// Returns the a1-h8 diagonal number of `sq`
pub(super) fn diag_of(sq: Square) -> usize {
    7 + sq.rank() as usize - sq.file() as usize
}

/// Returns the a8-h1 diagonal number of `sq`
pub(super) fn antidiag_of(sq: Square) -> usize {
    sq.rank() as usize + sq.file() as usize
}

/// Returns the position of `sq` along its a1-h8 diagonal
pub(super) fn diag_pos(sq: Square) -> u32 {
    (sq.rank() as u32).min(sq.file() as u32)
}

/// Returns the position of `sq` along its a8-h1 diagonal
pub(super) fn antidiag_pos(sq: Square) -> u32 {
    sq.file() as u32 - (antidiag_of(sq) as u32).saturating_sub(7)
}

/// Returns the number of squares on a1-h8 diagonal `d`
pub(super) fn diag_len(d: usize) -> u32 {
    DIAG_LEN[d]
}

/// Returns the number of squares on a8-h1 diagonal `s`
pub(super) fn antidiag_len(s: usize) -> u32 {
    DIAG_LEN[s]
}

/// Returns the square at position `pos` along a1-h8 diagonal `d`
pub(super) fn square_on_diag(d: usize, pos: u32) -> Square {
    let (file, rank) = if d <= 7 {
        (pos as usize + 7 - d, pos as usize)
    } else {
        (pos as usize, pos as usize + d - 7)
    };

    Square::from_coord(
        File::try_from(file).expect("INFALLIBLE"),
        Rank::try_from(rank).expect("INFALLIBLE"),
    )
}

/// Returns the square at position `pos` along a8-h1 diagonal `s`
pub(super) fn square_on_antidiag(s: usize, pos: u32) -> Square {
    let file = pos as usize + s.saturating_sub(7);
    let rank = s - file;

    Square::from_coord(
        File::try_from(file).expect("INFALLIBLE"),
        Rank::try_from(rank).expect("INFALLIBLE"),
    )
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A set of occupied squares maintained in four orientations at once
///
/// Sliding attacks are computed by table lookup, one row at a time. A row here is any line a
/// sliding piece can travel: a rank, a file, or either kind of diagonal. The occupancy of the
/// row has to be available as a contiguous group of bits for the lookup to be cheap, which a
/// single bitboard can only provide for ranks. A `RotatedBitboard` therefore keeps three extra
/// copies of the occupied squares, one rotated by 90 degrees so files become contiguous, and
/// one for each diagonal direction with the diagonals packed end to end.
///
/// All four copies are updated together by [`toggle`](#method.toggle), and the
/// `*_occupancy` methods read the row through a given square out of the appropriate copy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RotatedBitboard {
    normal: Bitboard,
    rot90: Bitboard,
    diag: Bitboard,
    antidiag: Bitboard,
}

impl RotatedBitboard {
    /// Creates a new board with no occupied squares
    pub fn new() -> RotatedBitboard {
        Default::default()
    }

    /// Toggles the occupancy of `sq` in all four orientations
    pub fn toggle(&mut self, sq: Square) {
        let file = sq.file() as u32;
        let rank = sq.rank() as u32;

        self.normal ^= sq.into();
        self.rot90 ^= Bitboard(1 << (file * 8 + rank));
        self.diag ^= Bitboard(1 << (DIAG_INDEX[sq as usize] + diag_pos(sq)));
        self.antidiag ^= Bitboard(1 << (ANTIDIAG_INDEX[sq as usize] + antidiag_pos(sq)));
    }

    /// Returns `true` if `sq` is occupied
    pub fn contains(&self, sq: Square) -> bool {
        self.normal.contains(sq)
    }

    /// Returns the occupied squares in the normal orientation
    pub fn squares(&self) -> Bitboard {
        self.normal
    }

    /// Returns the occupancy of the rank containing `sq` as a byte, with the a file in the
    /// least significant bit
    pub fn rank_occupancy(&self, sq: Square) -> usize {
        ((u64::from(self.normal) >> (sq.rank() as u32 * 8)) & 0xff) as usize
    }

    /// Returns the occupancy of the file containing `sq` as a byte, with the first rank in
    /// the least significant bit
    pub fn file_occupancy(&self, sq: Square) -> usize {
        ((u64::from(self.rot90) >> (sq.file() as u32 * 8)) & 0xff) as usize
    }

    /// Returns the occupancy of the a1-h8 diagonal containing `sq`, right-justified, with
    /// the lowest square of the diagonal in the least significant bit
    pub fn diag_occupancy(&self, sq: Square) -> usize {
        ((u64::from(self.diag) >> DIAG_INDEX[sq as usize]) & DIAG_MASK[sq as usize]) as usize
    }

    /// Returns the occupancy of the a8-h1 diagonal containing `sq`, right-justified, with
    /// the queen-side square of the diagonal in the least significant bit
    pub fn antidiag_occupancy(&self, sq: Square) -> usize {
        ((u64::from(self.antidiag) >> ANTIDIAG_INDEX[sq as usize])
            & ANTIDIAG_MASK[sq as usize]) as usize
    }
}

impl From<RotatedBitboard> for Bitboard {
    fn from(board: RotatedBitboard) -> Bitboard {
        board.normal
    }
}
