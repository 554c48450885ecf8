//! Provides data and functions used to compute attacks
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use lazy_static::lazy_static;
use super::*;
use super::rotation;

lazy_static! {
    /// Attacks along a single row of eight squares, indexed by the attacker's position within
    /// the row and the row's occupancy byte
    static ref ROW_ATTACKS: [[u8; 256]; 8] = row_attacks_table();

    static ref RANK_ATTACKS: [[Bitboard; 256]; Square::COUNT] = rank_attacks_table();
    static ref FILE_ATTACKS: [[Bitboard; 256]; Square::COUNT] = file_attacks_table();
    static ref DIAG_ATTACKS: [[Bitboard; 256]; Square::COUNT] = diag_attacks_table();
    static ref ANTIDIAG_ATTACKS: [[Bitboard; 256]; Square::COUNT] = antidiag_attacks_table();

    static ref KNIGHT_ATTACKS: [Bitboard; Square::COUNT] = step_attacks_table(
        &[(-2, -1), (-2, 1), (-1, -2), (-1, 2), (1, -2), (1, 2), (2, -1), (2, 1)]);
    static ref KING_ATTACKS: [Bitboard; Square::COUNT] = step_attacks_table(
        &[(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)]);
}

/// Computes the attacks within a single row for every combination of attacker position and
/// row occupancy
///
/// The attacker slides outward in both directions, and each occupied square it reaches ends
/// the slide in that direction. The occupied square itself is included in the attacks.
fn row_attacks_table() -> [[u8; 256]; 8] {
    let mut table = [[0u8; 256]; 8];

    for pos in 0..8 {
        for occ in 0..256usize {
            let mut att = 0u8;

            for f in pos+1..8 {
                att |= 1 << f;
                if occ & (1 << f) != 0 {
                    break;
                }
            }
            for f in (0..pos).rev() {
                att |= 1 << f;
                if occ & (1 << f) != 0 {
                    break;
                }
            }

            table[pos][occ] = att;
        }
    }

    table
}

/// Expands `ROW_ATTACKS` into full bitboards for attacks along each square's rank
fn rank_attacks_table() -> [[Bitboard; 256]; Square::COUNT] {
    let mut table = [[Bitboard::new(); 256]; Square::COUNT];

    for i in 0..Square::COUNT {
        let sq = Square::try_from(i).expect("INFALLIBLE");
        let pos = sq.file() as usize;
        let base = sq.rank() as u32 * 8;

        for occ in 0..256usize {
            table[i][occ] = Bitboard(u64::from(ROW_ATTACKS[pos][occ]) << base);
        }
    }

    table
}

/// Expands `ROW_ATTACKS` into full bitboards for attacks along each square's file
fn file_attacks_table() -> [[Bitboard; 256]; Square::COUNT] {
    let mut table = [[Bitboard::new(); 256]; Square::COUNT];

    for i in 0..Square::COUNT {
        let sq = Square::try_from(i).expect("INFALLIBLE");
        let pos = sq.rank() as usize;

        for occ in 0..256usize {
            let row = ROW_ATTACKS[pos][occ];
            let mut bd = Bitboard::new();

            for r in 0..8 {
                if row & (1 << r) != 0 {
                    bd.insert(Square::from_coord(
                        sq.file(), Rank::try_from(r).expect("INFALLIBLE")));
                }
            }

            table[i][occ] = bd;
        }
    }

    table
}

/// Expands `ROW_ATTACKS` into full bitboards for attacks along each square's a1-h8 diagonal
///
/// Diagonals shorter than eight squares only use the low entries of their row. The remaining
/// entries can never be indexed because the occupancy is masked to the diagonal's length.
fn diag_attacks_table() -> [[Bitboard; 256]; Square::COUNT] {
    let mut table = [[Bitboard::new(); 256]; Square::COUNT];

    for i in 0..Square::COUNT {
        let sq = Square::try_from(i).expect("INFALLIBLE");
        let d = rotation::diag_of(sq);
        let pos = rotation::diag_pos(sq) as usize;
        let len = rotation::diag_len(d);

        for occ in 0..(1usize << len) {
            let row = ROW_ATTACKS[pos][occ] & ((1u16 << len) - 1) as u8;
            let mut bd = Bitboard::new();

            for p in 0..len {
                if row & (1 << p) != 0 {
                    bd.insert(rotation::square_on_diag(d, p));
                }
            }

            table[i][occ] = bd;
        }
    }

    table
}

/// Expands `ROW_ATTACKS` into full bitboards for attacks along each square's a8-h1 diagonal
fn antidiag_attacks_table() -> [[Bitboard; 256]; Square::COUNT] {
    let mut table = [[Bitboard::new(); 256]; Square::COUNT];

    for i in 0..Square::COUNT {
        let sq = Square::try_from(i).expect("INFALLIBLE");
        let s = rotation::antidiag_of(sq);
        let pos = rotation::antidiag_pos(sq) as usize;
        let len = rotation::antidiag_len(s);

        for occ in 0..(1usize << len) {
            let row = ROW_ATTACKS[pos][occ] & ((1u16 << len) - 1) as u8;
            let mut bd = Bitboard::new();

            for p in 0..len {
                if row & (1 << p) != 0 {
                    bd.insert(rotation::square_on_antidiag(s, p));
                }
            }

            table[i][occ] = bd;
        }
    }

    table
}

/// Computes the attacks of a piece which steps directly to its destinations
fn step_attacks_table(steps: &[(i32, i32)]) -> [Bitboard; Square::COUNT] {
    let mut table = [Bitboard::new(); Square::COUNT];

    for i in 0..Square::COUNT {
        let sq = Square::try_from(i).expect("INFALLIBLE");
        let file = sq.file() as i32;
        let rank = sq.rank() as i32;

        for &(dx, dy) in steps {
            let (f, r) = (file + dx, rank + dy);
            if (0..8).contains(&f) && (0..8).contains(&r) {
                table[i].insert(Square::from_coord(
                    File::try_from(f as usize).expect("INFALLIBLE"),
                    Rank::try_from(r as usize).expect("INFALLIBLE")));
            }
        }
    }

    table
}

/// Computes sliding attacks along the rank of `sq` based on the occupied squares
/// given by `occ`
///
/// This function is similar to [`rook_attacks`](fn.rook_attacks.html), but only computes attacks
/// along a single rank. This function is useful for determining if the space is clear between the
/// king and a rook as required for castling.
///
/// ```rust
/// use windmill::chess::Square;
/// use windmill::chess::bitboard::{Bitboard, RotatedBitboard, rank_attacks};
///
/// // squares occupied by white rooks
/// let rooks = Bitboard::from(Square::A1) | Square::H1.into();
/// // occupied squares (those on the first rank, anyway)
/// let mut occ = RotatedBitboard::new();
/// for sq in rooks | Square::D1.into() | Square::E1.into() {
///     occ.toggle(sq);
/// }
/// // rooks with no pieces between them and the king on e1
/// let mut visible_rooks = rank_attacks(Square::E1, &occ) & rooks;
/// assert_eq!(visible_rooks.pop(), Some(Square::H1));
/// assert_eq!(visible_rooks.pop(), None);
/// ```
///
/// See also [Sliding Attacks (Bishops, Rooks and
/// Queens)](index.html#sliding-attacks-bishops-rooks-and-queens).
#[inline]
pub fn rank_attacks(sq: Square, occ: &RotatedBitboard) -> Bitboard {
    RANK_ATTACKS[sq as usize][occ.rank_occupancy(sq)]
}

/// Computes sliding attacks along the file of `sq` based on the occupied squares
/// given by `occ`
#[inline]
pub fn file_attacks(sq: Square, occ: &RotatedBitboard) -> Bitboard {
    FILE_ATTACKS[sq as usize][occ.file_occupancy(sq)]
}

/// Computes knight-like attacks to or from `sq`
///
/// See the crate-level documentation for more information about
/// [this function](index.html#direct-attacks-knights-and-kings) and
/// [other attack functions](index.html#moves-and-attacks).
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq as usize]
}

/// Computes bishop-like attacks to or from `sq` based on the occupied squares
/// given by `occ`
///
/// See the crate-level documentation for more information about
/// [this function](index.html#sliding-attacks-bishops-rooks-and-queens) and
/// [other attack functions](index.html#moves-and-attacks).
#[inline]
pub fn bishop_attacks(sq: Square, occ: &RotatedBitboard) -> Bitboard {
    DIAG_ATTACKS[sq as usize][occ.diag_occupancy(sq)]
        | ANTIDIAG_ATTACKS[sq as usize][occ.antidiag_occupancy(sq)]
}

/// Computes rook-like attacks to or from `sq` based on the occupied squares
/// given by `occ`
///
/// See the crate-level documentation for more information about
/// [this function](index.html#sliding-attacks-bishops-rooks-and-queens) and
/// [other attack functions](index.html#moves-and-attacks).
#[inline]
pub fn rook_attacks(sq: Square, occ: &RotatedBitboard) -> Bitboard {
    rank_attacks(sq, occ) | file_attacks(sq, occ)
}

/// Computes queen-like attacks to or from square based on the occupied squares
/// given by `occ`
///
/// See the crate-level documentation for more information about
/// [this function](index.html#sliding-attacks-bishops-rooks-and-queens) and
/// [other attack functions](index.html#moves-and-attacks).
#[inline]
pub fn queen_attacks(sq: Square, occ: &RotatedBitboard) -> Bitboard {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}

/// Computes king-like attacks to or from `sq`
///
/// See the crate-level documentation for more information about
/// [this function](index.html#direct-attacks-knights-and-kings) and
/// [other attack functions](index.html#moves-and-attacks).
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq as usize]
}

/// Computes the squares attacked by a pawn of the given color on `sq`
///
/// The attacked squares are returned regardless of whether a capture is actually possible
/// there.
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    let forward = match color {
        Color::White => 1,
        Color::Black => -1,
    };
    let bd = Bitboard::from(sq);

    bd.shift_xy(1, forward) | bd.shift_xy(-1, forward)
}
