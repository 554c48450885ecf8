//! Provides a representation of the pieces on the board
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! # Moves and Attacks
//! Bitboards are useful for quickly computing the moves or attacks available to a piece based on
//! its location on the board. In addition to the [`Bitboard`](struct.Bitboard.html) type, the
//! `bitboard` module also provides functions to compute moves and attacks for all pieces except
//! pawns. For these pieces, the word "attacks" is used here as these pieces can only move to the
//! squares where they attack.
//!
//! ## Direct attacks (Knights and Kings)
//! Knights and kings move directly to their destinations without passing through any other squares.
//! That makes computing these attacks a bit easier than with the sliding pieces. For example, the
//! squares attacked by a knight on h1 can be computed as follows:
//!
//! ```rust
//! use windmill::chess::Square;
//! use windmill::chess::bitboard::knight_attacks;
//!
//! let mut attacks = knight_attacks(Square::H1);
//! assert_eq!(attacks.pop(), Some(Square::F2));
//! assert_eq!(attacks.pop(), Some(Square::G3));
//! assert_eq!(attacks.pop(), None);
//! ```
//!
//! King attacks can be computed in the same way.
//!
//! ## Sliding Attacks (Bishops, Rooks and Queens)
//! Moves by sliding pieces can be blocked by pieces in the path. The functions for sliding attacks
//! look up the blocking pieces in a [`RotatedBitboard`](struct.RotatedBitboard.html), which keeps
//! the occupied squares in four orientations so that any rank, file or diagonal can be read out as
//! a single byte. Here's an example of rook attacks:
//!
//! ```rust
//! use windmill::chess::Square;
//! use windmill::chess::bitboard::{RotatedBitboard, rook_attacks};
//!
//! // occupied squares
//! let mut occ = RotatedBitboard::new();
//! occ.toggle(Square::A2);
//! occ.toggle(Square::C1);
//!
//! let mut attacks = rook_attacks(Square::A1, &occ);
//! assert_eq!(attacks.pop(), Some(Square::B1));
//! assert_eq!(attacks.pop(), Some(Square::C1));
//! assert_eq!(attacks.pop(), Some(Square::A2));
//! assert_eq!(attacks.pop(), None);
//! ```
//!
//! Bishop and queen attacks can be computed in the same way.
//!
//! ## Pawn Advancements and Attacks
//! For pawns, there's not a function like those used for other piece attacks. Instead the
//! advancements and attacks of multiple pawns can be computed simultaneously using the
//! [`Bitboard::shift_y`](struct.Bitboard.html#method.shift_y) and
//! [`Bitboard::shift_xy`](struct.Bitboard.html#method.shift_xy) methods. These methods shift all
//! squares in a `Bitboard` by a specified amount. Squares shifted off an edge of the board are
//! discarded.
//!
//! The following example demonstrates how to compute non-capture pawn advancements. The following
//! code does not account for blocked pawns.
//!
//! ```rust
//! use windmill::chess::Square;
//! use windmill::chess::bitboard::Bitboard;
//!
//! let forward = -1; // black's turn, for white this would be 1
//! let pawns = Bitboard::from(Square::A7) | Square::B2.into();
//! let mut destinations = pawns.shift_y(forward);
//! assert_eq!(destinations.pop(), Some(Square::B1));
//! assert_eq!(destinations.pop(), Some(Square::A6));
//! assert_eq!(destinations.pop(), None);
//! ```
//!
//! The next example demonstrates how to compute pawn attacks:
//!
//! ```rust
//! use windmill::chess::Square;
//! use windmill::chess::bitboard::Bitboard;
//!
//! let forward = -1; // black's turn, for white this would be 1
//! let pawns = Bitboard::from(Square::A7) | Square::B2.into();
//!
//! // attacks toward king-side
//! let mut ks_attacks = pawns.shift_xy(1, forward);
//! assert_eq!(ks_attacks.pop(), Some(Square::C1));
//! assert_eq!(ks_attacks.pop(), Some(Square::B6));
//! assert_eq!(ks_attacks.pop(), None);
//!
//! // attacks toward queen side
//! // Note that since the pawn on a7 is on the far queen-side edge of the board, it
//! // has no attacks on that side. shift_xy handles this properly, without wrapping.
//! let mut qs_attacks = pawns.shift_xy(-1, forward);
//! assert_eq!(qs_attacks.pop(), Some(Square::A1));
//! assert_eq!(qs_attacks.pop(), None);
//! ```
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryInto;
use std::iter::FusedIterator;
use std::iter::{FromIterator, Extend};
use std::ops;
use std::fmt;
use super::*;

mod rotation;
pub use rotation::RotatedBitboard;

mod attacks;
pub use attacks::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A set of squares with each bit representing one square
///
/// A `Bitboard` is, essentially, a set of [`Square`](../enum.Square.html)s stored in a 64-bit
/// integer. Each bit corresponds to one `Square`. If the bit is set, that `Square` is present. If
/// it is clear, the `Square` is not present. Bits are assigned rank by rank, as shown in the
/// diagram below, so that an entire rank can be read out of the integer as one byte.
///
/// ```text
///      a    b    c    d    e    f    g    h
///     ---------------------------------------
///  8 | 56 | 57 | 58 | 59 | 60 | 61 | 62 | 63 | 8
///     ---------------------------------------
///  7 | 48 | 49 | 50 | 51 | 52 | 53 | 54 | 55 | 7
///     ---------------------------------------
///  6 | 40 | 41 | 42 | 43 | 44 | 45 | 46 | 47 | 6
///     ---------------------------------------
///  5 | 32 | 33 | 34 | 35 | 36 | 37 | 38 | 39 | 5
///     ---------------------------------------
///  4 | 24 | 25 | 26 | 27 | 28 | 29 | 30 | 31 | 4
///     ---------------------------------------
///  3 | 16 | 17 | 18 | 19 | 20 | 21 | 22 | 23 | 3
///     ---------------------------------------
///  2 | 08 | 09 | 10 | 11 | 12 | 13 | 14 | 15 | 2
///     ---------------------------------------
///  1 | 00 | 01 | 02 | 03 | 04 | 05 | 06 | 07 | 1
///     ---------------------------------------
///      a    b    c    d    e    f    g    h
/// ```
///
/// `Bitboard` implements all the bit-wise logic operators: `|`, `&`, `^`, `!`, `|=`, `&=`, and
/// `^=`. It also has methods that are typical for sets and collections, such as `insert`, `remove`,
/// `len`, and `contains`. It implements IntoIterator. However, since it's only a 64-bit value, it
/// implement's `Copy`, and there's no need for the borrowing iterator methods `iter` and
/// `iter_mut`.
///
/// The bit-shift operators are not implemented as they wouldn't be well-defined for a
/// 2-dimensional `Bitboard`. Instead, the methods, `shift_x`, `shift_y` and `shift_xy` are
/// provided. See the crate-level documentation for
/// [examples](index.html#pawn-advancements-and-attacks) of these methods.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Bitboard(u64);

impl Bitboard {
    /// Creates a new, empty bitboard
    pub fn new() -> Bitboard {
        Default::default()
    }

    /// Returns the number of squares in the bitboard
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the bitboard is empty
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the bitboard contains `sq`
    pub fn contains(self, sq: Square) -> bool {
        !(self & sq.into()).is_empty()
    }

    /// Returns `true` if `self` intersects `other`
    pub fn intersects(self, other: Bitboard) -> bool {
        !(self & other).is_empty()
    }

    /// Returns `true` if `self` does not intersect `other`
    pub fn is_disjoint(self, other: Bitboard) -> bool {
        (self & other).is_empty()
    }

    /// Adds a square to the bitboard if it is not already present
    pub fn insert(&mut self, sq: Square) {
        *self |= sq.into();
    }

    /// Removes a square from the bitboard if it is present
    pub fn remove(&mut self, sq: Square) {
        *self &= !Bitboard::from(sq);
    }

    /// Removes a square from the bitboard and returns it
    pub fn pop(&mut self) -> Option<Square> {
        if self.0 > 0 {
            // get the least significant bit
            let sq: Square = (self.0.trailing_zeros() as usize).try_into().expect("INFALLIBLE");
            // clear the least significant bit
            self.0 &= self.0 - 1;

            Some(sq)
        } else {
            None
        }
    }

    /// Returns the square that would be removed by a pop command
    pub fn peek(self) -> Option<Square> {
        if self.0 > 0 {
            // get the least significant bit
            Some((self.0.trailing_zeros() as usize).try_into().expect("INFALLIBLE"))
        } else {
            None
        }
    }

    /// Toggles a square in the bitboard
    pub fn toggle(&mut self, sq: Square) {
        *self ^= sq.into();
    }

    /// Returns a bitboard with all squares shifted by `x` files
    ///
    /// Squares shifted past the a or h file are discarded rather than wrapped into the
    /// neighboring rank.
    pub fn shift_x(self, x: i8) -> Bitboard {
        if x >= 0 {
            let row = (0xff << x as u32) & 0xff;
            Bitboard((self.0 << x as u32) & (row * 0x0101_0101_0101_0101))
        } else {
            let row = 0xffu64 >> -x as u32;
            Bitboard((self.0 >> -x as u32) & (row * 0x0101_0101_0101_0101))
        }
    }

    /// Returns a bitboard with all squares shifted by `y` ranks
    ///
    /// Squares shifted past the first or eighth rank are discarded.
    ///
    /// ```rust
    /// # use windmill::chess::Square;
    /// # use windmill::chess::bitboard::Bitboard;
    /// #
    /// assert_eq!(Bitboard::from(Square::A8).shift_y(1), Bitboard::new());
    /// assert_eq!(Bitboard::from(Square::B2).shift_y(-1), Bitboard::from(Square::B1));
    /// ```
    ///
    /// See the crate-level documentation for
    /// [another example](index.html#pawn-advancements-and-attacks) of this method.
    pub fn shift_y(self, y: i8) -> Bitboard {
        let bits = (y as i32) << 3;

        if bits > 0 {
            Bitboard(self.0 << bits)
        } else {
            Bitboard(self.0 >> -bits)
        }
    }

    /// Returns a bitboard with all squares shifted by `x` files and `y` ranks.
    ///
    /// Squares shifted off any edge of the board are discarded.
    ///
    /// See the crate-level documentation for
    /// [an example](index.html#pawn-advancements-and-attacks) of this method.
    pub fn shift_xy(self, x: i8, y: i8) -> Bitboard {
        self.shift_x(x).shift_y(y)
    }

    /// Returns a bitboard flipped vertically, so `Rank::R1` becomes `Rank::R8`
    pub fn swap_ranks(self) -> Bitboard {
        Bitboard(self.0.swap_bytes())
    }
}

impl ops::Not for Bitboard {
    type Output = Self;

    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

impl ops::BitAnd for Bitboard {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}

impl ops::BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0
    }
}

impl ops::BitOr for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl ops::BitXor for Bitboard {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl ops::BitXorAssign for Bitboard {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::LowerHex for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Octal for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Binary for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for Bitboard {
    fn from(val: u64) -> Bitboard {
        Bitboard(val)
    }
}

impl From<Bitboard> for u64 {
    fn from(bd: Bitboard) -> u64 {
        bd.0
    }
}

impl From<Square> for Bitboard {
    fn from(sq: Square) -> Bitboard {
        Bitboard(1 << sq as u64)
    }
}

impl From<File> for Bitboard {
    fn from(f: File) -> Bitboard {
        Bitboard(0x0101_0101_0101_0101 << f as u64)
    }
}

impl From<Rank> for Bitboard {
    fn from(r: Rank) -> Bitboard {
        Bitboard(0x0000_0000_0000_00ff << (8 * r as u64))
    }
}

impl From<IntoIter> for Bitboard {
    fn from(iter: IntoIter) -> Bitboard {
        iter.0
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl FromIterator<Square> for Bitboard {
    /// If converting from `bitboard::IntoIter`, use `Bitboard::from()` instead as that is faster
    fn from_iter<I: IntoIterator<Item=Square>>(iter: I) -> Self {
        let mut bd = Bitboard::new();

        for sq in iter {
            bd.insert(sq);
        }

        bd
    }
}

impl Extend<Square> for Bitboard {
    fn extend<I: IntoIterator<Item=Square>>(&mut self, iter: I) {
        for sq in iter {
            self.insert(sq);
        }
    }
}

/// Iterator over the squares of a `Bitboard`
#[derive(Debug, Copy, Clone)]
pub struct IntoIter(Bitboard);

impl Iterator for IntoIter {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop()
    }
}

impl ExactSizeIterator for IntoIter {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl FusedIterator for IntoIter { }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_operations() {
        // test new() method and Default trait
        assert_eq!(Bitboard::new(), Bitboard(0));
        assert_eq!(Bitboard::new(), Default::default());

        // test len() and is_empty() methods
        assert_eq!(Bitboard::new().len(), 0);
        assert!(Bitboard::new().is_empty());
        assert_eq!(Bitboard(0xffff_ffff_ffff_ffff).len(), 64);
        assert!(!Bitboard(0xffff_ffff_ffff_ffff).is_empty());

        // test contains() method
        assert!(Bitboard::from(Square::A1).contains(Square::A1));
        assert!(Bitboard::from(Square::H8).contains(Square::H8));
        assert!(!Bitboard::from(Square::A1).contains(Square::H8));
        assert!(!Bitboard::from(Square::H8).contains(Square::A1));

        // test insert(), remove() and toggle() methods
        let mut bd = Bitboard::new();
        bd.insert(Square::E4);
        bd.insert(Square::E4);
        assert_eq!(bd, Bitboard::from(Square::E4));
        bd.toggle(Square::D5);
        assert!(bd.contains(Square::D5));
        bd.toggle(Square::D5);
        bd.remove(Square::E4);
        assert!(bd.is_empty());

        // test pop() and peek() methods
        let mut bd = Bitboard::from(Square::H8) | Square::A1.into() | Square::E4.into();
        assert_eq!(bd.peek(), Some(Square::A1));
        assert_eq!(bd.pop(), Some(Square::A1));
        assert_eq!(bd.pop(), Some(Square::E4));
        assert_eq!(bd.pop(), Some(Square::H8));
        assert_eq!(bd.pop(), None);
        assert_eq!(bd.peek(), None);
    }

    #[test]
    fn squares_are_assigned_rank_by_rank() {
        assert_eq!(Bitboard::from(Square::A1), Bitboard(0x0000_0000_0000_0001));
        assert_eq!(Bitboard::from(Square::H1), Bitboard(0x0000_0000_0000_0080));
        assert_eq!(Bitboard::from(Square::A2), Bitboard(0x0000_0000_0000_0100));
        assert_eq!(Bitboard::from(Square::H8), Bitboard(0x8000_0000_0000_0000));
        assert_eq!(Bitboard::from(Rank::R1), Bitboard(0x0000_0000_0000_00ff));
        assert_eq!(Bitboard::from(Rank::R8), Bitboard(0xff00_0000_0000_0000));
        assert_eq!(Bitboard::from(File::A), Bitboard(0x0101_0101_0101_0101));
        assert_eq!(Bitboard::from(File::H), Bitboard(0x8080_8080_8080_8080));
    }

    #[test]
    fn shifts_discard_squares_pushed_off_the_board() {
        // file shifts must not wrap between the a and h files
        assert_eq!(Bitboard::from(Square::H3).shift_x(1), Bitboard::new());
        assert_eq!(Bitboard::from(Square::A3).shift_x(-1), Bitboard::new());
        assert_eq!(Bitboard::from(Square::G5).shift_x(1), Bitboard::from(Square::H5));
        assert_eq!(Bitboard::from(Square::B5).shift_x(-1), Bitboard::from(Square::A5));

        // rank shifts fall off the ends of the board
        assert_eq!(Bitboard::from(Square::E8).shift_y(1), Bitboard::new());
        assert_eq!(Bitboard::from(Square::E1).shift_y(-1), Bitboard::new());
        assert_eq!(Bitboard::from(Square::E2).shift_y(1), Bitboard::from(Square::E3));

        // combined shifts
        assert_eq!(Bitboard::from(Square::A2).shift_xy(-1, 1), Bitboard::new());
        assert_eq!(Bitboard::from(Square::H7).shift_xy(1, 1), Bitboard::new());
        assert_eq!(Bitboard::from(Square::E2).shift_xy(1, 1), Bitboard::from(Square::F3));
        assert_eq!(Bitboard::from(Square::E2).shift_xy(-1, 1), Bitboard::from(Square::D3));
    }

    #[test]
    fn swap_ranks_flips_the_board_vertically() {
        assert_eq!(Bitboard::from(Square::A1).swap_ranks(), Bitboard::from(Square::A8));
        assert_eq!(Bitboard::from(Square::E4).swap_ranks(), Bitboard::from(Square::E5));
        assert_eq!(Bitboard::from(Rank::R2).swap_ranks(), Bitboard::from(Rank::R7));
        assert_eq!(Bitboard::from(File::C).swap_ranks(), Bitboard::from(File::C));
    }

    #[test]
    fn formatting_matches_the_underlying_integer() {
        assert_eq!(format!("{}", Bitboard::from(0x0123456789abcdef)), "123456789abcdef");
        assert_eq!(format!("{:016}", Bitboard::from(0x0123456789abcdef)), "0123456789abcdef");
        assert_eq!(format!("{:x}", Bitboard::from(0x0123456789abcdef)), "123456789abcdef");
        assert_eq!(format!("{:016x}", Bitboard::from(0x0123456789abcdef)), "0123456789abcdef");
        assert_eq!(format!("{:X}", Bitboard::from(0x0123456789ABCDEF)), "123456789ABCDEF");
        assert_eq!(
            format!("{:o}", Bitboard::from(0x0123456789abcdef)),
            "4432126361152746757"
        );
        assert_eq!(
            format!("{:064b}", Bitboard::from(0x0123456789abcdef)),
            "0000000100100011010001010110011110001001101010111100110111101111"
        );
    }
}
