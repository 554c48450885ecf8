//! Contains structures to represent moves
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use super::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Which piece to promote to for a promotion move
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Promotion {
    ToKnight = 1,
    ToBishop = 2,
    ToRook = 3,
    ToQueen = 4,
}

impl Default for Promotion {
    fn default() -> Self {
        Promotion::ToQueen
    }
}

impl From<Promotion> for Piece {
    fn from(prom: Promotion) -> Self {
        unsafe { mem::transmute::<Promotion, Piece>(prom) }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A move described by its origin and destination squares alone
///
/// A `Move` carries no information about the piece being moved, whether anything is captured,
/// or whether the move is castling or an en passant capture. All of that is determined by the
/// position the move is played from, so the same `Move` value means different things in
/// different positions, and nothing about a `Move` is guaranteed to be legal, or even
/// pseudo-legal, until [`Position::make`](struct.Position.html#method.make) accepts it.
///
/// Castling is encoded as the king's two-square move (for example e1g1), and promotions carry
/// the piece to promote to. The null move, used by the engine to give the turn away, is
/// encoded with equal origin and destination.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Move {
    /// The square the piece moves from
    pub orig: Square,
    /// The square the piece moves to
    pub dest: Square,
    /// The piece to promote to, for pawn moves to the last rank
    pub prom: Option<Promotion>,
}

impl Move {
    /// Creates a move from `orig` to `dest` without a promotion
    pub fn new(orig: Square, dest: Square) -> Move {
        Move { orig, dest, prom: None }
    }

    /// Creates a pawn promotion from `orig` to `dest`
    pub fn promotion(orig: Square, dest: Square, prom: Promotion) -> Move {
        Move { orig, dest, prom: Some(prom) }
    }

    /// Returns the null move, which gives the turn away without moving anything
    pub fn null() -> Move {
        Default::default()
    }

    /// Returns `true` if this is the null move
    pub fn is_null(self) -> bool {
        self.orig == self.dest
    }
}

impl fmt::Display for Move {
    /// The move is formatted in coordinate notation (eg. g1f3, e7e8q, or e1g1).
    /// The null move is formatted as `0000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return "0000".fmt(f);
        }

        let mut s = self.orig.to_string() + &self.dest.to_string();
        if let Some(prom) = self.prom {
            s += match prom {
                Promotion::ToKnight => "n",
                Promotion::ToBishop => "b",
                Promotion::ToRook => "r",
                Promotion::ToQueen => "q",
            };
        }

        s.fmt(f)
    }
}

impl FromStr for Move {
    type Err = Error;

    /// Parses a move in coordinate notation
    fn from_str(s: &str) -> Result<Move> {
        if s == "0000" {
            return Ok(Move::null());
        }

        let c: Vec<_> = s.chars().collect();
        if c.len() < 4 || c.len() > 5 {
            return Err(Error::ParseError);
        }

        let orig: Square = s[0..2].parse()?;
        let dest: Square = s[2..4].parse()?;

        let prom = if c.len() == 5 {
            match c[4] {
                'n' | 'N' => Some(Promotion::ToKnight),
                'b' | 'B' => Some(Promotion::ToBishop),
                'r' | 'R' => Some(Promotion::ToRook),
                'q' | 'Q' => Some(Promotion::ToQueen),
                _ => return Err(Error::ParseError),
            }
        } else {
            None
        };

        if orig == dest {
            // only the null move may stand still, and it has its own spelling
            return Err(Error::ParseError);
        }

        Ok(Move { orig, dest, prom })
    }
}
