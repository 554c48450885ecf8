//! Reading and writing moves in Standard Algebraic Notation.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use super::*;

impl Position {
    /// Formats a legal move in [Standard Algebraic
    /// Notation](https://en.wikipedia.org/wiki/Algebraic_notation_(chess)), such as `Nf3`,
    /// `exd5`, `e8=Q` or `O-O`.
    ///
    /// When several like pieces could reach the destination, the origin is narrowed by file
    /// if that is enough, then by rank, then by the full origin square. Checks are marked
    /// with `+` and checkmates with `#`. Returns an error if `mov` is not legal here.
    ///
    /// ```rust
    /// use windmill::chess::{Move, Position};
    ///
    /// let pos = Position::new();
    /// let mov: Move = "g1f3".parse().expect("valid move");
    /// assert_eq!(pos.to_san(mov).expect("legal move"), "Nf3");
    /// ```
    pub fn to_san(&self, mov: Move) -> Result<String> {
        if !self.legal_moves().contains(&mov) {
            return Err(Error::IllegalMove);
        }
        let (_, piece) = self.piece_at(mov.orig).expect("INFALLIBLE");

        let mut s = String::new();

        if piece == King && mov.orig.file() == File::E
            && (mov.dest.file() == File::G || mov.dest.file() == File::C) {
            s += if mov.dest.file() == File::G { "O-O" } else { "O-O-O" };
        } else {
            let capture = self.occupied_by(!self.turn()).contains(mov.dest)
                || (piece == Pawn && self.en_passant_square() == Some(mov.dest));

            if piece == Pawn {
                if capture {
                    s += &mov.orig.file().to_string();
                }
            } else {
                s += &piece.to_string();
                s += &self.disambiguation(piece, mov);
            }

            if capture {
                s += "x";
            }
            s += &mov.dest.to_string();

            if let Some(prom) = mov.prom {
                s += "=";
                s += &Piece::from(prom).to_string();
            }
        }

        // mark checks against the opponent
        let mut scratch = Position { state: self.state, history: Vec::new() };
        scratch.make(mov);
        if scratch.in_check() {
            s += if scratch.status(true) == Status::Checkmate { "#" } else { "+" };
        }

        Ok(s)
    }

    /// Returns the origin hint needed to single `mov` out among like pieces which could
    /// legally reach the same destination.
    fn disambiguation(&self, piece: Piece, mov: Move) -> String {
        let mut eligible = Bitboard::new();
        for alt in self.legal_moves() {
            if alt.dest == mov.dest && self.piece_at(alt.orig) == Some((self.turn(), piece)) {
                eligible.insert(alt.orig);
            }
        }

        if eligible == mov.orig.into() {
            String::new()
        } else if eligible & mov.orig.file().into() == mov.orig.into() {
            mov.orig.file().to_string()
        } else if eligible & mov.orig.rank().into() == mov.orig.into() {
            mov.orig.rank().to_string()
        } else {
            mov.orig.to_string()
        }
    }

    /// Parses a move written in Standard Algebraic Notation, or in the coordinate notation
    /// the protocols speak, and resolves it against the legal moves of the position.
    ///
    /// The string is scanned backwards: check marks and the promotion piece first, then the
    /// destination, then whatever origin hints are present. A capture mark is accepted but
    /// not required, and promotions must name the promotion piece. Returns `ParseError` if
    /// the string is not notation at all, `IllegalMove` if it names no legal move, and
    /// `AmbiguousMove` if it could mean more than one.
    ///
    /// ```rust
    /// use windmill::chess::{Move, Position};
    ///
    /// let pos = Position::new();
    /// assert_eq!(pos.move_from_san("Nf3").expect("legal move"),
    ///     "g1f3".parse::<Move>().expect("valid move"));
    /// ```
    pub fn move_from_san(&self, s: &str) -> Result<Move> {
        use Error::*;

        let s = s.trim();
        let us = self.state.turn;
        let home = if us == White { Rank::R1 } else { Rank::R8 };

        // castling notation names the king move directly
        match s.trim_end_matches(|c| c == '+' || c == '#') {
            "O-O" | "0-0" => {
                let mov = Move::new(Square::from_coord(File::E, home),
                                    Square::from_coord(File::G, home));
                return if self.legal_moves().contains(&mov) {
                    Ok(mov)
                } else {
                    Err(IllegalMove)
                };
            }
            "O-O-O" | "0-0-0" => {
                let mov = Move::new(Square::from_coord(File::E, home),
                                    Square::from_coord(File::C, home));
                return if self.legal_moves().contains(&mov) {
                    Ok(mov)
                } else {
                    Err(IllegalMove)
                };
            }
            _ => {}
        }

        let mut chars = s.chars();
        let mut next = chars.next_back();

        // remove check or checkmate characters
        if let Some('+') | Some('#') = next {
            next = chars.next_back();
        }

        // the promotion piece
        let prom = match next {
            Some('Q') | Some('q') => Some(ToQueen),
            Some('R') | Some('r') => Some(ToRook),
            Some('B') | Some('b') => Some(ToBishop),
            Some('N') | Some('n') => Some(ToKnight),
            _ => None,
        };
        if prom.is_some() {
            next = chars.next_back();
            if next == Some('=') {
                next = chars.next_back();
            }
        }

        // the destination square
        let dest_rank: Rank = match next {
            Some(c) => c.to_string().parse()?,
            None => return Err(ParseError),
        };
        let dest_file: File = match chars.next_back() {
            Some(c) => c.to_string().parse()?,
            None => return Err(ParseError),
        };
        let dest = Square::from_coord(dest_file, dest_rank);

        next = chars.next_back();
        if let Some('x') | Some('-') = next {
            next = chars.next_back();
        }

        // origin hints
        let mut orig_rank: Option<Rank> = None;
        let mut orig_file: Option<File> = None;
        if let Some(c) = next {
            if let Ok(rank) = c.to_string().parse() {
                orig_rank = Some(rank);
                next = chars.next_back();
            }
        }
        if let Some(c) = next {
            if let Ok(file) = c.to_string().parse() {
                orig_file = Some(file);
                next = chars.next_back();
            }
        }

        // the piece, which pawn moves and coordinate notation leave out
        let mut piece: Option<Piece> = None;
        if let Some(c) = next {
            match c.to_string().parse() {
                Ok(p) => {
                    piece = Some(p);
                    next = chars.next_back();
                }
                Err(_) => return Err(ParseError),
            }
        }
        if next.is_some() {
            return Err(ParseError);
        }

        // resolve against the legal moves of the position
        let full_orig = orig_file.is_some() && orig_rank.is_some();
        let mut matches = self.legal_moves().into_iter().filter(|m| {
            m.dest == dest && m.prom == prom
                && orig_file.map_or(true, |f| m.orig.file() == f)
                && orig_rank.map_or(true, |r| m.orig.rank() == r)
                && match piece {
                    Some(p) => self.piece_at(m.orig) == Some((us, p)),
                    // bare coordinates may move anything, bare SAN is a pawn move
                    None => full_orig || self.piece_at(m.orig) == Some((us, Pawn)),
                }
        });

        let mov = matches.next().ok_or(IllegalMove)?;
        if matches.next().is_some() {
            return Err(AmbiguousMove);
        }

        Ok(mov)
    }
}
