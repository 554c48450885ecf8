//! The `chess` module implements the FIDE Laws of Chess.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::ops;
use std::fmt;
use std::mem;
use std::str::FromStr;
use std::convert::TryFrom;
use self::error::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Which side a piece or player is on, based on the color of the pieces for that side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The number of colors
    pub const COUNT: usize = 2;
}

impl ops::Not for Color {
    type Output = Color;

    /// Returns the opposite color
    ///
    /// # Example
    /// ```
    /// use windmill::chess::Color;
    /// assert_eq!(!Color::White, Color::Black);
    /// assert_eq!(!Color::Black, Color::White);
    /// ```
    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => 'w'.fmt(f),
            Color::Black => 'b'.fmt(f),
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "w" => Ok(Color::White),
            "b" => Ok(Color::Black),
            _   => Err(Error::ParseError),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::White
    }
}

impl TryFrom<usize> for Color {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, Color>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

impl From<Color> for usize {
    fn from(value: Color) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The type of a chess piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// The number of piece types
    pub const COUNT: usize = Piece::King as usize + 1;
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Piece::Pawn => "P",
            Piece::Knight => "N",
            Piece::Bishop => "B",
            Piece::Rook => "R",
            Piece::Queen => "Q",
            Piece::King => "K",
        }.fmt(f)
    }
}

impl FromStr for Piece {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "P"|"p" => Ok(Piece::Pawn),
            "N"|"n" => Ok(Piece::Knight),
            "B"|"b" => Ok(Piece::Bishop),
            "R"|"r" => Ok(Piece::Rook),
            "Q"|"q" => Ok(Piece::Queen),
            "K"|"k" => Ok(Piece::King),
            _       => Err(Error::ParseError),
        }
    }
}

impl Default for Piece {
    fn default() -> Self {
        Piece::Pawn
    }
}

impl TryFrom<usize> for Piece {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, Piece>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

impl From<Piece> for usize {
    fn from(value: Piece) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Vertical column of the board, labeled from left to right from `White`'s perspective as
/// `A` through `H`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum File {
    // discriminants are spelled out so nothing can go wrong when we use transmute later
    A = 0, B = 1, C = 2, D = 3, E = 4, F = 5, G = 6, H = 7,
}

impl File {
    /// The number of files
    pub const COUNT: usize = File::H as usize + 1;
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            File::A => "a",
            File::B => "b",
            File::C => "c",
            File::D => "d",
            File::E => "e",
            File::F => "f",
            File::G => "g",
            File::H => "h",
        }.fmt(f)
    }
}

impl FromStr for File {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "a" => Ok(File::A),
            "b" => Ok(File::B),
            "c" => Ok(File::C),
            "d" => Ok(File::D),
            "e" => Ok(File::E),
            "f" => Ok(File::F),
            "g" => Ok(File::G),
            "h" => Ok(File::H),
            _   => Err(Error::ParseError),
        }
    }
}

impl Default for File {
    fn default() -> Self {
        File::A
    }
}

impl TryFrom<usize> for File {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, File>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

impl From<File> for usize {
    fn from(value: File) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Horizontal row of the board, labeled from nearest to farthest from `White`'s perspective
/// as `R1` through `R8`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Rank {
    // discriminants are spelled out so nothing can go wrong when we use transmute later
    R1 = 0, R2 = 1, R3 = 2, R4 = 3, R5 = 4, R6 = 5, R7 = 6, R8 = 7,
}

impl Rank {
    /// The number of ranks
    pub const COUNT: usize = Rank::R8 as usize + 1;
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::R1 => "1",
            Rank::R2 => "2",
            Rank::R3 => "3",
            Rank::R4 => "4",
            Rank::R5 => "5",
            Rank::R6 => "6",
            Rank::R7 => "7",
            Rank::R8 => "8",
        }.fmt(f)
    }
}

impl FromStr for Rank {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1" => Ok(Rank::R1),
            "2" => Ok(Rank::R2),
            "3" => Ok(Rank::R3),
            "4" => Ok(Rank::R4),
            "5" => Ok(Rank::R5),
            "6" => Ok(Rank::R6),
            "7" => Ok(Rank::R7),
            "8" => Ok(Rank::R8),
            _   => Err(Error::ParseError),
        }
    }
}

impl Default for Rank {
    fn default() -> Self {
        Rank::R1
    }
}

impl TryFrom<usize> for Rank {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, Rank>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

impl From<Rank> for usize {
    fn from(value: Rank) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A specific square on the board, labeled using the `File` and `Rank` as coordinates.
///
/// Squares are numbered rank by rank, so that `sq as usize & 7` recovers the file and
/// `sq as usize >> 3` recovers the rank.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Square {
    // discriminants are spelled out so nothing can go wrong when we use transmute later
    A1 = 0o00, B1 = 0o01, C1 = 0o02, D1 = 0o03, E1 = 0o04, F1 = 0o05, G1 = 0o06, H1 = 0o07,
    A2 = 0o10, B2 = 0o11, C2 = 0o12, D2 = 0o13, E2 = 0o14, F2 = 0o15, G2 = 0o16, H2 = 0o17,
    A3 = 0o20, B3 = 0o21, C3 = 0o22, D3 = 0o23, E3 = 0o24, F3 = 0o25, G3 = 0o26, H3 = 0o27,
    A4 = 0o30, B4 = 0o31, C4 = 0o32, D4 = 0o33, E4 = 0o34, F4 = 0o35, G4 = 0o36, H4 = 0o37,
    A5 = 0o40, B5 = 0o41, C5 = 0o42, D5 = 0o43, E5 = 0o44, F5 = 0o45, G5 = 0o46, H5 = 0o47,
    A6 = 0o50, B6 = 0o51, C6 = 0o52, D6 = 0o53, E6 = 0o54, F6 = 0o55, G6 = 0o56, H6 = 0o57,
    A7 = 0o60, B7 = 0o61, C7 = 0o62, D7 = 0o63, E7 = 0o64, F7 = 0o65, G7 = 0o66, H7 = 0o67,
    A8 = 0o70, B8 = 0o71, C8 = 0o72, D8 = 0o73, E8 = 0o74, F8 = 0o75, G8 = 0o76, H8 = 0o77,
}

impl Square {
    /// The number of squares
    pub const COUNT: usize = Square::H8 as usize + 1;

    /// Returns a square from its file and rank
    pub fn from_coord(file: File, rank: Rank) -> Square {
        Square::try_from(((rank as usize) << 3) + file as usize).expect("INFALLIBLE")
    }

    /// Returns the square's file
    pub fn file(self) -> File {
        File::try_from((self as usize) & 7).expect("INFALLIBLE")
    }

    /// Returns the square's rank
    pub fn rank(self) -> Rank {
        Rank::try_from((self as usize) >> 3).expect("INFALLIBLE")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.file().to_string() + &self.rank().to_string()).fmt(f)
    }
}

impl FromStr for Square {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let c: Vec<_> = s.chars().collect();
        if c.len() == 2 {
            Ok(Square::from_coord(c[0].to_string().parse()?, c[1].to_string().parse()?))
        } else {
            Err(Error::ParseError)
        }
    }
}

impl Default for Square {
    fn default() -> Self {
        Square::A1
    }
}

impl TryFrom<usize> for Square {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, Square>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

impl From<Square> for usize {
    fn from(value: Square) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The board side a castling move takes place on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum CastleSide {
    KingSide = 0,
    QueenSide = 1,
}

impl CastleSide {
    /// The number of castle sides
    pub const COUNT: usize = 2;
}

impl From<CastleSide> for usize {
    fn from(value: CastleSide) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The castling availability of one player on one side of the board.
///
/// Availability only ever moves forward: once a player loses the right to castle, or castles,
/// the state never returns to `CanCastle`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum CastleState {
    CanCastle = 0,
    CannotCastle = 1,
    HasCastled = 2,
}

impl CastleState {
    /// The number of castling states
    pub const COUNT: usize = CastleState::HasCastled as usize + 1;
}

impl Default for CastleState {
    fn default() -> Self {
        CastleState::CannotCastle
    }
}

impl From<CastleState> for usize {
    fn from(value: CastleState) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
pub mod bitboard;
mod moves;
pub use moves::{Move, Promotion};
mod position;
pub use position::{Position, Status};
pub use position::zobrist::Zobrist;

pub mod game;
pub mod variations;

pub mod error;



#[cfg(test)]
mod file_tests {
    use std::convert::TryFrom;
    use super::File;

    #[test]
    fn display_and_fromstr_traits_work() {
        for (i, name) in ["a", "b", "c", "d", "e", "f", "g", "h"].iter().enumerate() {
            let f = File::try_from(i).unwrap();
            assert_eq!(format!("{}", f), *name);
            assert_eq!(name.parse::<File>().unwrap(), f);
        }
        assert!("x".parse::<File>().is_err());
        // upper case is reserved for pieces, so it does not name a file
        assert!("B".parse::<File>().is_err());
    }

    #[test]
    fn default_is_file_a() {
        assert_eq!(File::A, Default::default());
    }

    #[test]
    fn usize_conversions_are_consistent() {
        for i in 0..File::COUNT {
            let f = File::try_from(i).unwrap();
            assert_eq!(usize::from(f), i);
        }
        assert!(File::try_from(File::COUNT).is_err());
    }
}

#[cfg(test)]
mod rank_tests {
    use std::convert::TryFrom;
    use super::Rank;

    #[test]
    fn display_and_fromstr_traits_work() {
        for i in 0..Rank::COUNT {
            let r = Rank::try_from(i).unwrap();
            assert_eq!(format!("{}", r), (i + 1).to_string());
            assert_eq!((i + 1).to_string().parse::<Rank>().unwrap(), r);
        }
        assert!("x".parse::<Rank>().is_err());
        assert!("0".parse::<Rank>().is_err());
        assert!("9".parse::<Rank>().is_err());
    }

    #[test]
    fn default_is_rank_1() {
        assert_eq!(Rank::R1, Default::default());
    }

    #[test]
    fn usize_conversions_are_consistent() {
        for i in 0..Rank::COUNT {
            let r = Rank::try_from(i).unwrap();
            assert_eq!(usize::from(r), i);
        }
        assert!(Rank::try_from(Rank::COUNT).is_err());
    }
}
