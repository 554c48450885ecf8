//! Contains structures related to the `Position`.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use super::*;
use super::bitboard::*;
use super::error::*;

use super::Color::*;
use super::Piece::*;
use super::CastleSide::*;
use super::CastleState::*;
use super::Promotion::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A representation of the arrangement of pieces on the board at a given point in the game,
/// along with castling availability, en passant vulnerability, the move counters, and the
/// history needed to take moves back and to detect repeated positions.
///
/// # Instantiation
/// There are three typical ways of creating a new `Position` structure.
///  -  The [`new`](#method.new) method (or `Default`) creates a `Position` containing the
///     standard starting position.
///  -  The [`from_fen_str`](#method.from_fen_str) method (along with its synonyms `from_str`
///     and `str::parse`) creates a new `Position` from a string containing [Forsyth-Edwards
///     Notation (FEN)](https://en.wikipedia.org/wiki/Forsyth%E2%80%93Edwards_Notation).
///  -  Cloning an existing `Position`.
///
/// # Making and Taking Back Moves
/// [`make`](#method.make) plays a move in place, and [`unmake`](#method.unmake) takes the
/// most recent move back. The full state is saved before every move, so any number of moves
/// can be taken back, all the way to the position the structure was created from.
///
/// ```rust
/// use windmill::chess::{Move, Position};
///
/// let mut pos = Position::new();
/// pos.make("g1f3".parse::<Move>().expect("valid move"));
/// assert_eq!(pos.to_fen_str(),
///     "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKBNR b KQkq - 1 1");
///
/// assert!(pos.unmake());
/// assert_eq!(pos, Position::new());
/// ```
///
/// # Generating Moves
/// [`generate`](#method.generate) produces pseudo-legal moves, which is what the engine's
/// search works with, and [`legal_moves`](#method.legal_moves) filters them down to the fully
/// legal moves of the position.
///
/// ```rust
/// use windmill::chess::Position;
///
/// let pos = Position::new();
/// assert_eq!(pos.legal_moves().len(), 20);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    state: State,
    history: Vec<State>,
}

/// Everything needed to restore a position exactly, saved on the history stack by every
/// `make` and restored by `unmake`.
#[derive(Copy, Clone, PartialEq, Eq)]
struct State {
    zobrist: Zobrist,
    pawn_zobrist: Zobrist,
    occ_by_piece: [[Bitboard; Piece::COUNT]; Color::COUNT],
    occ_by_color: [Bitboard; Color::COUNT],
    occupied: RotatedBitboard,
    counts: [[u8; Piece::COUNT]; Color::COUNT],
    turn: Color,
    ep_file: Option<File>,
    castling: [[CastleState; CastleSide::COUNT]; Color::COUNT],
    draw_plies: u16,
    move_num: u16,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The status of the game at a given position.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    /// The game is not over.
    InProgress,
    /// The player on move has no legal moves and is in check.
    Checkmate,
    /// The player on move has no legal moves but is not in check.
    Stalemate,
    /// Neither player has enough material left to deliver checkmate.
    InsufficientMaterial,
    /// The current position has occurred at least three times.
    Repetition,
    /// Fifty full moves have passed without a capture or a pawn move.
    FiftyMoves,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
impl Position {

    /// Returns the standard starting Position.
    pub fn new() -> Position {
        let mut state = State {
            zobrist: Zobrist::new(),
            pawn_zobrist: Zobrist::new(),
            occ_by_piece: [
                // white
                [
                    // pawns
                    Bitboard::from(0x0000_0000_0000_ff00u64),
                    // knights
                    Bitboard::from(0x0000_0000_0000_0042u64),
                    // bishops
                    Bitboard::from(0x0000_0000_0000_0024u64),
                    // rooks
                    Bitboard::from(0x0000_0000_0000_0081u64),
                    // queen
                    Bitboard::from(0x0000_0000_0000_0008u64),
                    // king
                    Bitboard::from(0x0000_0000_0000_0010u64),
                ],
                // black
                [
                    // pawns
                    Bitboard::from(0x00ff_0000_0000_0000u64),
                    // knights
                    Bitboard::from(0x4200_0000_0000_0000u64),
                    // bishops
                    Bitboard::from(0x2400_0000_0000_0000u64),
                    // rooks
                    Bitboard::from(0x8100_0000_0000_0000u64),
                    // queen
                    Bitboard::from(0x0800_0000_0000_0000u64),
                    // king
                    Bitboard::from(0x1000_0000_0000_0000u64),
                ],
            ],
            occ_by_color: [
                // white
                Bitboard::from(0x0000_0000_0000_ffffu64),
                // black
                Bitboard::from(0xffff_0000_0000_0000u64),
            ],
            occupied: RotatedBitboard::new(),
            counts: [[8, 2, 2, 2, 1, 1]; Color::COUNT],
            turn: White,
            ep_file: None,
            castling: [[CanCastle; CastleSide::COUNT]; Color::COUNT],
            draw_plies: 0,
            move_num: 1,
        };

        for sq in state.occ_by_color[White as usize] | state.occ_by_color[Black as usize] {
            state.occupied.toggle(sq);
        }
        state.calc_zobrist();

        Position { state, history: Vec::new() }
    }

    /// Parse a position from a string containing [Forsyth-Edwards
    /// Notation (FEN)](https://en.wikipedia.org/wiki/Forsyth%E2%80%93Edwards_Notation).
    ///
    /// The fields are validated one by one and against each other, and an error in any of
    /// them means no `Position` is produced at all. The halfmove clock and fullmove number
    /// may be omitted, in which case they default to zero and one.
    pub fn from_fen_str(s: &str) -> Result<Position> {
        use Error::*;

        let mut board = [None; Square::COUNT];
        let mut fields = s.trim().split_whitespace();

        // parse the board
        if let Some(placement) = fields.next() {
            let mut r = Rank::COUNT - 1;
            let mut f = 0;
            for c in placement.chars() {
                match c {
                    '1' ..= '8' => {
                        f += c.to_digit(10).expect("INFALLIBLE") as usize;
                        if f > 8 {
                            return Err(ParseError);
                        }
                    }
                    '/' => {
                        if f == File::COUNT && r > 0 {
                            r -= 1;
                            f = 0;
                        } else {
                            return Err(ParseError);
                        }
                    }
                    _ => {
                        let sq = match (File::try_from(f), Rank::try_from(r)) {
                            (Ok(f), Ok(r)) => Square::from_coord(f, r),
                            _ => return Err(ParseError),
                        };
                        let color = if c.is_uppercase() { White } else { Black };
                        let piece: Piece = c.to_string().parse()?;

                        board[sq as usize] = Some((color, piece));
                        f += 1;
                    }
                }
            }
            if r > 0 || f < 8 {
                return Err(ParseError);
            }
        } else {
            return Err(ParseError);
        }

        // parse the turn
        let turn: Color = match fields.next() {
            Some(turn) => turn.parse()?,
            None => return Err(ParseError),
        };

        // parse the castling flags
        let mut castling = [[CannotCastle; CastleSide::COUNT]; Color::COUNT];
        match fields.next() {
            Some("-") => {},
            Some(flags) => {
                for c in flags.chars() {
                    let (color, side) = match c {
                        'K' => (White, KingSide),
                        'Q' => (White, QueenSide),
                        'k' => (Black, KingSide),
                        'q' => (Black, QueenSide),
                        _ => return Err(ParseError),
                    };
                    castling[color as usize][side as usize] = CanCastle;
                }
            },
            None => return Err(ParseError),
        }

        // parse the en passant square, whose rank is fixed by whose turn it is
        let ep_file = match fields.next() {
            Some("-") => None,
            Some(sq) => {
                let sq: Square = sq.parse()?;
                let expected = if turn == White { Rank::R6 } else { Rank::R3 };
                if sq.rank() != expected {
                    return Err(ParseError);
                }
                Some(sq.file())
            },
            None => return Err(ParseError),
        };

        // parse the half move clock, if present
        let mut draw_plies = 0;
        if let Some(plies) = fields.next() {
            match plies.parse() {
                Ok(plies) => draw_plies = plies,
                Err(_) => return Err(ParseError),
            }
        }

        // parse the move number, if present
        let mut move_num = 1;
        if let Some(num) = fields.next() {
            match num.parse() {
                Ok(num) => move_num = num,
                Err(_) => return Err(ParseError),
            }
        }

        Position::build(board, turn, castling, ep_file, draw_plies, move_num)
    }

    /// Validates a parsed board description and assembles the `Position`.
    fn build(
        board: [Option<(Color, Piece)>; Square::COUNT],
        turn: Color,
        castling: [[CastleState; CastleSide::COUNT]; Color::COUNT],
        ep_file: Option<File>,
        draw_plies: u16,
        move_num: u16,
    ) -> Result<Position> {
        use Error::*;

        let mut state = State {
            zobrist: Zobrist::new(),
            pawn_zobrist: Zobrist::new(),
            occ_by_piece: [[Bitboard::new(); Piece::COUNT]; Color::COUNT],
            occ_by_color: [Bitboard::new(); Color::COUNT],
            occupied: RotatedBitboard::new(),
            counts: [[0; Piece::COUNT]; Color::COUNT],
            turn,
            ep_file,
            castling,
            draw_plies,
            move_num,
        };

        for (i, entry) in board.iter().enumerate() {
            if let Some((color, piece)) = entry {
                let sq = Square::try_from(i).expect("INFALLIBLE");
                state.occ_by_piece[*color as usize][*piece as usize].insert(sq);
                state.occ_by_color[*color as usize].insert(sq);
                state.occupied.toggle(sq);
                state.counts[*color as usize][*piece as usize] += 1;
            }
        }

        let mut pos = Position { state, history: Vec::new() };

        for c in &[White, Black] {
            // Step 1: verify exactly one king per side
            if pos.occupied_by_piece(*c, King).len() != 1 {
                return Err(InvalidKingCount);
            }
            // Step 2: no pawns on ranks 1 and 8
            if pos.occupied_by_piece(*c, Pawn)
                .intersects(Bitboard::from(Rank::R1) | Rank::R8.into()) {
                return Err(InvalidPawnRank);
            }
        }
        // Step 3: the opponent's king must not be attacked
        if pos.king_capturable() {
            return Err(KingCapturable);
        }
        // Step 4: if there is an en passant square, it must be empty and the pawn to be
        // captured must be present
        if let Some(file) = pos.state.ep_file {
            let target = pos.en_passant_square().expect("INFALLIBLE");
            if pos.piece_at(target).is_some() {
                return Err(EnPassantSquareOccupied);
            }
            let pawn_rank = if pos.state.turn == White { Rank::R5 } else { Rank::R4 };
            if !pos.occupied_by_piece(!pos.state.turn, Pawn)
                .contains(Square::from_coord(file, pawn_rank)) {
                return Err(MissingEnPassantPawn);
            }
        }
        // Step 5: if castling rights exist, the king and rook must be in the correct squares
        for c in &[White, Black] {
            let home = if *c == White { Rank::R1 } else { Rank::R8 };
            for side in &[KingSide, QueenSide] {
                if pos.can_castle(*c, *side) {
                    let rook_file = if *side == KingSide { File::H } else { File::A };

                    if !pos.occupied_by_piece(*c, King)
                            .contains(Square::from_coord(File::E, home))
                        || !pos.occupied_by_piece(*c, Rook)
                            .contains(Square::from_coord(rook_file, home)) {
                        return Err(InvalidCastlingFlags);
                    }
                }
            }
        }

        pos.state.calc_zobrist();

        Ok(pos)
    }

    /// Converts the position to a FEN string.
    pub fn to_fen_str(&self) -> String {
        // the board
        let mut board = String::new();
        for r in (0..Rank::COUNT).rev() {
            let mut count = 0;
            for f in 0..File::COUNT {
                let sq = Square::from_coord(
                    File::try_from(f).expect("INFALLIBLE"),
                    Rank::try_from(r).expect("INFALLIBLE"));

                if let Some((c, p)) = self.piece_at(sq) {
                    if count > 0 {
                        board += &count.to_string();
                        count = 0;
                    }

                    if c == White {
                        board += &p.to_string();
                    } else {
                        board += &p.to_string().to_lowercase();
                    }
                } else {
                    count += 1;
                }
            }
            if count > 0 {
                board += &count.to_string();
            }
            if r > 0 {
                board += "/";
            }
        }

        // whose turn it is
        let turn = self.state.turn.to_string();

        // castling rights
        let mut castling = String::new();
        if self.can_castle(White, KingSide) {
            castling += "K";
        }
        if self.can_castle(White, QueenSide) {
            castling += "Q";
        }
        if self.can_castle(Black, KingSide) {
            castling += "k";
        }
        if self.can_castle(Black, QueenSide) {
            castling += "q";
        }
        if castling.is_empty() {
            castling += "-";
        }

        // the en passant square
        let ep_square = match self.en_passant_square() {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!("{} {} {} {} {} {}", board, turn, castling, ep_square,
                                     self.state.draw_plies, self.state.move_num)
    }

    /// Returns the color whose turn it is.
    pub fn turn(&self) -> Color {
        self.state.turn
    }

    /// Returns the file on which a pawn is vulnerable to capture en passant, if any.
    pub fn en_passant_file(&self) -> Option<File> {
        self.state.ep_file
    }

    /// Returns the square a capturing pawn would land on for an en passant capture, if any.
    ///
    /// The rank is implied by whose turn it is: rank 6 when white is to move, rank 3 when
    /// black is to move.
    pub fn en_passant_square(&self) -> Option<Square> {
        self.state.ep_file.map(|file| {
            let rank = if self.state.turn == White { Rank::R6 } else { Rank::R3 };
            Square::from_coord(file, rank)
        })
    }

    /// Returns `true` if the color to move is in check.
    pub fn in_check(&self) -> bool {
        self.square_attacked_by(self.king_location(self.state.turn), !self.state.turn)
    }

    /// Returns `true` if the color to move could capture the enemy king, meaning the
    /// previous move was not legal.
    pub fn king_capturable(&self) -> bool {
        self.square_attacked_by(self.king_location(!self.state.turn), self.state.turn)
    }

    /// Returns the castling state for `c` on the given side of the board.
    pub fn castling(&self, c: Color, side: CastleSide) -> CastleState {
        self.state.castling[c as usize][side as usize]
    }

    /// Returns `true` if castling is still available to `c` on the given side.
    pub fn can_castle(&self, c: Color, side: CastleSide) -> bool {
        self.castling(c, side) == CanCastle
    }

    /// Returns `true` if castling is still available to `c` on either side.
    pub fn has_castling_rights(&self, c: Color) -> bool {
        self.can_castle(c, KingSide) || self.can_castle(c, QueenSide)
    }

    /// Returns `true` if `c` has castled.
    pub fn has_castled(&self, c: Color) -> bool {
        self.castling(c, KingSide) == HasCastled || self.castling(c, QueenSide) == HasCastled
    }

    /// Returns `true` if enough quiet moves have passed for the fifty move rule.
    pub fn fifty_moves(&self) -> bool {
        self.state.draw_plies >= 100
    }

    /// Returns the number of plies which count toward the fifty move rule.
    pub fn draw_plies(&self) -> usize {
        usize::from(self.state.draw_plies)
    }

    /// Returns the move number.
    pub fn move_number(&self) -> usize {
        usize::from(self.state.move_num)
    }

    /// Returns a `Bitboard` of all occupied `Square`s.
    pub fn occupied(&self) -> Bitboard {
        self.state.occupied.squares()
    }

    /// Returns the occupied squares in all four board orientations, for attack lookups.
    pub fn rotated(&self) -> &RotatedBitboard {
        &self.state.occupied
    }

    /// Returns a `Bitboard` of `Square`s occupied by player `c`.
    pub fn occupied_by(&self, c: Color) -> Bitboard {
        self.state.occ_by_color[c as usize]
    }

    /// Returns a `Bitboard` of `Square`s occupied by the given `Piece` and `Color`.
    pub fn occupied_by_piece(&self, c: Color, p: Piece) -> Bitboard {
        self.state.occ_by_piece[c as usize][p as usize]
    }

    /// Returns the number of pieces of the given `Color` and type on the board.
    pub fn count(&self, c: Color, p: Piece) -> usize {
        usize::from(self.state.counts[c as usize][p as usize])
    }

    /// Returns the square where the king of the given color is located.
    pub fn king_location(&self, c: Color) -> Square {
        self.occupied_by_piece(c, King).peek().expect("INFALLIBLE")
    }

    /// Returns the color and type of piece, if any, at the given location.
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        if self.state.occupied.contains(sq) {
            for c in &[White, Black] {
                if self.occupied_by(*c).contains(sq) {
                    for p in &[Pawn, Knight, Bishop, Rook, Queen, King] {
                        if self.occupied_by_piece(*c, *p).contains(sq) {
                            return Some((*c, *p));
                        }
                    }
                    unreachable!()
                }
            }
            unreachable!()
        }

        None
    }

    /// Returns the position's Zobrist key.
    pub fn zobrist_key(&self) -> Zobrist {
        self.state.zobrist
    }

    /// Returns the Zobrist key of the position's pawn placement alone.
    pub fn pawn_zobrist_key(&self) -> Zobrist {
        self.state.pawn_zobrist
    }

    /// Returns `true` if there is insufficient material for either player to checkmate.
    ///
    /// That is the case when neither player has a pawn, rook or queen, and either at most
    /// one minor piece remains in total, or the only minor pieces are two bishops confined
    /// to squares of the same color.
    pub fn insufficient_material(&self) -> bool {
        for c in &[White, Black] {
            let counts = &self.state.counts[*c as usize];
            if counts[Pawn as usize] > 0 || counts[Rook as usize] > 0
                || counts[Queen as usize] > 0 {
                return false;
            }
        }

        let knights = self.count(White, Knight) + self.count(Black, Knight);
        let bishops = self.count(White, Bishop) + self.count(Black, Bishop);
        if knights + bishops <= 1 {
            return true;
        }
        if knights == 0 && bishops == 2 {
            let bishops = self.occupied_by_piece(White, Bishop)
                | self.occupied_by_piece(Black, Bishop);
            let dark = Bitboard::from(0xaa55_aa55_aa55_aa55u64);

            return bishops & dark == bishops || bishops.is_disjoint(dark);
        }

        false
    }

    /// Returns how many times the current position has occurred, counting the current
    /// occurrence.
    ///
    /// Two positions count as the same when their Zobrist keys match exactly. Only the
    /// portion of the history which the halfmove clock covers needs to be searched, since a
    /// capture or a pawn move can never be repeated.
    pub fn repetitions(&self) -> usize {
        let lookback = usize::from(self.state.draw_plies);

        1 + self.history.iter().rev().take(lookback)
            .filter(|prev| prev.zobrist == self.state.zobrist)
            .count()
    }

    /// Returns the status of the game at this position.
    ///
    /// Checkmate and stalemate require searching every move of the position for a legal
    /// one, which is far more expensive than the other classifications, so they are only
    /// checked when `check_for_mate` is set. The checks are made in this order: checkmate
    /// or stalemate (if requested), insufficient material, threefold repetition, then the
    /// fifty move rule.
    pub fn status(&self, check_for_mate: bool) -> Status {
        if check_for_mate && !self.has_legal_move() {
            return if self.in_check() { Status::Checkmate } else { Status::Stalemate };
        }
        if self.insufficient_material() {
            return Status::InsufficientMaterial;
        }
        if self.repetitions() >= 3 {
            return Status::Repetition;
        }
        if self.fifty_moves() {
            return Status::FiftyMoves;
        }

        Status::InProgress
    }

    /// Returns `true` if the player on move has at least one legal move.
    fn has_legal_move(&self) -> bool {
        let mut moves = Vec::new();
        self.generate(&mut moves, false);

        let mut scratch = Position { state: self.state, history: Vec::new() };
        for mov in moves {
            scratch.make(mov);
            let legal = !scratch.king_capturable();
            scratch.unmake();

            if legal {
                return true;
            }
        }

        false
    }

    /// Returns all fully legal moves from this position.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.generate(&mut moves, false);

        let mut scratch = Position { state: self.state, history: Vec::new() };
        moves.retain(|&mov| {
            scratch.make(mov);
            let legal = !scratch.king_capturable();
            scratch.unmake();
            legal
        });

        moves
    }

    /// Appends the pseudo-legal moves of the position to `moves`, and returns `false` if
    /// the enemy king could be captured outright, which means the previous move was not
    /// legal.
    ///
    /// Pseudo-legal moves may leave the mover's own king in check. Castling is the
    /// exception: castling moves are only generated when they are fully legal. When
    /// `captures_only` is set, only captures and promotions are generated.
    ///
    /// King captures themselves are never placed in the list.
    pub fn generate(&self, moves: &mut Vec<Move>, captures_only: bool) -> bool {
        let mut clean = self.pawn_moves(moves, captures_only);
        for piece in &[Knight, Bishop, Rook, Queen, King] {
            clean &= self.piece_moves(*piece, moves, captures_only);
        }
        if !captures_only {
            self.castling_moves(moves);
        }

        clean
    }

    /// Generates the moves of all pieces of one type other than pawns.
    fn piece_moves(&self, piece: Piece, moves: &mut Vec<Move>, captures_only: bool) -> bool {
        let us = self.state.turn;
        let enemy = self.occupied_by(!us);
        let enemy_king = self.occupied_by_piece(!us, King);
        let occupied = self.occupied();
        let mut clean = true;

        for orig in self.occupied_by_piece(us, piece) {
            let attacks = match piece {
                Knight => knight_attacks(orig),
                Bishop => bishop_attacks(orig, &self.state.occupied),
                Rook => rook_attacks(orig, &self.state.occupied),
                Queen => queen_attacks(orig, &self.state.occupied),
                King => king_attacks(orig),
                Pawn => unreachable!(),
            };

            let mut captures = attacks & enemy;
            if captures.intersects(enemy_king) {
                clean = false;
                captures &= !enemy_king;
            }
            for dest in captures {
                moves.push(Move::new(orig, dest));
            }

            if !captures_only {
                for dest in attacks & !occupied {
                    moves.push(Move::new(orig, dest));
                }
            }
        }

        clean
    }

    /// Generates pawn captures, promotions and advances.
    fn pawn_moves(&self, moves: &mut Vec<Move>, captures_only: bool) -> bool {
        let us = self.state.turn;
        let forward: i8 = if us == White { 1 } else { -1 };
        let pawns = self.occupied_by_piece(us, Pawn);
        let occupied = self.occupied();
        let enemy_king = self.occupied_by_piece(!us, King);
        let last_rank = Bitboard::from(if us == White { Rank::R8 } else { Rank::R1 });
        let mut clean = true;

        // captures toward each wing, en passant included
        let mut targets = self.occupied_by(!us);
        if let Some(sq) = self.en_passant_square() {
            targets |= sq.into();
        }
        for side in &[-1i8, 1] {
            let mut dests = pawns.shift_xy(*side, forward) & targets;
            if dests.intersects(enemy_king) {
                clean = false;
                dests &= !enemy_king;
            }

            for dest in dests {
                let file = File::try_from((dest.file() as i8 - side) as usize)
                    .expect("INFALLIBLE");
                let rank = Rank::try_from((dest.rank() as i8 - forward) as usize)
                    .expect("INFALLIBLE");
                let orig = Square::from_coord(file, rank);

                if last_rank.contains(dest) {
                    for prom in &[ToQueen, ToKnight, ToRook, ToBishop] {
                        moves.push(Move::promotion(orig, dest, *prom));
                    }
                } else {
                    moves.push(Move::new(orig, dest));
                }
            }
        }

        // single and double advances, with promotions at the far end
        let mut single = pawns.shift_y(forward) & !occupied;
        let advance2_rank = if us == White { Rank::R4 } else { Rank::R5 };
        let mut double = single.shift_y(forward) & !occupied & advance2_rank.into();
        if captures_only {
            single &= last_rank;
            double = Bitboard::new();
        }

        for dest in single {
            let rank = Rank::try_from((dest.rank() as i8 - forward) as usize)
                .expect("INFALLIBLE");
            let orig = Square::from_coord(dest.file(), rank);

            if last_rank.contains(dest) {
                for prom in &[ToQueen, ToKnight, ToRook, ToBishop] {
                    moves.push(Move::promotion(orig, dest, *prom));
                }
            } else {
                moves.push(Move::new(orig, dest));
            }
        }
        for dest in double {
            let orig_rank = if us == White { Rank::R2 } else { Rank::R7 };
            moves.push(Move::new(Square::from_coord(dest.file(), orig_rank), dest));
        }

        clean
    }

    /// Generates castling moves. Unlike the rest of the generator, these are fully checked
    /// for legality here, since the castling rules already require attack queries.
    fn castling_moves(&self, moves: &mut Vec<Move>) {
        let us = self.state.turn;
        let home = if us == White { Rank::R1 } else { Rank::R8 };
        let king = Square::from_coord(File::E, home);
        let occupied = self.occupied();

        if !self.has_castling_rights(us) || self.in_check() {
            return;
        }

        if self.can_castle(us, KingSide) {
            let f = Square::from_coord(File::F, home);
            let g = Square::from_coord(File::G, home);

            if !occupied.contains(f) && !occupied.contains(g)
                && !self.square_attacked_by(f, !us)
                && !self.square_attacked_by(g, !us) {
                moves.push(Move::new(king, g));
            }
        }
        if self.can_castle(us, QueenSide) {
            let b = Square::from_coord(File::B, home);
            let c = Square::from_coord(File::C, home);
            let d = Square::from_coord(File::D, home);

            if !occupied.contains(b) && !occupied.contains(c) && !occupied.contains(d)
                && !self.square_attacked_by(d, !us)
                && !self.square_attacked_by(c, !us) {
                moves.push(Move::new(king, c));
            }
        }
    }

    /// Plays `mov` on the board and returns `true` if it captured anything.
    ///
    /// The previous state is saved first, so the move can be taken back with
    /// [`unmake`](#method.unmake). The move is not checked for legality: anything produced
    /// by [`generate`](#method.generate) is played as is, even if it leaves the mover's own
    /// king in check. A move which does not even move a piece of the color on move leaves
    /// the position untouched and returns `false`.
    ///
    /// The null move gives the turn away, which no legal move can do, but the engine relies
    /// on being able to do exactly that.
    pub fn make(&mut self, mov: Move) -> bool {
        if mov.is_null() {
            self.make_null();
            return false;
        }

        let us = self.state.turn;
        let them = !us;
        let piece = match self.piece_at(mov.orig) {
            Some((c, p)) if c == us => p,
            _ => return false,
        };
        let captured = match self.piece_at(mov.dest) {
            Some((c, _)) if c == us => return false,
            Some((_, p)) => Some(p),
            None => None,
        };
        let en_passant = piece == Pawn && captured.is_none()
            && self.en_passant_square() == Some(mov.dest);
        let was_capture = captured.is_some() || en_passant;
        let prom = if piece == Pawn { mov.prom } else { None };

        self.history.push(self.state);
        let state = &mut self.state;

        // clear the captured piece, which for en passant is not on the destination square
        if let Some(victim) = captured {
            state.toggle_piece(them, victim, mov.dest);
            state.counts[them as usize][victim as usize] -= 1;

            // a rook captured at home takes the castling rights on that side with it
            match (them, mov.dest) {
                (White, Square::A1) | (Black, Square::A8) => {
                    state.revoke_castling(them, QueenSide);
                }
                (White, Square::H1) | (Black, Square::H8) => {
                    state.revoke_castling(them, KingSide);
                }
                _ => {}
            }
        } else if en_passant {
            let sq = Square::from_coord(mov.dest.file(), mov.orig.rank());
            state.toggle_piece(them, Pawn, sq);
            state.counts[them as usize][Pawn as usize] -= 1;
        }

        // move the piece to its new location, changing its type on promotion
        if let Some(prom) = prom {
            let promoted = Piece::from(prom);
            state.toggle_piece(us, Pawn, mov.orig);
            state.toggle_piece(us, promoted, mov.dest);
            state.counts[us as usize][Pawn as usize] -= 1;
            state.counts[us as usize][promoted as usize] += 1;
        } else {
            state.toggle_piece(us, piece, mov.orig);
            state.toggle_piece(us, piece, mov.dest);
        }

        // a castling king brings its rook along
        if piece == King {
            let side = match (mov.orig.file(), mov.dest.file()) {
                (File::E, File::G) => Some(KingSide),
                (File::E, File::C) => Some(QueenSide),
                _ => None,
            };

            if let Some(side) = side {
                let rank = mov.orig.rank();
                let (orig, dest) = match side {
                    KingSide => (Square::from_coord(File::H, rank),
                                 Square::from_coord(File::F, rank)),
                    QueenSide => (Square::from_coord(File::A, rank),
                                  Square::from_coord(File::D, rank)),
                };

                state.toggle_piece(us, Rook, orig);
                state.toggle_piece(us, Rook, dest);
                state.set_castling(us, side, HasCastled);
            }
        }

        // a king or rook leaving its home square takes the rights along
        match (us, mov.orig) {
            (White, Square::E1) | (Black, Square::E8) => {
                state.revoke_castling(us, KingSide);
                state.revoke_castling(us, QueenSide);
            }
            (White, Square::A1) | (Black, Square::A8) => state.revoke_castling(us, QueenSide),
            (White, Square::H1) | (Black, Square::H8) => state.revoke_castling(us, KingSide),
            _ => {}
        }

        // the en passant window opens for one move after a double advance
        let advance2 = piece == Pawn
            && (mov.orig.rank() as i8 - mov.dest.rank() as i8).abs() == 2;
        let ep_file = if advance2 { Some(mov.dest.file()) } else { None };
        state.zobrist.toggle_en_passant(state.ep_file);
        state.zobrist.toggle_en_passant(ep_file);
        state.ep_file = ep_file;

        // update the move counters
        if was_capture || piece == Pawn {
            state.draw_plies = 0;
        } else {
            state.draw_plies += 1;
        }

        // switch turns
        state.turn = them;
        state.zobrist.toggle_turn();
        if state.turn == White {
            state.move_num += 1;
        }

        was_capture
    }

    /// Gives the turn to the opponent without moving anything.
    ///
    /// This is not a legal chess move, but the engine relies on it for pruning. The state
    /// is saved like for any other move, so [`unmake`](#method.unmake) takes it back.
    pub fn make_null(&mut self) {
        self.history.push(self.state);
        let state = &mut self.state;

        state.zobrist.toggle_en_passant(state.ep_file);
        state.zobrist.toggle_en_passant(None);
        state.ep_file = None;

        state.turn = !state.turn;
        state.zobrist.toggle_turn();
        if state.turn == White {
            state.move_num += 1;
        }
    }

    /// Takes back the most recent move, restoring the position exactly.
    ///
    /// Returns `false` if there is no move left to take back.
    pub fn unmake(&mut self) -> bool {
        match self.history.pop() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `sq` is attacked by any piece of color `c`.
    pub fn square_attacked_by(&self, sq: Square, c: Color) -> bool {
        let occ = &self.state.occupied;
        let bishops = self.occupied_by_piece(c, Bishop);
        let rooks = self.occupied_by_piece(c, Rook);
        let queens = self.occupied_by_piece(c, Queen);

        knight_attacks(sq).intersects(self.occupied_by_piece(c, Knight))
            || pawn_attacks(!c, sq).intersects(self.occupied_by_piece(c, Pawn))
            || bishop_attacks(sq, occ).intersects(bishops | queens)
            || rook_attacks(sq, occ).intersects(rooks | queens)
            || king_attacks(sq).intersects(self.occupied_by_piece(c, King))
    }

    /// Returns a bitboard containing all squares attacked by pawns of color `c`.
    pub fn pawn_attacks(&self, c: Color) -> Bitboard {
        let forward = if c == White { 1 } else { -1 };
        let pawns = self.occupied_by_piece(c, Pawn);

        pawns.shift_xy(-1, forward) | pawns.shift_xy(1, forward)
    }
}

impl State {
    /// Toggles the presence of a piece on `sq` in every board and both hashes.
    fn toggle_piece(&mut self, c: Color, p: Piece, sq: Square) {
        let mask = Bitboard::from(sq);

        self.occ_by_piece[c as usize][p as usize] ^= mask;
        self.occ_by_color[c as usize] ^= mask;
        self.occupied.toggle(sq);
        self.zobrist.toggle_piece_placement(c, p, sq);
        if p == Pawn {
            self.pawn_zobrist.toggle_piece_placement(c, p, sq);
        }
    }

    /// Moves the castling state for `c` on `side` to `new`, keeping the hash in step.
    fn set_castling(&mut self, c: Color, side: CastleSide, new: CastleState) {
        let old = self.castling[c as usize][side as usize];
        if old != new {
            self.zobrist.toggle_castling(c, side, old);
            self.zobrist.toggle_castling(c, side, new);
            self.castling[c as usize][side as usize] = new;
        }
    }

    /// Takes the right to castle away if it is still available. The other states never
    /// change, so the castling state only ever moves forward.
    fn revoke_castling(&mut self, c: Color, side: CastleSide) {
        if self.castling[c as usize][side as usize] == CanCastle {
            self.set_castling(c, side, CannotCastle);
        }
    }

    /// Calculates both Zobrist keys from scratch.
    fn calc_zobrist(&mut self) {
        self.zobrist = Zobrist::new();
        self.pawn_zobrist = Zobrist::new();

        if self.turn == Black {
            self.zobrist.toggle_turn();
        }
        self.zobrist.toggle_en_passant(self.ep_file);
        for c in &[White, Black] {
            for side in &[KingSide, QueenSide] {
                self.zobrist.toggle_castling(*c, *side,
                    self.castling[*c as usize][*side as usize]);
            }
        }

        for c in &[White, Black] {
            for p in &[Pawn, Knight, Bishop, Rook, Queen, King] {
                for sq in self.occ_by_piece[*c as usize][*p as usize] {
                    self.zobrist.toggle_piece_placement(*c, *p, sq);
                    if *p == Pawn {
                        self.pawn_zobrist.toggle_piece_placement(*c, *p, sq);
                    }
                }
            }
        }
    }
}

impl Default for Position {
    /// Returns the standard starting Position.
    fn default() -> Self {
        Position::new()
    }
}

impl fmt::Display for Position {
    /// Writes out the position using FEN.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_fen_str().fmt(f)
    }
}

impl fmt::Debug for Position {
    /// Writes out the position using FEN.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_fen_str().fmt(f)
    }
}

impl FromStr for Position {
    type Err = Error;

    /// Parse a position from a FEN string.
    fn from_str(s: &str) -> Result<Self> {
        Position::from_fen_str(s)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
pub mod zobrist;
mod san;

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    /// Position::new() must return the standard starting position.
    ///
    /// Depends on to_fen_str() working properly.
    #[test]
    fn new_returns_the_standard_starting_position() {
        assert_eq!(Position::new().to_fen_str(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    /// Tests of Position::from_fen_str()
    mod from_fen_str {
        use super::*;
        use Error::*;

        // 1. empty string returns Err(ParseError)
        #[test]
        fn empty_string_returns_error() {
            assert_eq!(Position::from_fen_str(""), Err(ParseError));
            assert_eq!(Position::from_fen_str(" \t\r\n"), Err(ParseError));
        }

        // 2. 0 or 9 in the board string returns Err(ParseError)
        #[test]
        fn invalid_empty_square_count_returns_error() {
            assert_eq!(Position::from_fen_str("0K1k5/8/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5/9/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
        }

        // 3. 1 and 8 do not return an error (if used correctly)
        #[test]
        fn valid_empty_square_count_is_ok() {
            Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 0 1").expect("valid fen");
        }

        // 4. a rank with more than 8 squares returns Err(ParseError)
        #[test]
        fn rank_too_long_returns_error() {
            assert_eq!(Position::from_fen_str("K1k6/8/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5b/8/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8B w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/b8 w - - 0 1"), Err(ParseError));
        }

        // 5. a rank with less than 8 squares returns Err(ParseError)
        #[test]
        fn rank_too_short_returns_error() {
            assert_eq!(Position::from_fen_str("K1k4/8/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k3b/8/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/6B w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/b6 w - - 0 1"), Err(ParseError));
        }

        // 6. too many ranks returns an error
        #[test]
        fn too_many_ranks_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8/7R w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
        }

        // 7. too few ranks returns an error
        #[test]
        fn too_few_ranks_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/7Q w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
        }

        // 8. pieces on files a and h do not return an error
        // 9. pieces on ranks 1 and 8 do not return an error
        #[test]
        fn edge_files_and_ranks_are_ok() {
            Position::from_fen_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .expect("valid fen");
        }

        // 10. missing turn field returns Err(ParseError)
        #[test]
        fn missing_turn_field_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8"), Err(ParseError));
        }

        // 11. 'w' and 'b' set the turn correctly
        #[test]
        fn turn_set_correctly() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 0 1")
                .expect("valid fen").turn(), White);
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 b - - 0 1")
                .expect("valid fen").turn(), Black);
        }

        // 12. anything other than 'w' and 'b' returns Err(ParseError)
        #[test]
        fn invalid_turn_color_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 x - - 0 1"), Err(ParseError));
        }

        // 13. missing castling flags field returns Err(ParseError)
        #[test]
        fn missing_castling_flag_field_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w"), Err(ParseError));
        }

        // 14. invalid castling flags return Err(ParseError)
        #[test]
        fn invalid_castling_flag_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w x - 0 1"), Err(ParseError));
        }

        // 15. "-" in the castling field leaves all castling rights unavailable
        #[test]
        fn empty_castling_flags_set_correctly() {
            let pos = Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 0 1").expect("valid fen");
            for c in &[White, Black] {
                for side in &[KingSide, QueenSide] {
                    assert_eq!(pos.castling(*c, *side), CannotCastle);
                }
            }
        }

        // 16. any combination of "KQkq" sets the appropriate rights
        #[test]
        fn castling_flags_set_correctly() {
            let pos = Position::from_fen_str("r3k2r/8/8/8/8/8/8/R3K2R w Kk - 0 1")
                .expect("valid fen");
            assert!(pos.can_castle(White, KingSide) && pos.can_castle(Black, KingSide));
            assert!(!pos.can_castle(White, QueenSide) && !pos.can_castle(Black, QueenSide));

            let pos = Position::from_fen_str("r3k2r/8/8/8/8/8/8/R3K2R w Qq - 0 1")
                .expect("valid fen");
            assert!(!pos.can_castle(White, KingSide) && !pos.can_castle(Black, KingSide));
            assert!(pos.can_castle(White, QueenSide) && pos.can_castle(Black, QueenSide));

            let pos = Position::from_fen_str("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
                .expect("valid fen");
            for c in &[White, Black] {
                for side in &[KingSide, QueenSide] {
                    assert!(pos.can_castle(*c, *side));
                }
            }

            let pos = Position::from_fen_str("r3k2r/8/8/8/8/8/8/R3K2R w KQ - 0 1")
                .expect("valid fen");
            assert!(pos.can_castle(White, KingSide) && pos.can_castle(White, QueenSide));
            assert!(!pos.has_castling_rights(Black));

            let pos = Position::from_fen_str("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1")
                .expect("valid fen");
            assert!(!pos.has_castling_rights(White));
            assert!(pos.can_castle(Black, KingSide) && pos.can_castle(Black, QueenSide));
        }

        // 17. missing en passant field returns Err(ParseError)
        #[test]
        fn missing_en_passant_field_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w -"), Err(ParseError));
        }

        // 18. "-" in the en passant field clears the en passant file
        #[test]
        fn no_en_passant_square_set_correctly() {
            let pos = Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 0 1").expect("valid fen");
            assert_eq!(pos.en_passant_file(), None);
            assert_eq!(pos.en_passant_square(), None);
        }

        // 19. an en passant field that is not a square returns Err(ParseError)
        #[test]
        fn bad_en_passant_square_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - x 0 1"), Err(ParseError));
        }

        // 20. an en passant square on the wrong rank for the turn returns Err(ParseError)
        #[test]
        fn en_passant_square_on_wrong_rank_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/7p/8/8/8/8 w - h5 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/7P/8/8/8 b - h4 0 1"), Err(ParseError));
        }

        // 21. a valid en passant square sets the file, and the rank follows the turn
        #[test]
        fn valid_en_passant_square_set_correctly() {
            let pos = Position::from_fen_str("K1k5/8/8/7p/8/8/8/8 w - h6 0 1")
                .expect("valid fen");
            assert_eq!(pos.en_passant_file(), Some(File::H));
            assert_eq!(pos.en_passant_square(), Some(Square::H6));

            let pos = Position::from_fen_str("K1k5/8/8/8/7P/8/8/8 b - h3 0 1")
                .expect("valid fen");
            assert_eq!(pos.en_passant_file(), Some(File::H));
            assert_eq!(pos.en_passant_square(), Some(Square::H3));
        }

        // 22. a missing half move clock field leaves it set to zero
        #[test]
        fn missing_halfmove_clock_field_defaults_to_zero() {
            let pos = Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - -").expect("valid fen");
            assert_eq!(pos.draw_plies(), 0);
        }

        // 23. a non-integer half move clock field returns Err(ParseError)
        #[test]
        fn bad_halfmove_clock_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - x 1"), Err(ParseError));
        }

        // 24. an integer half move clock field sets the value
        #[test]
        fn valid_halfmove_clock_set_correctly() {
            let pos = Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 500 1")
                .expect("valid fen");
            assert_eq!(pos.draw_plies(), 500);
        }

        // 25. a missing full move number field leaves it set to one
        #[test]
        fn missing_fullmove_number_field_defaults_to_one() {
            let pos = Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - -").expect("valid fen");
            assert_eq!(pos.move_number(), 1);
        }

        // 26. a non-integer full move number field returns Err(ParseError)
        #[test]
        fn bad_fullmove_number_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 0 x"), Err(ParseError));
        }

        // 27. an integer full move number field sets the value
        #[test]
        fn valid_fullmove_number_set_correctly() {
            let pos = Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 0 9999")
                .expect("valid fen");
            assert_eq!(pos.move_number(), 9999);
        }

        // 28. two kings on one side returns Err(InvalidKingCount)
        #[test]
        fn multiple_kings_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/7K/8 w - - 0 1"),
                Err(InvalidKingCount));
        }

        // 29. no kings on one side returns Err(InvalidKingCount)
        #[test]
        fn missing_king_returns_error() {
            assert_eq!(Position::from_fen_str("K7/8/8/8/8/8/8/8 w - - 0 1"),
                Err(InvalidKingCount));
        }

        // 30. pawns on rank 1 or 8 return Err(InvalidPawnRank)
        #[test]
        fn pawns_on_first_or_last_rank_returns_error() {
            assert_eq!(Position::from_fen_str("K1k4p/8/8/8/8/8/8/8 w - - 0 1"),
                Err(InvalidPawnRank));
            assert_eq!(Position::from_fen_str("K1k4P/8/8/8/8/8/8/8 w - - 0 1"),
                Err(InvalidPawnRank));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/p7 w - - 0 1"),
                Err(InvalidPawnRank));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/P7 w - - 0 1"),
                Err(InvalidPawnRank));
        }

        // 31. an attacked opponent king returns Err(KingCapturable)
        #[test]
        fn capturable_king_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/2R5 w - - 0 1"),
                Err(KingCapturable));
        }

        // 32. a piece in the en passant square returns Err(EnPassantSquareOccupied)
        #[test]
        fn en_passant_square_occupied_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/7p/7p/8/8/8/8 w - h6 0 1"),
                Err(EnPassantSquareOccupied));
        }

        // 33. a missing en passant capture pawn returns Err(MissingEnPassantPawn)
        #[test]
        fn missing_en_passant_capture_pawn_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - h6 0 1"),
                Err(MissingEnPassantPawn));
        }

        // 34. for each player, a king out of its origin square with castling rights
        //      returns Err(InvalidCastlingFlags)
        #[test]
        fn castling_rights_when_king_has_moved_returns_error() {
            assert_eq!(Position::from_fen_str("2k5/8/8/8/8/8/7K/R6R w K - 0 1"),
                Err(InvalidCastlingFlags));
            assert_eq!(Position::from_fen_str("2k5/8/8/8/8/8/7K/R6R w Q - 0 1"),
                Err(InvalidCastlingFlags));
            assert_eq!(Position::from_fen_str("r6r/7k/8/8/8/8/8/2K5 w k - 0 1"),
                Err(InvalidCastlingFlags));
            assert_eq!(Position::from_fen_str("r6r/7k/8/8/8/8/8/2K5 w q - 0 1"),
                Err(InvalidCastlingFlags));
        }

        // 35. for each player, a missing king-side rook with king-side castling rights
        //      returns Err(InvalidCastlingFlags)
        // 36. for each player, a missing queen-side rook with queen-side castling rights
        //      returns Err(InvalidCastlingFlags)
        #[test]
        fn castling_rights_when_rook_has_moved_returns_error() {
            assert_eq!(Position::from_fen_str("2k5/8/8/8/8/8/8/4K3 w K - 0 1"),
                Err(InvalidCastlingFlags));
            assert_eq!(Position::from_fen_str("2k5/8/8/8/8/8/8/4K3 w Q - 0 1"),
                Err(InvalidCastlingFlags));
            assert_eq!(Position::from_fen_str("4k3/8/8/8/8/8/8/2K5 w k - 0 1"),
                Err(InvalidCastlingFlags));
            assert_eq!(Position::from_fen_str("4k3/8/8/8/8/8/8/2K5 w q - 0 1"),
                Err(InvalidCastlingFlags));
        }

        // 37. if there are no errors, to_fen_str() returns the input fen string
        #[test]
        fn back_to_identical_fen() {
            for fen in &[
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
                "rnbqkb1r/ppppp1pp/7n/4Pp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
                "8/5k2/3p4/1p1Pp2p/pP2Pp1P/P4P1K/8/8 b - - 99 50",
            ] {
                assert_eq!(&Position::from_fen_str(fen).expect("valid fen").to_fen_str(), fen);
            }
        }
    }

    /// Tests of make(), unmake() and make_null()
    mod make_and_unmake {
        use super::*;

        fn must_parse(s: &str) -> Move {
            s.parse().expect("valid move")
        }

        #[test]
        fn quiet_moves_and_captures_update_the_board() {
            let mut pos = Position::new();
            assert!(!pos.make(must_parse("e2e4")));
            assert_eq!(pos.to_fen_str(),
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPPPPPP/RNBQKBNR b KQkq e3 0 1");
            assert!(!pos.make(must_parse("d7d5")));
            assert_eq!(pos.to_fen_str(),
                "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPPPPPP/RNBQKBNR w KQkq d6 0 2");
            assert!(pos.make(must_parse("e4d5")));
            assert_eq!(pos.to_fen_str(),
                "rnbqkbnr/ppp1pppp/8/3P4/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 2");
            assert!(pos.make(must_parse("d8d5")));
            assert_eq!(pos.to_fen_str(),
                "rnb1kbnr/ppp1pppp/8/3q4/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 3");
        }

        #[test]
        fn capturing_reports_true_and_updates_the_counts() {
            let mut pos: Position = "K1k5/8/8/3p4/4P3/8/8/8 w - - 0 1".parse()
                .expect("valid fen");
            assert_eq!(pos.count(Black, Pawn), 1);
            assert!(pos.make(must_parse("e4d5")));
            assert_eq!(pos.count(Black, Pawn), 0);
            assert_eq!(pos.count(White, Pawn), 1);
        }

        #[test]
        fn en_passant_capture_removes_the_passed_pawn() {
            let mut pos: Position =
                "rnbqkb1r/ppppp1pp/7n/4Pp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3".parse()
                    .expect("valid fen");
            assert!(pos.make(must_parse("e5f6")));
            assert_eq!(pos.to_fen_str(),
                "rnbqkb1r/ppppp1pp/5P1n/8/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3");
        }

        #[test]
        fn the_en_passant_window_closes_after_one_move() {
            let mut pos = Position::new();
            pos.make(must_parse("e2e4"));
            assert_eq!(pos.en_passant_square(), Some(Square::E3));
            pos.make(must_parse("g8f6"));
            assert_eq!(pos.en_passant_square(), None);
        }

        #[test]
        fn castling_moves_the_rook_and_records_the_castle() {
            let mut pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse()
                .expect("valid fen");
            pos.make(must_parse("e1g1"));
            assert_eq!(pos.to_fen_str(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");
            assert_eq!(pos.castling(White, KingSide), HasCastled);
            assert_eq!(pos.castling(White, QueenSide), CannotCastle);

            pos.make(must_parse("e8c8"));
            assert_eq!(pos.to_fen_str(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");
            assert_eq!(pos.castling(Black, QueenSide), HasCastled);
            assert_eq!(pos.castling(Black, KingSide), CannotCastle);
        }

        #[test]
        fn moving_a_king_or_rook_revokes_the_rights() {
            let mut pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse()
                .expect("valid fen");
            pos.make(must_parse("a1a2"));
            assert!(!pos.can_castle(White, QueenSide));
            assert!(pos.can_castle(White, KingSide));

            pos.make(must_parse("e8e7"));
            assert!(!pos.has_castling_rights(Black));
            assert_eq!(pos.castling(Black, KingSide), CannotCastle);
        }

        #[test]
        fn capturing_a_rook_at_home_revokes_the_rights() {
            let mut pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse()
                .expect("valid fen");
            pos.make(must_parse("a1a8"));
            assert!(!pos.can_castle(Black, QueenSide));
            assert!(pos.can_castle(Black, KingSide));
        }

        #[test]
        fn promotion_changes_the_piece_and_the_counts() {
            let mut pos: Position = "5k2/P7/8/8/8/8/8/4K3 w - - 0 1".parse()
                .expect("valid fen");
            pos.make(must_parse("a7a8q"));
            assert_eq!(pos.to_fen_str(), "Q4k2/8/8/8/8/8/8/4K3 b - - 0 1");
            assert_eq!(pos.count(White, Pawn), 0);
            assert_eq!(pos.count(White, Queen), 1);
        }

        #[test]
        fn underpromotion_capture_in_the_corner_revokes_the_rights() {
            let mut pos: Position = "4k3/8/8/8/8/8/6p1/4K2R b K - 0 1".parse()
                .expect("valid fen");
            pos.make(must_parse("g2h1n"));
            assert_eq!(pos.count(Black, Knight), 1);
            assert_eq!(pos.count(White, Rook), 0);
            assert!(!pos.can_castle(White, KingSide));
        }

        #[test]
        fn unmake_restores_the_position_exactly() {
            let mut pos = Position::new();
            let start = pos.clone();

            for mov in &["e2e4", "d7d5", "e4d5", "d8d5", "b1c3", "d5a5", "e1e2"] {
                pos.make(must_parse(mov));
            }
            while pos.unmake() { }

            assert_eq!(pos, start);
            assert_eq!(pos.zobrist_key(), start.zobrist_key());
            assert_eq!(pos.pawn_zobrist_key(), start.pawn_zobrist_key());
        }

        #[test]
        fn unmake_on_a_fresh_position_returns_false() {
            let mut pos = Position::new();
            assert!(!pos.unmake());
        }

        #[test]
        fn null_moves_flip_the_turn_and_can_be_taken_back() {
            let mut pos = Position::new();
            let start = pos.clone();

            pos.make_null();
            assert_eq!(pos.turn(), Black);
            assert_ne!(pos.zobrist_key(), start.zobrist_key());

            assert!(pos.unmake());
            assert_eq!(pos, start);
        }

        #[test]
        fn a_null_move_closes_the_en_passant_window() {
            let mut pos = Position::new();
            pos.make(must_parse("e2e4"));
            pos.make_null();
            assert_eq!(pos.en_passant_file(), None);
        }

        #[test]
        fn incremental_hashes_match_recalculation_from_scratch() {
            let mut pos: Position = "r3k2r/8/5p2/8/8/8/5P2/R3K2R w KQkq - 0 1".parse()
                .expect("valid fen");

            for mov in &["e1g1", "f6f5", "f2f4", "e8c8", "a1b1"] {
                pos.make(must_parse(mov));

                let mut scratch = pos.state;
                scratch.calc_zobrist();
                assert_eq!(pos.zobrist_key(), scratch.zobrist);
                assert_eq!(pos.pawn_zobrist_key(), scratch.pawn_zobrist);
            }
        }

        #[test]
        fn rotated_occupancy_stays_consistent_through_make_and_unmake() {
            let mut pos = Position::new();

            for mov in &["d2d4", "g8f6", "c1f4", "e7e6", "d4d5", "f8b4", "c2c3", "e8g8"] {
                pos.make(must_parse(mov));

                let mut rebuilt = RotatedBitboard::new();
                for sq in pos.occupied() {
                    rebuilt.toggle(sq);
                }
                assert_eq!(pos.state.occupied, rebuilt);
            }
            while pos.unmake() { }

            assert_eq!(pos, Position::new());
        }
    }

    /// Tests of generate() and legal_moves()
    mod generate {
        use super::*;

        #[test]
        fn the_starting_position_has_twenty_moves() {
            let pos = Position::new();
            let mut moves = Vec::new();

            assert!(pos.generate(&mut moves, false));
            assert_eq!(moves.len(), 20);
            assert_eq!(pos.legal_moves().len(), 20);
        }

        #[test]
        fn captures_only_limits_generation_to_captures_and_promotions() {
            let pos: Position = "4k3/1P6/8/3p4/4P3/8/8/4K3 w - - 0 1".parse()
                .expect("valid fen");
            let mut moves = Vec::new();

            assert!(pos.generate(&mut moves, true));
            // exd5 plus four promotions on b8
            assert_eq!(moves.len(), 5);
            assert!(moves.contains(&Move::new(Square::E4, Square::D5)));
            assert!(moves.contains(&Move::promotion(Square::B7, Square::B8, ToQueen)));
            assert!(moves.iter().all(|m| m.prom.is_some() || m.dest == Square::D5));
        }

        #[test]
        fn moves_into_check_are_generated_but_not_legal() {
            // the black king may not approach the white king
            let pos: Position = "8/8/8/3k4/8/3K4/8/8 b - - 0 1".parse().expect("valid fen");
            let mut moves = Vec::new();

            pos.generate(&mut moves, false);
            assert!(moves.contains(&Move::new(Square::D5, Square::D4)));

            let legal = pos.legal_moves();
            assert!(!legal.contains(&Move::new(Square::D5, Square::D4)));
            assert_eq!(legal.len(), 5);
        }

        #[test]
        fn castling_is_not_generated_through_an_attacked_square() {
            // the queen on h3 sees f1, so only the queen side castle is available
            let pos: Position = "r3k2r/8/8/8/8/7q/8/R3K2R w KQkq - 0 1".parse()
                .expect("valid fen");
            let moves = pos.legal_moves();

            assert!(!moves.contains(&Move::new(Square::E1, Square::G1)));
            assert!(moves.contains(&Move::new(Square::E1, Square::C1)));
        }

        #[test]
        fn castling_is_not_generated_while_in_check() {
            let pos: Position = "r3k2r/8/8/8/8/4q3/8/R3K2R w KQkq - 0 1".parse()
                .expect("valid fen");
            let moves = pos.legal_moves();

            assert!(!moves.contains(&Move::new(Square::E1, Square::G1)));
            assert!(!moves.contains(&Move::new(Square::E1, Square::C1)));
        }

        #[test]
        fn castling_is_not_generated_through_occupied_squares() {
            let pos = Position::new();
            let moves = pos.legal_moves();

            assert!(!moves.contains(&Move::new(Square::E1, Square::G1)));
            assert!(!moves.contains(&Move::new(Square::E1, Square::C1)));
        }

        #[test]
        fn en_passant_captures_are_generated() {
            let pos: Position =
                "rnbqkb1r/ppppp1pp/7n/4Pp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3".parse()
                    .expect("valid fen");

            assert!(pos.legal_moves().contains(&Move::new(Square::E5, Square::F6)));
        }

        #[test]
        fn a_capturable_king_is_reported_and_never_listed() {
            // black ignored the check, so white could now take the king
            let mut pos: Position = "4k3/7p/8/8/8/4R3/8/4K3 b - - 0 1".parse()
                .expect("valid fen");
            pos.make("h7h6".parse::<Move>().expect("valid move"));

            assert!(pos.king_capturable());
            let mut moves = Vec::new();
            assert!(!pos.generate(&mut moves, false));
            assert!(moves.iter().all(|m| m.dest != Square::E8));
        }
    }

    /// Tests of status() and its components
    mod status {
        use super::*;

        #[test]
        fn the_starting_position_is_in_progress() {
            assert_eq!(Position::new().status(true), Status::InProgress);
        }

        #[test]
        fn back_rank_mate_is_checkmate() {
            let pos: Position = "R5k1/5ppp/8/8/8/8/8/K7 b - - 0 1".parse().expect("valid fen");
            assert_eq!(pos.status(true), Status::Checkmate);
        }

        #[test]
        fn fools_mate_is_checkmate() {
            let mut pos = Position::new();
            for mov in &["f2f3", "e7e5", "g2g4", "d8h4"] {
                pos.make(mov.parse::<Move>().expect("valid move"));
            }
            assert_eq!(pos.status(true), Status::Checkmate);
        }

        #[test]
        fn no_moves_without_check_is_stalemate() {
            let pos: Position = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().expect("valid fen");
            assert_eq!(pos.status(true), Status::Stalemate);
        }

        #[test]
        fn lone_kings_are_insufficient_material() {
            let pos: Position = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().expect("valid fen");
            assert!(pos.insufficient_material());
            assert_eq!(pos.status(true), Status::InsufficientMaterial);
        }

        #[test]
        fn a_single_minor_piece_is_insufficient_material() {
            for fen in &["4k3/8/8/8/8/8/8/3BK3 w - - 0 1", "4k3/8/8/8/8/8/8/3NK3 w - - 0 1"] {
                let pos: Position = fen.parse().expect("valid fen");
                assert!(pos.insufficient_material());
            }
        }

        #[test]
        fn a_rook_is_sufficient_material() {
            let pos: Position = "4k3/8/8/8/8/8/8/3RK3 w - - 0 1".parse().expect("valid fen");
            assert!(!pos.insufficient_material());
            assert_eq!(pos.status(true), Status::InProgress);
        }

        #[test]
        fn same_colored_bishops_are_insufficient_material() {
            // both bishops live on the light squares
            let pos: Position = "2b1k3/8/8/8/8/8/8/4KB2 w - - 0 1".parse().expect("valid fen");
            assert!(pos.insufficient_material());

            // opposite colored bishops can still mate
            let pos: Position = "4kb2/8/8/8/8/8/8/4KB2 w - - 0 1".parse().expect("valid fen");
            assert!(!pos.insufficient_material());

            // two knights count as sufficient
            let pos: Position = "4k3/8/8/8/8/8/8/2NNK3 w - - 0 1".parse().expect("valid fen");
            assert!(!pos.insufficient_material());
        }

        #[test]
        fn shuffling_knights_back_and_forth_is_repetition() {
            let mut pos = Position::new();
            let moves = ["g1f3", "g8f6", "f3g1", "f6g8"];

            for mov in &moves {
                pos.make(mov.parse::<Move>().expect("valid move"));
            }
            assert_eq!(pos.repetitions(), 2);
            assert_eq!(pos.status(true), Status::InProgress);

            for mov in &moves {
                pos.make(mov.parse::<Move>().expect("valid move"));
            }
            assert_eq!(pos.repetitions(), 3);
            assert_eq!(pos.status(true), Status::Repetition);
        }

        #[test]
        fn one_hundred_quiet_plies_is_a_draw() {
            let pos: Position = "4k3/4r3/8/8/8/8/4R3/4K3 w - - 100 80".parse()
                .expect("valid fen");
            assert_eq!(pos.status(true), Status::FiftyMoves);

            let pos: Position = "4k3/4r3/8/8/8/8/4R3/4K3 w - - 99 80".parse()
                .expect("valid fen");
            assert_eq!(pos.status(true), Status::InProgress);
        }

        #[test]
        fn checkmate_outranks_the_fifty_move_rule() {
            let pos: Position = "R5k1/5ppp/8/8/8/8/8/K7 b - - 100 80".parse()
                .expect("valid fen");
            assert_eq!(pos.status(true), Status::Checkmate);
            assert_eq!(pos.status(false), Status::FiftyMoves);
        }
    }

    /// Tests of the attack queries
    mod attacks {
        use super::*;

        #[test]
        fn square_attacked_by_sees_every_piece_type() {
            let pos: Position = "4k3/8/1n6/8/2P5/5q2/4P3/R3K3 w - - 0 1".parse()
                .expect("valid fen");

            // the rook along the first rank and the a file
            assert!(pos.square_attacked_by(Square::D1, White));
            assert!(pos.square_attacked_by(Square::A7, White));
            // pawn captures only strike diagonally
            assert!(pos.square_attacked_by(Square::B5, White));
            assert!(pos.square_attacked_by(Square::D5, White));
            assert!(!pos.square_attacked_by(Square::C5, White));
            // the knight and the queen
            assert!(pos.square_attacked_by(Square::D5, Black));
            assert!(pos.square_attacked_by(Square::F7, Black));
            // the queen cannot see through the pawn on e2
            assert!(pos.square_attacked_by(Square::E2, Black));
            assert!(!pos.square_attacked_by(Square::D1, Black));
        }

        #[test]
        fn in_check_and_king_capturable_look_at_opposite_kings() {
            let pos: Position = "4k3/8/8/8/8/8/8/R3K3 b - - 0 1".parse().expect("valid fen");
            assert!(!pos.in_check());
            assert!(!pos.king_capturable());

            let pos: Position = "k3r3/8/8/8/8/8/8/4K3 w - - 0 1".parse().expect("valid fen");
            assert!(pos.in_check());
            assert!(!pos.king_capturable());
        }

        #[test]
        fn pawn_attacks_covers_both_wings() {
            let pos = Position::new();
            let attacks = pos.pawn_attacks(White);

            for sq in &[Square::A3, Square::B3, Square::G3, Square::H3] {
                assert!(attacks.contains(*sq));
            }
            assert!(!attacks.contains(Square::A4));
        }
    }
}
