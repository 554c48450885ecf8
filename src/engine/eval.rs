//! Static evaluation of a position.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryFrom;
use std::mem::size_of;
use std::ops;
use crate::chess::{CastleSide, Color, File, Piece, Position, Rank, Square, Zobrist};
use crate::chess::bitboard::{Bitboard, pawn_attacks};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Score
///
/// Scores are in centipawns. Mate scores count plies from the root, so a shorter mate always
/// scores higher than a longer one. The illegal sentinel sits above every mate score and below
/// infinity, so a move which loses the king outranks any legal disaster.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score(i16);

impl Score {
    /// Returns the greatest possible score
    pub fn infinity() -> Self {
        Score(30_000)
    }
    /// Returns the score of a position where the enemy king can be captured
    pub fn illegal() -> Self {
        Score(20_000)
    }
    /// Returns the score for a draw
    pub fn draw() -> Self {
        Score(0)
    }
    /// Returns the score for checkmating at ply `n`
    pub fn mates_in(n: usize) -> Self {
        Score(10_000 - n as i16)
    }
    /// Returns the score for being checkmated at ply `n`
    pub fn mated_in(n: usize) -> Self {
        Score(-10_000 + n as i16)
    }
}

impl ops::Neg for Score {
    type Output = Score;

    fn neg(self) -> Self {
        Score(-self.0)
    }
}

impl ops::Add<i16> for Score {
    type Output = Score;

    fn add(self, rhs: i16) -> Self {
        Score(self.0 + rhs)
    }
}

impl ops::Sub<i16> for Score {
    type Output = Score;

    fn sub(self, rhs: i16) -> Self {
        Score(self.0 - rhs)
    }
}

impl From<i16> for Score {
    fn from(val: i16) -> Self {
        Score(val)
    }
}

impl From<Score> for i16 {
    fn from(val: Score) -> Self {
        val.0
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
const PIECE_VAL: [i16; Piece::COUNT] = [ 100, 300, 300, 500, 900, 10_000 ];

const PIECE_SQUARE_VAL: [[i16; Square::COUNT]; Piece::COUNT] = [
    [ // Pawn
      //  a    b    c    d    e    f    g    h
          0,   0,   0,   0,   0,   0,   0,   0, // 1
          5,  10,  10, -20, -20,  10,  10,   5, // 2
          5,  -5, -10,   0,   0, -10,  -5,   5, // 3
          0,   0,   0,  20,  20,   0,   0,   0, // 4
          5,   5,  10,  25,  25,  10,   5,   5, // 5
         10,  10,  20,  30,  30,  20,  10,  10, // 6
         50,  50,  50,  50,  50,  50,  50,  50, // 7
          0,   0,   0,   0,   0,   0,   0,   0, // 8
    ],
    [ // Knight
      //  a    b    c    d    e    f    g    h
        -50, -40, -30, -30, -30, -30, -40, -50, // 1
        -40, -20,   0,   5,   5,   0, -20, -40, // 2
        -30,   5,  10,  15,  15,  10,   5, -30, // 3
        -30,   0,  15,  20,  20,  15,   0, -30, // 4
        -30,   5,  15,  20,  20,  15,   5, -30, // 5
        -30,   0,  10,  15,  15,  10,   0, -30, // 6
        -40, -20,   0,   0,   0,   0, -20, -40, // 7
        -50, -40, -30, -30, -30, -30, -40, -50, // 8
    ],
    [ // Bishop
      //  a    b    c    d    e    f    g    h
          2,   0,   0,   0,   0,   0,   0,   2, // 1
          0,   8,   0,   5,   5,   0,   8,   0, // 2
          0,   5,   8,   6,   6,   8,   5,   0, // 3
          0,   5,   6,  10,  10,   6,   5,   0, // 4
          0,   5,   6,  10,  10,   6,   5,   0, // 5
          0,   5,   8,   6,   6,   8,   5,   0, // 6
          0,   8,   0,   5,   5,   0,   8,   0, // 7
          2,   0,   0,   0,   0,   0,   0,   2, // 8
    ],
    [ 0; Square::COUNT ], // Rook
    [ 0; Square::COUNT ], // Queen
    [ 0; Square::COUNT ], // King
];

const MID_KING_TABLE: [i16; Square::COUNT] = [
    //  a    b    c    d    e    f    g    h
     20,  30,  10,   0,   0,  10,  40,  20, // 1
     10,  10,   0, -10, -10,   0,  10,  10, // 2
    -10, -20, -20, -30, -30, -20, -20, -10, // 3
    -30, -30, -40, -40, -40, -40, -30, -30, // 4
    -40, -40, -50, -50, -50, -50, -40, -40, // 5
    -50, -50, -60, -60, -60, -60, -50, -50, // 6
    -60, -60, -60, -60, -60, -60, -60, -60, // 7
    -70, -70, -70, -70, -70, -70, -70, -70, // 8
];

const END_KING_TABLE: [i16; Square::COUNT] = [
    //  a    b    c    d    e    f    g    h
    -50, -40, -30, -20, -20, -30, -40, -50, // 1
    -40, -30, -10,   0,   0, -10, -30, -40, // 2
    -30, -10,  20,  30,  30,  20, -10, -30, // 3
    -20,   0,  30,  50,  50,  30,   0, -20, // 4
    -20,   0,  30,  50,  50,  30,   0, -20, // 5
    -30, -10,  20,  30,  30,  20, -10, -30, // 6
    -40, -30, -10,   0,   0, -10, -30, -40, // 7
    -50, -40, -30, -20, -20, -30, -40, -50, // 8
];

const PASSED_PAWN_VAL: [i16; Rank::COUNT] = [ 0, 10, 15, 25, 40, 60, 100, 0 ];
const DOUBLED_PAWN_VAL: i16 = -15;
const ISOLATED_PAWN_VAL: i16 = -12;
const PAWN_DUO_VAL: i16 = 4;
const KNIGHT_OUTPOST_VAL: i16 = 15;
const BISHOP_ENDGAME_VAL: i16 = 25;
const TRAPPED_BISHOP_VAL: i16 = -150;
const ROOK_ON_SEVENTH_VAL: i16 = 25;
const QUEEN_ON_SEVENTH_VAL: i16 = 15;
const QUEEN_OFFSIDE_VAL: i16 = -15;
const LOST_CASTLING_VAL: i16 = -30;

// files a to d, and e to h
const QUEEN_SIDE: u64 = 0x0f0f_0f0f_0f0f_0f0f;
const KING_SIDE: u64 = 0xf0f0_f0f0_f0f0_f0f0;

/// Returns the value of a piece.
pub fn piece_val(piece: Piece) -> i16 {
    PIECE_VAL[piece as usize]
}

fn adjacent_files(file: File) -> Bitboard {
    let f = Bitboard::from(file);

    f.shift_x(-1) | f.shift_x(1)
}

fn ranks_ahead(color: Color, rank: Rank) -> Bitboard {
    let bits = match color {
        Color::White => u64::max_value().checked_shl(8 * (rank as u32 + 1)),
        Color::Black => u64::max_value().checked_shr(8 * (Rank::COUNT as u32 - rank as u32)),
    };

    Bitboard::from(bits.unwrap_or(0))
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A memoization table for the pawn-structure score, keyed by the pawn hash.
///
/// One slot per index, last write wins. A size of zero turns every probe into a miss and every
/// store into a no-op.
#[derive(Debug)]
pub struct PawnCache(Vec<Option<(Zobrist, i16)>>);

impl PawnCache {
    /// Creates a cache which uses approximately `megabytes` of memory.
    pub fn new(megabytes: usize) -> PawnCache {
        let slots = megabytes * (1 << 20) / size_of::<Option<(Zobrist, i16)>>();
        if slots == 0 {
            return PawnCache(Vec::new());
        }
        let slots = (slots/2 + 1).next_power_of_two();

        PawnCache(vec![None; slots])
    }

    /// Returns the value stored for `hash`, if there is one.
    pub fn probe(&self, hash: Zobrist) -> Option<i16> {
        if self.0.is_empty() {
            return None;
        }

        match self.0[u64::from(hash) as usize & (self.0.len() - 1)] {
            Some((tag, value)) if tag == hash => Some(value),
            _ => None,
        }
    }

    /// Stores `value` for `hash`, evicting whatever occupied its slot.
    pub fn store(&mut self, hash: Zobrist, value: i16) {
        if self.0.is_empty() {
            return;
        }

        let index = u64::from(hash) as usize & (self.0.len() - 1);
        self.0[index] = Some((hash, value));
    }

    /// Empties the cache.
    pub fn clear(&mut self) {
        let len = self.0.len();
        self.0.clear();
        self.0.resize(len, None);
    }
}

/// Computes the pawn-structure score, white minus black. Depends only on the pawns, so the
/// result can be cached by the pawn hash.
fn pawn_structure(pos: &Position) -> i16 {
    use Color::*;

    let mut val = [0i16; Color::COUNT];

    for color in [White, Black].iter().copied() {
        let own = pos.occupied_by_piece(color, Piece::Pawn);
        let enemy = pos.occupied_by_piece(!color, Piece::Pawn);

        for file in 0..File::COUNT {
            let file = File::try_from(file).expect("INFALLIBLE");
            let on_file = (own & file.into()).len() as i16;
            if on_file == 0 {
                continue;
            }

            if on_file > 1 {
                val[color as usize] += (on_file - 1) * DOUBLED_PAWN_VAL;
            }
            if (own & adjacent_files(file)).is_empty() {
                val[color as usize] += on_file * ISOLATED_PAWN_VAL;
            }
        }

        for sq in own {
            let ahead = (Bitboard::from(sq.file()) | adjacent_files(sq.file()))
                & ranks_ahead(color, sq.rank());
            if (enemy & ahead).is_empty() {
                let rel = match color {
                    White => sq.rank() as usize,
                    Black => Rank::COUNT - 1 - sq.rank() as usize,
                };
                val[color as usize] += PASSED_PAWN_VAL[rel];
            }
        }

        let neighbors = own.shift_x(-1) | own.shift_x(1);
        val[color as usize] += (own & neighbors).len() as i16 * PAWN_DUO_VAL;
    }

    val[White as usize] - val[Black as usize]
}

/// Scores the placement of the pieces of `color`, beyond what the piece-square tables see.
fn piece_features(pos: &Position, color: Color) -> i16 {
    use Piece::*;

    let mut val = 0;

    let own_pawns = pos.occupied_by_piece(color, Pawn);
    let enemy_pawns = pos.occupied_by_piece(!color, Pawn);
    let all_pawns = own_pawns | enemy_pawns;
    let enemy_king = pos.king_location(!color);

    // a knight planted where no enemy pawn can ever evict it
    for sq in pos.occupied_by_piece(color, Knight) {
        let rel = match color {
            Color::White => sq.rank() as usize,
            Color::Black => Rank::COUNT - 1 - sq.rank() as usize,
        };
        if rel >= 3 && rel <= 5
            && pawn_attacks(!color, sq).intersects(own_pawns)
            && (enemy_pawns & adjacent_files(sq.file()) & ranks_ahead(color, sq.rank())).is_empty() {
            val += KNIGHT_OUTPOST_VAL;
        }
    }

    // a bishop outruns a knight when the pawns span both wings
    if pos.count(color, Bishop) > 0
        && pos.count(!color, Bishop) == 0 && pos.count(!color, Knight) > 0
        && all_pawns.intersects(QUEEN_SIDE.into()) && all_pawns.intersects(KING_SIDE.into()) {
        val += BISHOP_ENDGAME_VAL;
    }

    // bishops locked into the enemy's corner
    let bishops = pos.occupied_by_piece(color, Bishop);
    match color {
        Color::White => {
            if bishops.contains(Square::A7) && enemy_pawns.contains(Square::B6) {
                val += TRAPPED_BISHOP_VAL;
            }
            if bishops.contains(Square::H7) && enemy_pawns.contains(Square::G6) {
                val += TRAPPED_BISHOP_VAL;
            }
        },
        Color::Black => {
            if bishops.contains(Square::A2) && enemy_pawns.contains(Square::B3) {
                val += TRAPPED_BISHOP_VAL;
            }
            if bishops.contains(Square::H2) && enemy_pawns.contains(Square::G3) {
                val += TRAPPED_BISHOP_VAL;
            }
        },
    }

    // heavy pieces on the seventh rank, while it matters
    let (seventh, eighth) = match color {
        Color::White => (Rank::R7, Rank::R8),
        Color::Black => (Rank::R2, Rank::R1),
    };
    if enemy_king.rank() == eighth || enemy_pawns.intersects(seventh.into()) {
        let seventh = Bitboard::from(seventh);
        let rooks = pos.occupied_by_piece(color, Rook);
        let queens = pos.occupied_by_piece(color, Queen);
        val += (rooks & seventh).len() as i16 * ROOK_ON_SEVENTH_VAL;
        val += (queens & seventh).len() as i16 * QUEEN_ON_SEVENTH_VAL;
    }

    // a queen on the far wing from the enemy king
    for sq in pos.occupied_by_piece(color, Queen) {
        let qf = sq.file() as i8;
        let kf = enemy_king.file() as i8;
        if (qf <= File::B as i8 && kf >= File::F as i8)
            || (qf >= File::G as i8 && kf <= File::C as i8) {
            val += QUEEN_OFFSIDE_VAL;
        }
    }

    if !pos.has_castled(color)
        && !pos.can_castle(color, CastleSide::KingSide)
        && !pos.can_castle(color, CastleSide::QueenSide) {
        val += LOST_CASTLING_VAL;
    }

    // the king belongs in the corner until the pawns thin out
    let sq = pos.king_location(color);
    let sq = match color {
        Color::White => sq as usize,
        Color::Black => sq as usize ^ 0o70,
    };
    let wings = all_pawns.intersects(QUEEN_SIDE.into()) as usize
        + all_pawns.intersects(KING_SIDE.into()) as usize;
    val += match wings {
        2 => MID_KING_TABLE[sq],
        1 => (MID_KING_TABLE[sq] + END_KING_TABLE[sq])/2,
        _ => END_KING_TABLE[sq],
    };

    val
}

/// Returns the estimated static score of `pos`, from the perspective of the side that just
/// moved. Deterministic given the position; `pawns` only memoizes the pawn-structure term.
pub fn evaluate(pos: &Position, pawns: &mut PawnCache) -> Score {
    use Color::*;
    use Piece::*;

    // a missing king marks the position as illegal, in favor of whoever captured it
    if pos.count(pos.turn(), King) == 0 {
        return Score::illegal();
    }

    let mut val = [0i16; Color::COUNT];

    for color in [White, Black].iter().copied() {
        for piece in [Pawn, Knight, Bishop, Rook, Queen].iter().copied() {
            for sq in pos.occupied_by_piece(color, piece) {
                let sq = match color {
                    White => sq as usize,
                    Black => sq as usize ^ 0o70,
                };
                val[color as usize] += PIECE_VAL[piece as usize]
                    + PIECE_SQUARE_VAL[piece as usize][sq];
            }
        }

        val[color as usize] += piece_features(pos, color);
    }

    let structure = match pawns.probe(pos.pawn_zobrist_key()) {
        Some(value) => value,
        None => {
            let value = pawn_structure(pos);
            pawns.store(pos.pawn_zobrist_key(), value);
            value
        },
    };
    val[White as usize] += structure;

    Score::from(val[!pos.turn() as usize] - val[pos.turn() as usize])
}
