//! The Transposition Table
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
use std::num::NonZeroU16;
use crate::chess::{Move, Position, Promotion, Square, Zobrist};
use super::eval::Score;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A representation of a move that fits in 16 bits.
///
/// `Option<HashMove>` is also guaranteed to be only 16 bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashMove(NonZeroU16);

impl HashMove {
    /// Packs a move into 16 bits. The null move has no packed form.
    pub fn new(mov: Move) -> Option<HashMove> {
        let prom = match mov.prom {
            None => 0,
            Some(prom) => prom as u16,
        };

        NonZeroU16::new(((mov.orig as u16) << 9) | ((mov.dest as u16) << 3) | prom).map(HashMove)
    }

    pub fn origin(self) -> Square {
        Square::try_from(((self.0.get() >> 9) & 0o77) as usize).expect("INFALLIBLE")
    }

    pub fn destination(self) -> Square {
        Square::try_from(((self.0.get() >> 3) & 0o77) as usize).expect("INFALLIBLE")
    }

    pub fn promotion(self) -> Option<Promotion> {
        match self.0.get() & 0o7 {
            0 => None,
            1 => Some(Promotion::ToKnight),
            2 => Some(Promotion::ToBishop),
            3 => Some(Promotion::ToRook),
            4 => Some(Promotion::ToQueen),
            _ => unreachable!(),
        }
    }

    /// Unpacks the move.
    pub fn mov(self) -> Move {
        match self.promotion() {
            Some(prom) => Move::promotion(self.origin(), self.destination(), prom),
            None => Move::new(self.origin(), self.destination()),
        }
    }

    /// Unpacks the move if it is legal in `pos`.
    ///
    /// A table entry can describe a different position which hashed to the same slot, so the
    /// move must never be trusted without this check.
    pub fn validate(self, pos: &Position) -> Option<Move> {
        let mov = self.mov();

        if pos.legal_moves().contains(&mov) {
            Some(mov)
        } else {
            None
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Indicates what kind of bound a transposition table entry places on the score.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bound {
    /// The slot is vacant and the score means nothing.
    Useless,
    /// The entry was seeded from the opening book. The move is trusted, the score is not.
    Book,
    /// The score is exact.
    Exact,
    /// The true score is no greater than the stored score.
    Upper,
    /// The true score is no less than the stored score.
    Lower,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An entry in the transposition table.
///
/// It is guaranteed to be exactly 16 bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashEntry {
    // 8 bytes
    zobrist: Zobrist,
    // 1 byte
    depth: u8,
    // 1 byte
    bound: Bound,
    // 2 bytes
    score: Score,
    // 2 bytes
    best_move: Option<HashMove>,
}

impl HashEntry {
    pub fn new(
        zobrist: Zobrist,
        depth: u8,
        bound: Bound, score: Score,
        best_move: Option<HashMove>)
    -> HashEntry {
        HashEntry {
            zobrist,
            depth,
            bound,
            score,
            best_move,
        }
    }

    /// Creates an opening book entry.
    ///
    /// Book entries carry the maximum depth, so nothing the search stores displaces them.
    /// The move is the point, the score is a placeholder.
    pub fn book(zobrist: Zobrist, mov: HashMove) -> HashEntry {
        HashEntry {
            zobrist,
            depth: u8::max_value(),
            bound: Bound::Book,
            score: Score::draw(),
            best_move: Some(mov),
        }
    }

    fn vacant() -> HashEntry {
        HashEntry {
            zobrist: Zobrist::default(),
            depth: 0,
            bound: Bound::Useless,
            score: Score::draw(),
            best_move: None,
        }
    }

    pub fn zobrist(&self) -> Zobrist {
        self.zobrist
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn best_move(&self) -> Option<HashMove> {
        self.best_move
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A transposition table with one entry per slot and depth-preferred replacement.
///
/// Mate scores are stored relative to the entry's node and corrected back to root-relative
/// when probed, so an entry keeps its meaning at whatever ply it is found from.
#[derive(Debug)]
pub struct HashTable(Vec<HashEntry>);

impl HashTable {
    /// Creates a table which uses approximately `megabytes` of memory. A size of zero leaves
    /// the table without capacity: every probe misses and every store is dropped.
    pub fn new(megabytes: usize) -> HashTable {
        let slots = megabytes * (1 << 20) / size_of::<HashEntry>();
        if slots == 0 {
            return HashTable(Vec::new());
        }

        Self::with_capacity((slots/2 + 1).next_power_of_two())
    }

    fn with_capacity(slots: usize) -> HashTable {
        HashTable(vec![HashEntry::vacant(); slots])
    }

    /// Looks up the entry for `zobrist`, with mate scores corrected for `ply`.
    pub fn get(&self, zobrist: Zobrist, ply: usize) -> Option<HashEntry> {
        if self.0.is_empty() {
            return None;
        }

        let index = u64::from(zobrist) as usize & (self.0.len() - 1);
        let mut entry = self.0[index];
        if entry.bound == Bound::Useless || entry.zobrist != zobrist {
            return None;
        }

        if entry.score >= Score::mates_in(1_000) {
            entry.score = entry.score - ply as i16;
        } else if entry.score <= Score::mated_in(1_000) {
            entry.score = entry.score + ply as i16;
        }

        Some(entry)
    }

    /// Stores `entry`, found at `ply`, unless a deeper entry occupies its slot.
    pub fn insert(&mut self, mut entry: HashEntry, ply: usize) {
        if self.0.is_empty() {
            return;
        }

        if entry.score >= Score::mates_in(1_000) {
            entry.score = entry.score + ply as i16;
        } else if entry.score <= Score::mated_in(1_000) {
            entry.score = entry.score - ply as i16;
        }

        let index = u64::from(entry.zobrist) as usize & (self.0.len() - 1);
        let resident = self.0[index];
        if resident.bound == Bound::Useless || entry.depth >= resident.depth {
            self.0[index] = entry;
        }
    }

    /// Vacates the slot for `zobrist`, if that is who holds it.
    pub fn evict(&mut self, zobrist: Zobrist) {
        if self.0.is_empty() {
            return;
        }

        let index = u64::from(zobrist) as usize & (self.0.len() - 1);
        if self.0[index].zobrist == zobrist {
            self.0[index] = HashEntry::vacant();
        }
    }

    /// Vacates every slot.
    pub fn clear(&mut self) {
        let len = self.0.len();
        self.0.clear();
        self.0.resize(len, HashEntry::vacant());
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_entry_is_sixteen_bytes() {
        assert_eq!(size_of::<HashEntry>(), 16);
        assert_eq!(size_of::<Option<HashMove>>(), 2);
    }

    #[test]
    fn moves_survive_packing() {
        for s in &["e2e4", "g1f3", "e1g1", "a7a8q", "g2h1n", "h7h8r", "b7b8b"] {
            let mov: Move = s.parse().expect("valid move");
            let packed = HashMove::new(mov).expect("not null");
            assert_eq!(packed.mov(), mov);
            assert_eq!(packed.origin(), mov.orig);
            assert_eq!(packed.destination(), mov.dest);
            assert_eq!(packed.promotion(), mov.prom);
        }

        assert_eq!(HashMove::new(Move::null()), None);
    }

    #[test]
    fn validation_rejects_moves_from_colliding_positions() {
        let pos = Position::new();
        let legal = HashMove::new("g1f3".parse().expect("valid move")).expect("not null");
        let foreign = HashMove::new("e4d5".parse().expect("valid move")).expect("not null");

        assert_eq!(legal.validate(&pos), Some("g1f3".parse().expect("valid move")));
        assert_eq!(foreign.validate(&pos), None);
    }

    #[test]
    fn a_single_slot_table_never_returns_a_false_positive() {
        // with one slot, every position lands on the same slot
        let mut table = HashTable::with_capacity(1);
        let a = Position::new();
        let b: Position = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse().expect("valid fen");
        assert_ne!(a.zobrist_key(), b.zobrist_key());

        let mov = HashMove::new("e2e4".parse().expect("valid move"));
        table.insert(HashEntry::new(a.zobrist_key(), 5, Bound::Exact, Score::from(33), mov), 0);

        assert_eq!(table.get(b.zobrist_key(), 0), None);
        let hit = table.get(a.zobrist_key(), 0).expect("stored entry");
        assert_eq!(hit.zobrist(), a.zobrist_key());
        assert_eq!(hit.score(), Score::from(33));
        assert_eq!(hit.bound(), Bound::Exact);
    }

    #[test]
    fn replacement_prefers_the_deeper_entry() {
        let mut table = HashTable::with_capacity(1);
        let a = Position::new();
        let b: Position = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().expect("valid fen");

        table.insert(HashEntry::new(a.zobrist_key(), 7, Bound::Exact, Score::draw(), None), 0);
        // a shallower entry does not displace it, even for a new hash
        table.insert(HashEntry::new(b.zobrist_key(), 3, Bound::Exact, Score::draw(), None), 0);
        assert!(table.get(a.zobrist_key(), 0).is_some());
        assert_eq!(table.get(b.zobrist_key(), 0), None);

        // a deeper one does
        table.insert(HashEntry::new(b.zobrist_key(), 9, Bound::Lower, Score::draw(), None), 0);
        assert_eq!(table.get(a.zobrist_key(), 0), None);
        assert!(table.get(b.zobrist_key(), 0).is_some());
    }

    #[test]
    fn mate_scores_are_corrected_for_the_probing_ply() {
        let mut table = HashTable::with_capacity(2);
        let pos = Position::new();

        // mate found at total ply 7, stored from a node at ply 3
        table.insert(
            HashEntry::new(pos.zobrist_key(), 4, Bound::Exact, Score::mates_in(7), None), 3);

        // probing the same position at ply 5 sees the mate two plies further from the root
        let entry = table.get(pos.zobrist_key(), 5).expect("stored entry");
        assert_eq!(entry.score(), Score::mates_in(9));

        let entry = table.get(pos.zobrist_key(), 3).expect("stored entry");
        assert_eq!(entry.score(), Score::mates_in(7));
    }

    #[test]
    fn book_entries_outlast_every_search_store() {
        let mut table = HashTable::with_capacity(1);
        let pos = Position::new();
        let mov = HashMove::new("d2d4".parse().expect("valid move")).expect("not null");

        table.insert(HashEntry::book(pos.zobrist_key(), mov), 0);
        table.insert(HashEntry::new(pos.zobrist_key(), 64, Bound::Exact, Score::draw(), None), 0);

        let entry = table.get(pos.zobrist_key(), 0).expect("stored entry");
        assert_eq!(entry.bound(), Bound::Book);
        assert_eq!(entry.best_move(), Some(mov));

        // eviction is the one way to get rid of it
        table.evict(pos.zobrist_key());
        assert_eq!(table.get(pos.zobrist_key(), 0), None);
    }

    #[test]
    fn a_zero_size_table_degrades_to_a_cache_miss() {
        let mut table = HashTable::new(0);
        let pos = Position::new();

        table.insert(HashEntry::new(pos.zobrist_key(), 5, Bound::Exact, Score::draw(), None), 0);
        assert_eq!(table.get(pos.zobrist_key(), 0), None);
    }

    #[test]
    fn clearing_vacates_every_slot() {
        let mut table = HashTable::new(1);
        let pos = Position::new();

        table.insert(HashEntry::new(pos.zobrist_key(), 5, Bound::Exact, Score::draw(), None), 0);
        assert!(table.get(pos.zobrist_key(), 0).is_some());
        table.clear();
        assert_eq!(table.get(pos.zobrist_key(), 0), None);
    }
}
