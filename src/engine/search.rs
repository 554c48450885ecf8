//! The search itself.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use log::debug;
use crate::chess::{Color, Move, Piece, Position, Square, Status, Zobrist};
use super::Report;
use super::eval::{evaluate, PawnCache, Score};
use super::hash::{Bound, HashEntry, HashMove, HashTable};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A record of which quiet moves have caused cutoffs, used to order moves.
///
/// Counts are indexed by the moving color and the origin and destination squares, and weighted
/// toward cutoffs near the root, where the subtree refuted was large.
pub struct HistoryTable(Box<[[[u64; Square::COUNT]; Square::COUNT]; Color::COUNT]>);

impl HistoryTable {
    pub fn new() -> HistoryTable {
        HistoryTable(Box::new([[[0; Square::COUNT]; Square::COUNT]; Color::COUNT]))
    }

    pub fn get(&self, color: Color, mov: Move) -> u64 {
        self.0[color as usize][mov.orig as usize][mov.dest as usize]
    }

    pub fn bump(&mut self, color: Color, mov: Move, depth: usize) {
        let count = &mut self.0[color as usize][mov.orig as usize][mov.dest as usize];
        *count = count.saturating_add(1u64 << depth.min(48));
    }

    pub fn clear(&mut self) {
        *self.0 = [[[0; Square::COUNT]; Square::COUNT]; Color::COUNT];
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The search machinery and the caches which persist from one search to the next.
pub struct Searcher {
    table: HashTable,
    history: HistoryTable,
    pawns: PawnCache,
    contempt: i16,
    max_depth: usize,
    engine_color: Color,
    nodes: u64,
    cancel: Arc<AtomicBool>,
    null_move: bool,
}

impl Searcher {
    pub fn new(
        hash_megabytes: usize,
        pawn_megabytes: usize,
        contempt: i16,
        max_depth: usize,
        cancel: Arc<AtomicBool>)
    -> Searcher {
        Searcher {
            table: HashTable::new(hash_megabytes),
            history: HistoryTable::new(),
            pawns: PawnCache::new(pawn_megabytes),
            contempt,
            // depths are stored in a byte
            max_depth: max_depth.min(255),
            engine_color: Color::White,
            nodes: 0,
            cancel,
            null_move: true,
        }
    }

    /// Replaces the transposition table with one of the given size. Book entries are lost.
    pub fn set_hash_size(&mut self, megabytes: usize) {
        self.table = HashTable::new(megabytes);
    }

    /// Limits how deep the iterative deepening goes.
    pub fn set_depth(&mut self, max_depth: usize) {
        // depths are stored in a byte
        self.max_depth = max_depth.min(255);
    }

    /// Forgets the cutoff history from the previous game.
    ///
    /// The transposition and pawn caches are keyed by position and stay valid across games,
    /// so they are kept.
    pub fn new_game(&mut self) {
        self.history.clear();
    }

    /// Plants opening book moves in the transposition table.
    pub fn seed_book(&mut self, entries: &[(Zobrist, Move)]) {
        for &(zobrist, mov) in entries {
            if let Some(mov) = HashMove::new(mov) {
                self.table.insert(HashEntry::book(zobrist, mov), 0);
            }
        }
    }

    /// Searches `pos` by iterative deepening and returns the best move found, paired with the
    /// expected reply if the search found one.
    ///
    /// Each completed iteration is handed to `post`. The search ends early if the position is
    /// in the opening book, a forced mate is found, a single legal reply makes deeper searching
    /// pointless, the soft deadline passes between iterations, or the cancellation flag is
    /// raised. A cancelled iteration is discarded and the move from the last completed one is
    /// returned. `None` means the search has nothing to suggest: either there are no legal
    /// moves, or it was cancelled before finishing even one iteration.
    pub fn iterate<F>(
        &mut self,
        pos: &mut Position,
        soft_deadline: Option<Instant>,
        mut post: F)
    -> Option<(Move, Option<Move>)> where F: FnMut(Report) {
        self.nodes = 0;
        self.engine_color = pos.turn();
        let start = Instant::now();

        let legal = pos.legal_moves();
        if legal.is_empty() {
            return None;
        }

        // the book answers before any searching
        if let Some(entry) = self.table.get(pos.zobrist_key(), 0) {
            if entry.bound() == Bound::Book {
                match entry.best_move().and_then(|mov| mov.validate(pos)) {
                    Some(mov) => {
                        debug!("playing {} from the book", mov);
                        return Some((mov, None));
                    }
                    // a book move which is not legal here belongs to a position which
                    // collided with this one, and its slot can never be overwritten
                    None => self.table.evict(pos.zobrist_key()),
                }
            }
        }

        // with a single reply there is nothing to decide beyond the expected answer to it
        let max_depth = if legal.len() == 1 {
            self.max_depth.min(2)
        } else {
            self.max_depth
        };

        let mut result = None;
        let mut guess = Score::draw();

        for depth in 1..=max_depth {
            let mut val = match self.mtd(pos, depth, guess) {
                Some(val) => val,
                None => break,
            };
            guess = val;

            let mut pv = self.principal_variation(pos, depth);
            if pv.is_empty() {
                // the root entry was displaced or carries no move, settle it directly
                val = match self.search(pos, 0, depth, -Score::infinity(), Score::infinity()) {
                    Some(val) => val,
                    None => break,
                };
                guess = val;
                pv = self.principal_variation(pos, depth);
            }

            let mov = match pv.first() {
                Some(&mov) => mov,
                None => break,
            };
            result = Some((mov, pv.get(1).copied()));

            debug!("depth {}: {} after {:?}, {} nodes",
                depth, i16::from(val), start.elapsed(), self.nodes);
            post(Report::Thinking {
                depth,
                score: val,
                time: start.elapsed(),
                nodes: self.nodes,
                pv,
            });

            // a forced mate cannot be improved on
            if val >= Score::mates_in(1_000) || val <= Score::mated_in(1_000) {
                break;
            }
            if let Some(deadline) = soft_deadline {
                if Instant::now() >= deadline {
                    break;
                }
            }
        }

        result
    }

    /// Reads the expected line of play out of the transposition table.
    fn principal_variation(&mut self, pos: &mut Position, depth: usize) -> Vec<Move> {
        let mut pv = Vec::new();

        // the table can describe a cycle, so the line is capped at the search depth
        while pv.len() < depth {
            let entry = match self.table.get(pos.zobrist_key(), pv.len()) {
                Some(entry) => entry,
                None => break,
            };
            let mov = match entry.best_move().and_then(|mov| mov.validate(pos)) {
                Some(mov) => mov,
                None => break,
            };

            pos.make(mov);
            pv.push(mov);
        }

        for _ in 0..pv.len() {
            pos.unmake();
        }

        pv
    }

    /// Finds the score of `pos` at `depth` with a sequence of zero-window searches, starting
    /// from `guess`.
    fn mtd(&mut self, pos: &mut Position, depth: usize, mut guess: Score) -> Option<Score> {
        let mut lower = -Score::infinity();
        let mut upper = Score::infinity();

        for _ in 0..32 {
            let beta = if guess == lower { guess + 1 } else { guess };
            let val = self.search(pos, 0, depth, beta - 1, beta)?;

            if val < beta {
                upper = val;
            } else {
                lower = val;
            }
            if lower >= upper {
                return Some(val);
            }
            guess = val;
        }

        // the zero-window passes failed to converge, settle it with a full window
        self.search(pos, 0, depth, -Score::infinity(), Score::infinity())
    }

    /// A fail-soft alpha-beta search, which returns `None` if the search was cancelled.
    ///
    /// The score is from the perspective of the player on move. A position where that player
    /// could capture the enemy king outright scores as illegal, which tells the caller the
    /// move it just made was no move at all.
    fn search(
        &mut self,
        pos: &mut Position,
        ply: usize,
        depth: usize,
        mut alpha: Score,
        mut beta: Score)
    -> Option<Score> {
        self.nodes += 1;
        if self.nodes % 1000 == 0 && self.cancel.load(Ordering::Relaxed) {
            return None;
        }

        if pos.king_capturable() {
            return Some(Score::illegal());
        }
        if pos.status(false) != Status::InProgress {
            return Some(self.draw_score(pos.turn()));
        }
        if depth == 0 {
            return Some(-evaluate(pos, &mut self.pawns));
        }

        let zobrist = pos.zobrist_key();
        let mut tt_move = None;
        if let Some(entry) = self.table.get(zobrist, ply) {
            tt_move = entry.best_move();

            if usize::from(entry.depth()) >= depth {
                match entry.bound() {
                    Bound::Exact => return Some(entry.score()),
                    Bound::Lower => alpha = alpha.max(entry.score()),
                    Bound::Upper => beta = beta.min(entry.score()),
                    Bound::Book | Bound::Useless => {}
                }
                if alpha >= beta {
                    return Some(entry.score());
                }
            }
        }

        // giving the opponent a free move and still clearing beta proves the position is
        // good enough to cut, as long as zugzwang is unlikely
        if self.null_move && depth >= 3 && !pos.in_check() && self.has_pieces(pos) {
            pos.make_null();
            let val = self.search(pos, ply + 1, depth - 3, -beta, -beta + 1);
            pos.unmake();

            let val = -val?;
            if val >= beta {
                let entry = HashEntry::new(zobrist, depth as u8, Bound::Lower, val, None);
                self.table.insert(entry, ply);
                return Some(val);
            }
        }

        let mut moves = Vec::new();
        pos.generate(&mut moves, false);
        self.order_moves(pos.turn(), &mut moves, tt_move);

        let orig_alpha = alpha;
        let mut best = -Score::infinity();
        let mut best_move = None;
        let mut legal = 0;

        for &mov in &moves {
            pos.make(mov);
            let val = self.search(pos, ply + 1, depth - 1, -beta, -alpha);
            pos.unmake();

            let val = -val?;
            if val <= -Score::illegal() {
                continue;
            }
            legal += 1;

            if val > best {
                best = val;
                best_move = HashMove::new(mov);
                alpha = alpha.max(val);
                if val >= beta {
                    break;
                }
            }
        }

        if legal == 0 {
            best = if pos.in_check() {
                Score::mated_in(ply)
            } else {
                self.draw_score(pos.turn())
            };
            best_move = None;
        }

        let bound = if legal == 0 {
            Bound::Exact
        } else if best >= beta {
            Bound::Lower
        } else if best > orig_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.table.insert(HashEntry::new(zobrist, depth as u8, bound, best, best_move), ply);

        if bound != Bound::Upper {
            if let Some(mov) = best_move {
                self.history.bump(pos.turn(), mov.mov(), depth);
            }
        }

        Some(best)
    }

    /// Puts the hash move first and sorts the rest by cutoff history.
    fn order_moves(&self, turn: Color, moves: &mut [Move], tt_move: Option<HashMove>) {
        let mut sorted = 0;
        if let Some(tt_move) = tt_move {
            let mov = tt_move.mov();
            if let Some(i) = moves.iter().position(|&m| m == mov) {
                moves.swap(0, i);
                sorted = 1;
            }
        }

        moves[sorted..].sort_by_key(|&mov| std::cmp::Reverse(self.history.get(turn, mov)));
    }

    /// The score of a draw for the player on move.
    ///
    /// Contempt makes the engine value a draw below the even score, so it plays on in level
    /// positions, and makes the same draw look better than even to its opponent.
    fn draw_score(&self, turn: Color) -> Score {
        if turn == self.engine_color {
            Score::from(-self.contempt)
        } else {
            Score::from(self.contempt)
        }
    }

    /// Returns `true` if the player on move has any pieces beyond pawns and the king.
    fn has_pieces(&self, pos: &Position) -> bool {
        let us = pos.turn();

        pos.occupied_by(us)
            != pos.occupied_by_piece(us, Piece::Pawn) | pos.occupied_by_piece(us, Piece::King)
    }
}
