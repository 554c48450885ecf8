//! Module to implement a chess game
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::time::Duration;
use super::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Time controls for a game
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimeControl {
    /// Time is not limited. Typically the engine should continue searching until told to stop or
    /// a maximum depth has been reached.
    Infinite,
    /// Each player has a fixed time to play the entire game.
    SuddenDeath(Duration),
    /// Each player begins with `base` time, which is incremented by `inc` each time the player
    /// makes a move.
    Incremental{
        /// The amount of time each player has at the beginning of the game.
        base: Duration,
        /// The amount of time added to each player's time after each move.
        inc: Duration,
    },
    /// Each player begins with `base` time, and each session of `mps` moves, `base` gets added
    /// to each player's remaining time.
    Session{
        /// The amount of time each player has at the beginning of the game, and the amount added
        /// on after each session.
        base: Duration,
        /// The number of moves per session
        mps: usize,
    },
    /// Each player must make each move in the specified number of seconds.
    Exact(Duration),
}

impl Default for TimeControl {
    fn default() -> Self {
        TimeControl::Infinite
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Chess clock for a game
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Clock {
    remaining: [ Duration; Color::COUNT ],
    tc: TimeControl,
}

impl Clock {
    /// Creates a new clock with the given time control
    pub fn new(tc: TimeControl) -> Self {
        use TimeControl::*;

        let remaining = match tc {
            Infinite => Duration::default(),
            SuddenDeath(base) => base,
            Incremental{ base, .. } => base,
            Session{ base, .. } => base,
            Exact(base) => base,
        };

        Clock {
            remaining: [ remaining, remaining ],
            tc,
        }
    }

    /// Returns the time control the clock is running under.
    pub fn time_control(&self) -> TimeControl {
        self.tc
    }

    /// Returns the time remaining for `color`.
    pub fn remaining(&self, color: Color) -> Duration {
        self.remaining[color as usize]
    }

    /// Update the clock based on the `elapsed` time and the time control being used.
    ///
    /// `moves` is the number of completed moves for `color`, which determines when a new
    /// session starts. Returns `false` if `color` ran out of time.
    pub fn update(&mut self, color: Color, elapsed: Duration, moves: usize) -> bool {
        if let Some(remaining) = self.remaining[color as usize].checked_sub(elapsed) {
            self.remaining[color as usize] = remaining;
        } else {
            self.remaining[color as usize] = Duration::from_secs(0);
            return false; // no time remaining
        }

        match self.tc {
            TimeControl::Incremental{ inc, .. } => self.remaining[color as usize] += inc,
            TimeControl::Session{ base, mps } => {
                if moves % mps == 0 {
                    self.remaining[color as usize] += base;
                }
            },
            _ => { }
        }

        true
    }

    /// Sets the remaining time for `color` to `time`.
    pub fn set(&mut self, color: Color, time: Duration) {
        self.remaining[color as usize] = time;
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The result of a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameResult {
    /// White has won, such as by checkmate or because black forfeited.
    WhiteWins,
    /// The game has ended in a draw, such as by stalemate, 3-fold repetition, or other means.
    Draw,
    /// Black has won, such as by checkmate or because white forfeited.
    BlackWins,
}

impl fmt::Display for GameResult {
    /// The result is written the way game notation records it, such as `1-0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::Draw => "1/2-1/2",
            GameResult::BlackWins => "0-1",
        }.fmt(f)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A chess game
///
/// Tracks the position, the moves played to reach it, the clock, and the result once known.
/// The position keeps its own history, so draws by repetition and the fifty-move rule are
/// visible through [`Game::status`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Game {
    pos: Position,
    moves: Vec<Move>,
    clock: Clock,
    result: Option<GameResult>,
}

impl Game {
    /// Creates a new game from the standard starting position
    pub fn new() -> Self {
        Game::default()
    }

    /// Creates a new game using `pos` as the starting position
    pub fn starting_at(pos: Position) -> Self {
        Game {
            pos,
            ..Default::default()
        }
    }

    /// Sets the time control for the game. Default is `Infinite`.
    pub fn set_time_control(&mut self, tc: TimeControl) -> &mut Self {
        self.clock = Clock::new(tc);

        self
    }

    /// Returns the current position
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Returns the moves played so far
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Returns the game's clock
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Returns a mutable reference to the game's clock
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Returns the status of the current position
    pub fn status(&self) -> Status {
        self.pos.status(true)
    }

    /// Returns the result of the game, if it has one
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    /// Records the result of the game
    pub fn set_result(&mut self, result: GameResult) {
        self.result = Some(result);
    }

    /// Make the given move
    ///
    /// # Errors
    ///
    /// Returns an error if `mov` is not legal in the current position.
    pub fn make_move(&mut self, mov: Move) -> Result<&mut Self> {
        if !self.pos.legal_moves().contains(&mov) {
            return Err(Error::IllegalMove);
        }
        self.pos.make(mov);
        self.moves.push(mov);

        Ok(self)
    }

    /// Make the given move and (if successful) update the clock based on `elapsed` time and the
    /// game's time control.
    pub fn make_move_timed(&mut self, mov: Move, elapsed: Duration) -> Result<&mut Self> {
        let color = self.pos.turn();

        self.make_move(mov)?;
        self.clock.update(color, elapsed, (self.moves.len() + 1)/2);

        Ok(self)
    }

    /// Make the move written in standard algebraic or coordinate notation
    pub fn make_move_from_str(&mut self, mv: &str) -> Result<&mut Self> {
        let mov = self.pos.move_from_san(mv)?;

        self.make_move(mov)
    }

    /// Make the move written in standard algebraic or coordinate notation and (if successful)
    /// update the clock based on `elapsed` time and the game's time control.
    pub fn make_move_from_str_timed(&mut self, mv: &str, elapsed: Duration) -> Result<&mut Self> {
        let mov = self.pos.move_from_san(mv)?;

        self.make_move_timed(mov, elapsed)
    }

    /// Undoes the last move. Returns false if there are no moves to undo.
    pub fn undo(&mut self) -> bool {
        if self.moves.pop().is_some() {
            self.pos.unmake();

            true
        } else {
            false
        }
    }
}
