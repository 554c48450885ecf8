//! Implements the [Chess Engine Communication Protocol](http://hgm.nubati.net/CECP.html), commonly
//! known as xboard.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use std::num::{ParseIntError, ParseFloatError};
use log::{debug, info, error};
use lazy_static::lazy_static;
use regex::{RegexSet, Regex};
use super::{Event, io};
use crate::chess::{Color, Move, Status};
use crate::chess::game::{Clock, Game, GameResult, TimeControl};
use crate::engine::{Engine, Report};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Current state of the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    Idle,
    Thinking,
    Pondering(Move),
    Analyzing,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Implementation of the xboard protocol.
///
/// The protocol runs as an event loop over a single channel, fed with client input by
/// [`io::Client`] and with search reports by the engine, so the engine stays responsive
/// to the client while it searches.
#[derive(Debug)]
pub struct Xboard {
    engine: Engine,
    events: Receiver<Event>,

    game: Game,

    state: State,
    color: Option<Color>,
    can_ponder: bool,
    started_thinking: Instant,

    ponder_hits: usize,
    ponder_total: usize,
}

impl Xboard {
    /// Creates the xboard interface around a running engine and the event channel its
    /// reports and the client's input arrive on.
    pub fn new(engine: Engine, events: Receiver<Event>) -> Self {
        // thinking output is on until the client says otherwise
        engine.set_post(true);

        Xboard {
            engine,
            events,
            game: Game::new(),
            state: State::Idle,
            color: Some(Color::Black),
            can_ponder: true,
            started_thinking: Instant::now(),
            ponder_hits: 0,
            ponder_total: 0,
        }
    }

    /// Runs the protocol until the client disconnects or tells the engine to quit.
    pub fn run(&mut self) {
        loop {
            let event = match self.events.recv() {
                Ok(event) => event,
                Err(_) => Event::Eof,
            };

            match event {
                Event::Line(line) => {
                    if !self.handle_line(&line) {
                        return;
                    }
                },
                Event::Engine(report) => self.handle_report(report),
                Event::Eof => {
                    info!("client input ended");
                    return;
                },
            }
        }
    }

    /// Carries out one command from the client. Returns false when the engine should exit.
    fn handle_line(&mut self, line: &str) -> bool {
        use Command::*;

        let cmd = match line.parse() {
            Ok(cmd) => cmd,
            Err(_) => {
                Response::ErrorMessage(line.to_string(),
                    "unknown or incorrectly formatted command".to_string()).send();
                return true;
            },
        };

        match cmd {
            Xboard => { },
            Protover(_) => {
                use Feature::*;
                Response::Feature(vec![Done(false)]).send();
                Response::Feature(vec![
                    Sigint(false),
                    Sigterm(false),
                    Ping(true),
                    SetBoard(true),
                    MyName("windmill".to_string()),
                    Memory(true),
                    Debug(true),
                    Nps(false),
                    Analyze(true),
                ]).send();
                Response::Feature(vec![Done(true)]).send();
            },
            Accepted(_) => { },
            Rejected(name) => {
                debug!("client rejected feature {}", name);
            },
            Ping(n) => {
                Response::Pong(n).send();
            },
            Quit => {
                return false;
            },
            New => {
                self.abort();
                self.engine.new_game();
                self.game = Game::new();
                self.color = Some(Color::Black);
            },
            Force => {
                self.abort();
                self.color = None;
            },
            Go => {
                self.abort();
                self.color = Some(self.game.position().turn());
                self.think();
            },
            UserMove(move_str) => {
                self.user_move(&move_str);
            },
            SetBoard(fen) => {
                self.set_board(line, &fen);
            },
            Draw => {
                // ignoring the offer declines it
            },
            GameResult{ .. } => {
                self.abort();
                self.color = None;
            },
            Undo => {
                self.undo(1);
            },
            Remove => {
                self.undo(2);
            },
            MoveNow => {
                if self.state == State::Thinking {
                    self.engine.stop();
                }
            },
            Time(time) => {
                let color = self.color.unwrap_or_else(|| self.game.position().turn());
                self.game.clock_mut().set(color, time);
            },
            OppTime(time) => {
                let color = self.color.unwrap_or_else(|| self.game.position().turn());
                self.game.clock_mut().set(!color, time);
            },
            Level{ mps, base, inc } => {
                match (mps, inc.as_millis()) {
                    (0, 0) => { self.game.set_time_control(TimeControl::SuddenDeath(base)); },
                    (0, _) => { self.game.set_time_control(TimeControl::Incremental{ base, inc }); },
                    (_, 0) => { self.game.set_time_control(TimeControl::Session{ base, mps }); },
                    _ => {
                        Response::ErrorMessage(line.to_string(),
                            "invalid time control".to_string()).send();
                    },
                }
            },
            SetTime(time) => {
                self.game.set_time_control(TimeControl::Exact(time));
            },
            SetDepth(depth) => {
                self.engine.set_depth(depth);
            },
            Memory(size) => {
                self.engine.set_hash_size(size);
            },
            Post => {
                self.engine.set_post(true);
            },
            NoPost => {
                self.engine.set_post(false);
            },
            Ponder => {
                self.can_ponder = true;
            },
            NoPonder => {
                self.can_ponder = false;
                if let State::Pondering(_) = self.state {
                    self.abort();
                }
            },
            Hint => {
                if let State::Pondering(mv) = self.state {
                    Response::Hint(mv.to_string()).send();
                }
            },
            Analyze => {
                self.abort();
                self.analyze();
            },
            ExitAnalyze => {
                if self.state == State::Analyzing {
                    self.abort();
                }
            },
        }

        true
    }

    /// Carries out one report from the engine.
    fn handle_report(&mut self, report: Report) {
        match report {
            Report::BestMove{ mov, ponder } => self.best_move(mov, ponder),
            Report::Thinking{ depth, score, time, nodes, pv } => {
                if self.state == State::Idle {
                    return;
                }

                let moves: Vec<String> = pv.iter().map(Move::to_string).collect();
                let pv = if let State::Pondering(mv) = self.state {
                    format!("({}) {}", mv, moves.join(" "))
                } else {
                    moves.join(" ")
                };

                Response::ThinkingOutput{
                    depth,
                    score: score.into(),
                    time,
                    nodes,
                    pv,
                }.send();
            },
        }
    }

    /// Plays the engine's move, and starts pondering the reply it expects.
    fn best_move(&mut self, mov: Move, ponder: Option<Move>) {
        if self.state != State::Thinking {
            // a cancelled search can deliver its answer after the command that cancelled it
            debug!("discarding best move {}", mov);
            return;
        }
        self.state = State::Idle;

        let elapsed = self.started_thinking.elapsed();
        if let Err(error) = self.game.make_move_timed(mov, elapsed) {
            error!("unplayable best move {}: {}", mov, error);
            return;
        }
        Response::Move(mov.to_string()).send();

        let status = self.game.status();
        if status != Status::InProgress {
            self.announce(status);
        } else if self.can_ponder {
            if let Some(ponder) = ponder {
                let mut pos = self.game.position().clone();
                pos.make(ponder);
                self.state = State::Pondering(ponder);
                self.engine.ponder(pos);
            }
        }
    }

    /// Plays a move sent by the client, then sets the engine going again if it is this
    /// engine's turn.
    fn user_move(&mut self, move_str: &str) {
        let state = self.state;

        if let Err(error) = self.game.make_move_from_str(move_str) {
            debug!("illegal move {} from {}", move_str, self.game.position());
            Response::IllegalMove(move_str.to_string(), Some(error.to_string())).send();
            return;
        }

        match state {
            State::Pondering(expected) => {
                let played = self.game.moves().last().copied().expect("INFALLIBLE");
                self.ponder_total += 1;

                if played == expected {
                    self.ponder_hits += 1;
                    info!("ponder hit: {}/{} = {}%", self.ponder_hits, self.ponder_total,
                        100*self.ponder_hits/self.ponder_total);
                } else {
                    info!("ponder miss: {}/{} = {}%", self.ponder_hits, self.ponder_total,
                        100*self.ponder_hits/self.ponder_total);
                }

                // either way the next search starts fresh, keeping whatever the ponder
                // search left in the table
                self.abort();
                self.after_user_move();
            },
            State::Analyzing => {
                self.analyze();
            },
            State::Thinking => {
                self.abort();
                self.after_user_move();
            },
            State::Idle => {
                self.after_user_move();
            },
        }
    }

    /// Announces the result if the client's move ended the game, and otherwise starts
    /// thinking if it is this engine's turn.
    fn after_user_move(&mut self) {
        let status = self.game.status();

        if status != Status::InProgress {
            self.announce(status);
        } else if self.color == Some(self.game.position().turn()) {
            self.think();
        }
    }

    /// Records the result of a finished game and announces it to the client.
    fn announce(&mut self, status: Status) {
        use GameResult::*;

        let (result, reason) = match status {
            Status::Checkmate => match self.game.position().turn() {
                Color::White => (BlackWins, "Black mates"),
                Color::Black => (WhiteWins, "White mates"),
            },
            Status::Stalemate => (Draw, "Stalemate"),
            Status::FiftyMoves => (Draw, "Draw by fifty move rule"),
            Status::Repetition => (Draw, "Draw by repetition"),
            Status::InsufficientMaterial => (Draw, "Insufficient material"),
            Status::InProgress => return,
        };

        self.game.set_result(result.clone());
        Response::GameResult(result.to_string(), Some(reason.to_string())).send();
    }

    /// Starts the engine searching the current position under the game's time control.
    fn think(&mut self) {
        let status = self.game.status();
        if status != Status::InProgress {
            self.announce(status);
            return;
        }

        let color = self.game.position().turn();
        let (budget, hard) = time_budget(self.game.clock(), color);
        let deadline = hard.map(|hard| Instant::now() + hard);

        self.started_thinking = Instant::now();
        self.state = State::Thinking;
        self.engine.think(self.game.position().clone(), budget, deadline);
    }

    /// Starts the engine analyzing the current position.
    fn analyze(&mut self) {
        self.state = State::Analyzing;
        self.engine.analyze(self.game.position().clone());
    }

    /// Stops any running search without playing its answer.
    fn abort(&mut self) {
        self.engine.abort();
        self.state = State::Idle;
    }

    /// Takes back `count` half-moves, restarting the analysis if there is one.
    fn undo(&mut self, count: usize) {
        let analyzing = self.state == State::Analyzing;
        self.abort();

        for _ in 0..count {
            self.game.undo();
        }

        if analyzing {
            self.analyze();
        }
    }

    /// Resets the board to the given position, keeping the time control.
    fn set_board(&mut self, line: &str, fen: &str) {
        let analyzing = self.state == State::Analyzing;
        self.abort();

        match fen.parse() {
            Ok(pos) => {
                let tc = self.game.clock().time_control();
                self.game = Game::starting_at(pos);
                self.game.set_time_control(tc);
            },
            Err(err) => Response::ErrorMessage(line.to_string(), err.to_string()).send(),
        }

        if analyzing {
            self.analyze();
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Splits the remaining clock time into a soft budget for the next search and a hard
/// limit after which the search has to end.
///
/// The soft budget spreads the remaining time over the moves ahead. The hard limit leaves
/// a search which needs one more iteration room to finish it, without letting the clock
/// run out.
fn time_budget(clock: &Clock, color: Color) -> (Option<Duration>, Option<Duration>) {
    use TimeControl::*;

    let remaining = clock.remaining(color);

    let soft = match clock.time_control() {
        Infinite => return (None, None),
        Exact(time) => return (Some(time), Some(time)),
        Incremental{ inc, .. } => {
            if remaining > inc*6 { remaining/30 + inc } else { remaining/5 }
        },
        SuddenDeath(_) | Session{ .. } => remaining/30,
    };

    (Some(soft), Some(soft*2))
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Commands which can be sent to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Tells the engine to use the xboard protocol.
    ///
    /// ```text
    /// xboard
    /// ```
    Xboard, // initialization

    /// Tells the engine which version of the xboard protocol to use.
    ///
    /// ```text
    /// protover <version>
    /// ```
    ///
    /// `version` is the maximum version number supported by the client.
    Protover(usize), // initialization

    /// Tells the engine that the requested feature is supported.
    ///
    /// ```text
    /// accepted <name>
    /// ```
    ///
    /// `name` is the name of the requested feature.
    Accepted(String), // initialization

    /// Tells the engine that the requested feature is not supported.
    ///
    /// ```text
    /// rejected <name>
    /// ```
    ///
    /// `name` is the name of the requested feature.
    Rejected(String), // initialization

    /// Request that the engine send a "pong" response when it is ready for more input.
    ///
    /// ```text
    /// ping <n>
    /// ```
    ///
    /// `n` is a unique number provided by the client.
    Ping(usize), // any

    /// Tells the engine to exit.
    ///
    /// ```text
    /// quit
    /// ```
    Quit, // any, abort search

    /// Begin a new game.
    ///
    /// ```text
    /// new
    /// ```
    New, // any, abort search

    /// Set the engine to receive moves but play neither side.
    ///
    /// ```text
    /// force
    /// ```
    Force, // any, abort search

    /// Sets the engine to begin playing the side currently on move.
    ///
    /// ```text
    /// go
    /// ```
    Go, // idle, change to thinking

    /// Send a move to the engine.
    ///
    /// ```text
    /// <move>
    /// usermove <move>
    /// ```
    ///
    /// The second form is an alternate form which should only be used if requested by the engine.
    ///
    /// `move` is the move to be made.
    UserMove(String), // idle/pondering/analyzing

    /// Set the board to the given position.
    ///
    /// ```text
    /// setboard <fen>
    /// ```
    ///
    /// `fen` is the position in Forsyth-Edwards Notation.
    SetBoard(String), // any, abort search

    /// Requests a draw.
    ///
    /// ```text
    /// draw
    /// ```
    Draw, // any

    /// Tells the engine that the game has ended with the given result.
    ///
    /// ```text
    /// result <result> [{<reason>}]
    /// ```
    ///
    GameResult{ // any
        /// `result` can be one of the following:
        ///  - 1-0          White wins
        ///  - 0-1          Black wins
        ///  - 1/2-1/2      Draw
        result: String,
        /// An optional plain-text reason for the result (eg. checkmate). It must be
        /// enclosed in curly braces.
        reason: Option<String>
    },

    /// Take back the last move by one side.
    ///
    /// ```text
    /// undo
    /// ```
    Undo, // any, abort search

    /// Take back the last move by each side.
    ///
    /// ```text
    /// remove
    /// ```
    Remove, // any, abort search

    /// Tells the engine to move immediately.
    ///
    /// ```text
    /// ?
    /// ```
    MoveNow, // thinking

    /// Informs the engine of how much time it has remaining.
    ///
    /// ```text
    /// time <remaining>
    /// ```
    ///
    /// `remaining` is the engine's time remaining expressed as an integral number centi-seconds.
    Time(Duration), // idle/pondering

    /// Informs the engine how much time its opponent has remaining.
    ///
    /// ```text
    /// otim <remaining>
    /// ```
    ///
    /// `remaining` is the opponent's time remaining expressed as an integral number centi-seconds.
    OppTime(Duration), // idle/pondering

    /// Sets the initial time controls.
    ///
    /// This command cancels the effect of `Command::SetTime`.
    ///
    /// ```text
    /// level <mps> <base> <inc>
    /// ```
    Level{ // idle
        /// The number of moves per session. It is zero for incremental and sudden death time
        /// controls.
        mps: usize,
        /// The initial amount of time for the game. It can be expressed as a whole number of
        /// minutes or as a number of minutes and seconds in the form `M:SS`.
        base: Duration,
        /// The amount of time added to the player's remaining time after each move. It
        /// is expressed as a number of seconds, which can be a whole number or floating point.
        inc: Duration
    },

    /// Sets the exact amount of time that should be used for each turn.
    ///
    /// This command cancels the effect of `Command::Level`.
    ///
    /// ```text
    /// st <time>
    /// ```
    ///
    /// `time` is the amount of time that should be used for each move expressed in seconds, which
    /// can be a whole number or floating point.
    SetTime(Duration), // idle

    /// Limits the search depth to the depth given.
    ///
    /// ```text
    /// sd <depth>
    /// ```
    ///
    /// `depth` is the maximum depth that the engine should search.
    SetDepth(usize), // idle

    /// Tells the engine how much memory it is allowed to use.
    ///
    /// ```text
    /// memory <n>
    /// ```
    ///
    /// `n` is the maximum amount of memory that should be used by the engine in megabytes.
    Memory(usize), // idle

    /// Turns on thinking output.
    ///
    /// ```text
    /// post
    /// ```
    Post, // any

    /// Turns off thinking output.
    ///
    /// ```text
    /// nopost
    /// ```
    NoPost, // any

    /// Turns on pondering (thinking on the opponent's turn).
    ///
    /// ```text
    /// hard
    /// ```
    Ponder, // any

    /// Turns off pondering (thinking on the opponent's turn).
    ///
    /// ```text
    /// easy
    /// ```
    NoPonder, // any, abort pondering

    /// Asks the engine to suggest a move for the current position.
    ///
    /// ```text
    /// hint
    /// ```
    Hint, // pondering

    /// Begins analyzing the current position for the client.
    ///
    /// ```text
    /// analyze
    /// ```
    Analyze, // idle, change to analyzing

    /// Leaves analysis mode.
    ///
    /// ```text
    /// exit
    /// ```
    ExitAnalyze, // analyzing
}

impl FromStr for Command {
    type Err = XboardError;

    fn from_str(s: &str) -> Result<Self, XboardError> {
        use Command::*;

        if let Some(ind) = COMMAND_SET.matches(s).iter().next() {
            let args = COMMAND_VEC[ind].captures(s).expect("INFALLIBLE");

            match ind {
                0 => Ok(Xboard),
                1 => {
                    Ok(Protover(args.get(1).expect("INFALLIBLE").as_str().parse()?))
                },
                2 => {
                    Ok(Accepted(args.get(1).expect("INFALLIBLE").as_str().to_string()))
                },
                3 => {
                    Ok(Rejected(args.get(1).expect("INFALLIBLE").as_str().to_string()))
                },
                4 => {
                    Ok(Ping(args.get(1).expect("INFALLIBLE").as_str().parse()?))
                },
                5 => Ok(Quit),
                6 => Ok(New),
                7 => Ok(Force),
                8 => Ok(Go),
                9 => {
                    Ok(UserMove(args.get(1).expect("INFALLIBLE").as_str().to_string()))
                },
                10 => {
                    Ok(SetBoard(args.get(1).expect("INFALLIBLE").as_str().to_string()))
                },
                11 => Ok(Draw),
                12 => {
                    let result = args.get(1).expect("INFALLIBLE").as_str().to_string();
                    let reason = if let Some(reason) = args.get(2) {
                        Some(reason.as_str().to_string())
                    } else {
                        None
                    };

                    Ok(GameResult{ result, reason })
                },
                13 => Ok(Undo),
                14 => Ok(Remove),
                15 => Ok(MoveNow),
                16 => {
                    let time: u64 = args.get(1).expect("INFALLIBLE").as_str().parse()?;
                    let time = Duration::from_millis(time*10);
                    Ok(Time(time))
                },
                17 => {
                    let time: u64 = args.get(1).expect("INFALLIBLE").as_str().parse()?;
                    let time = Duration::from_millis(time*10);
                    Ok(OppTime(time))
                },
                18 => {
                    let mps = args.get(1).expect("INFALLIBLE").as_str().parse()?;
                    let base_m: u64 = args.get(2).expect("INFALLIBLE").as_str().parse()?;
                    let base_s: u64 = if let Some(arg) = args.get(3) {
                        arg.as_str().parse()?
                    } else {
                        0
                    };
                    let inc = args.get(4).expect("INFALLIBLE").as_str().parse()?;
                    let base = Duration::from_secs(base_m*60 + base_s);
                    let inc = Duration::from_secs_f64(inc);
                    Ok(Level{ mps, base, inc })
                },
                19 => {
                    let time = args.get(1).expect("INFALLIBLE").as_str().parse()?;
                    let time = Duration::from_secs_f64(time);
                    Ok(SetTime(time))
                },
                20 => {
                    Ok(SetDepth(args.get(1).expect("INFALLIBLE").as_str().parse()?))
                },
                21 => {
                    Ok(Memory(args.get(1).expect("INFALLIBLE").as_str().parse()?))
                },
                22 => Ok(Post),
                23 => Ok(NoPost),
                24 => Ok(Ponder),
                25 => Ok(NoPonder),
                26 => Ok(Hint),
                27 => Ok(Analyze),
                28 => Ok(ExitAnalyze),
                _ => unreachable!(),
            }
        } else {
            Err(XboardError)
        }
    }
}

const COMMANDS: [&str; 29] = [
    r"^xboard\b",
    r"^protover\s+(\d+)\b",
    r"^accepted\s+(\w+)\b",
    r"^rejected\s+(\w+)\b",
    r"^ping\s+(\d+)\b",
    r"^quit\b",
    r"^new\b",
    r"^force\b",
    r"^go\b",
    r"^(?:usermove\s+)?([a-h][1-8][a-h][1-8][qrbn]?)\b",
    r"^setboard\s+(.+)\b",
    r"^draw\b",
    r"^result\s+([-/012]+)\b\s*(?:\{([^}]+)\})?",
    r"^undo\b",
    r"^remove\b",
    r"^\?\s*$",
    r"^time\s+(\d+)\b",
    r"^otim\s+(\d+)\b",
    r"^level\s+(\d+)\s+(\d+)(?::(\d\d))?\s+([0-9.]+)\b",
    r"^st\s+([0-9.]+)\b",
    r"^sd\s+(\d+)\b",
    r"^memory\s+(\d+)\b",
    r"^post\b",
    r"^nopost\b",
    r"^hard\b",
    r"^easy\b",
    r"^hint\b",
    r"^analyze\b",
    r"^exit\b",
];

lazy_static! {
    static ref COMMAND_SET: RegexSet = RegexSet::new(&COMMANDS).expect("INFALLIBLE");
    static ref COMMAND_VEC: Vec<Regex> = {
        let mut cmd_vec = Vec::new();
        for cmd in &COMMANDS {
            cmd_vec.push(Regex::new(cmd).expect("INFALLIBLE"));
        }
        cmd_vec
    };
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Responses from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Requests that the client use the given features. Should only be sent at engine startup in
    /// response to the `protover` command.
    ///
    /// ```text
    /// feature NAME=VALUE ...
    /// ```
    ///
    /// NAME is the name of the requested feature.
    ///
    /// VALUE is either an integer or a quoted (") string.
    ///
    /// Any number of NAME=VALUE pairs may be sent in one feature response.
    Feature(Vec<Feature>),

    /// Response to the `ping` command indicating that the engine is ready for the next command.
    ///
    /// ```text
    /// pong N
    /// ```
    ///
    /// N is the unique number given in the `ping` command.
    Pong(usize),

    /// Tells the client that the engine is making the given move.
    ///
    /// ```text
    /// move MOVE
    /// ```
    ///
    /// MOVE is the move to be made.
    Move(String),

    /// Tells the client that the engine is claiming or offering a draw.
    ///
    /// ```text
    /// offer draw
    /// ```
    OfferDraw,

    /// Tells the client that the game has ended with the given result.
    ///
    /// ```text
    /// RESULT [{REASON}]
    /// ```
    ///
    /// RESULT can be one of the following:
    ///
    ///  - 1-0          White wins
    ///  - 0-1          Black wins
    ///  - 1/2-1/2      Draw
    ///
    /// REASON is an optional plain-text reason for the result (eg. checkmate). It must be
    /// enclosed in curly braces.
    GameResult(String, Option<String>),

    /// Tells the client that the engine resigns the game.
    ///
    /// ```text
    /// resign
    /// ```
    Resign,

    /// Tells the client the engine's current line of thinking.
    ///
    /// ```text
    /// <depth> <score> <time> <nodes> <pv>
    /// ```
    ThinkingOutput{
        /// The depth of the current search
        depth: usize,
        /// The value of the current line of thinking
        score: i16,
        /// The amount of time spent thinking on this position (including pondering)
        time: Duration,
        /// The number of nodes searched
        nodes: u64,
        /// One or more moves that make up the principle variation
        pv: String
    },

    /// Response to the hint command, telling the client the current ponder move.
    ///
    /// ```text
    /// Hint: MOVE
    /// ```
    ///
    /// MOVE is the current ponder move.
    Hint(String),

    /// Tells the client that a move received from the client is illegal.
    ///
    /// ```text
    /// Illegal move [(REASON}]: MOVE
    /// ```
    ///
    /// REASON is an optional plain-text reason why the move is illegal (eg. castling through
    /// check). It must be enclosed in parentheses.
    ///
    /// MOVE is the illegal move.
    IllegalMove(String, Option<String>),

    /// Tells the client that the engine doesn't understand the given command.
    ///
    /// ```text
    /// Error (ERRORTYPE): COMMAND
    /// ```
    ///
    /// ERRORTYPE gives the reason for the error (eg. unkown command). It must be enclosed in
    /// parentheses.
    ///
    /// COMMAND is the command that caused the error.
    ErrorMessage(String, String),

    /// A debug message which should be ignored by the client.
    ///
    /// ```text
    /// # MESSAGE
    /// ```
    ///
    /// MESSAGE is the text of the debug message.
    DebugMessage(String),
}

impl Response {
    fn send(&self) {
        io::Client::send(self);
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Response::*;

        match self {
            Feature(list) => {
                let mut s = "feature".to_string();
                for feature in list {
                    s += &format!(" {}", feature);
                }
                s.fmt(f)
            },
            Pong(n) => format!("pong {}", n).fmt(f),
            Move(mov) => format!("move {}", mov).fmt(f),
            OfferDraw => "offer draw".fmt(f),
            GameResult(res, Some(reason)) =>
                format!("{} {{{}}}", res, reason).fmt(f),
            GameResult(res, None) => res.fmt(f),
            Resign => "resign".fmt(f),
            ThinkingOutput{ depth, score, time, nodes, pv } =>
                format!("{} {} {} {} {}", depth, score, time.as_millis()/10, nodes, pv).fmt(f),
            Hint(mov) => format!("Hint: {}", mov).fmt(f),
            IllegalMove(mov, Some(reason)) => format!("Illegal move ({}): {}", reason, mov).fmt(f),
            IllegalMove(mov, None) => format!("Illegal move: {}", mov).fmt(f),
            ErrorMessage(cmd, err_type) => format!("Error ({}): {}", err_type, cmd).fmt(f),
            DebugMessage(msg) => format!("# {}", msg).fmt(f),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A protocol feature that can be requested by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature{
    /// Tells the client whether all features have been given. Defaults to using a timeout.
    Done(bool),
    /// Tells the client whether or not to send SIGINT on Linux. Defaults to `true`. Should always
    /// be set to `false`.
    Sigint(bool),
    /// Tells the client whether or not to send SIGTERM on Linux. Defaults to `true`. Should always
    /// be set to `false`.
    Sigterm(bool),
    /// Tells the client whether or not to use the `ping` command. Defaults to `false`. Should
    /// always be set to `true`.
    Ping(bool),
    /// Tells the client whether or not to use the `setboard` command. Defaults to `false`. Should
    /// always be set to `true`.
    SetBoard(bool),
    /// Tells the client the name of the engine.
    MyName(String),
    /// Enables the `memory` command. Defaults to `false`. Should be set to `true` by any engine
    /// with a hash table.
    Memory(bool),
    /// Tells the engine to ignore lines begining with the `#` character. Defaults to `false` for
    /// some clients. Should always be set to `true`. New clients should default to `true`.
    Debug(bool),
    /// Enables use of the `nps` command. Defaults to `true`.
    Nps(bool),
    /// Enables use of the `analyze` command. Defaults to `true`.
    Analyze(bool),
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Feature::*;

        match self {
            Done(val) => format!("done={}", *val as usize).fmt(f),
            Sigint(val) => format!("sigint={}", *val as usize).fmt(f),
            Sigterm(val) => format!("sigterm={}", *val as usize).fmt(f),
            Ping(val) => format!("ping={}", *val as usize).fmt(f),
            SetBoard(val) => format!("setboard={}", *val as usize).fmt(f),
            MyName(val) => format!("myname={}", val).fmt(f),
            Memory(val) => format!("memory={}", *val as usize).fmt(f),
            Debug(val) => format!("debug={}", *val as usize).fmt(f),
            Nps(val) => format!("nps={}", *val as usize).fmt(f),
            Analyze(val) => format!("analyze={}", *val as usize).fmt(f),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Error type for xboard
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct XboardError;

impl From<ParseIntError> for XboardError {
    fn from(_: ParseIntError) -> XboardError {
        XboardError
    }
}

impl From<ParseFloatError> for XboardError {
    fn from(_: ParseFloatError) -> XboardError {
        XboardError
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ***************************************** UNIT TESTS ***************************************** //
////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_command() {
        use Command::*;

        assert_eq!(Ok(Protover(2)), "protover 2".parse());
        assert_eq!(Ok(Accepted("feature1".to_string())), "accepted feature1".parse());
        assert_eq!(Ok(Rejected("feature2".to_string())), "rejected feature2".parse());
        assert_eq!(Ok(Ping(1234)), "ping 1234".parse());
        assert_eq!(Ok(UserMove("g1f3".to_string())), "usermove g1f3".parse());
        assert_eq!(Ok(UserMove("a7a8q".to_string())), "a7a8q".parse());
        assert_eq!(Ok(
            GameResult{
                result: "1/2-1/2".to_string(),
                reason: Some("stalemate".to_string())
            }),
            "result 1/2-1/2 {stalemate}".parse()
        );
        assert_eq!(Ok(
            GameResult{
                result: "0-1".to_string(),
                reason: None
            }),
            "result 0-1".parse()
        );
        assert_eq!(Ok(Time(Duration::from_millis(1020))), "time 102".parse());
        assert_eq!(Ok(OppTime(Duration::from_millis(50))), "otim 5".parse());
        assert_eq!(Ok(
            Level{
                mps: 0,
                base: Duration::from_secs(90),
                inc: Duration::from_secs(12)
            }),
            "level 0 1:30 12".parse()
        );
        assert_eq!(Ok(
            Level{
                mps: 0,
                base: Duration::from_secs(120),
                inc: Duration::from_millis(32)
            }),
            "level 0 2 0.032".parse()
        );
        assert_eq!(Ok(SetTime(Duration::from_secs(5))), "st 5".parse());
        assert_eq!(Ok(SetTime(Duration::from_millis(10))), "st 0.01".parse());
        assert_eq!(Ok(SetDepth(12)), "sd 12".parse());
        assert_eq!(Ok(Memory(512)), "memory 512".parse());
        assert_eq!(Ok(Analyze), "analyze".parse());
        assert_eq!(Ok(ExitAnalyze), "exit".parse());
        assert_eq!(Err(XboardError), "xyzzy".parse::<Command>());
    }

    #[test]
    fn format_response() {
        use Response::*;

        assert_eq!(Pong(512).to_string(), "pong 512");
        assert_eq!(Move("g1f3".to_string()).to_string(), "move g1f3");
        assert_eq!(GameResult("1/2-1/2".to_string(), Some("stalemate".to_string())).to_string(),
            "1/2-1/2 {stalemate}");
        assert_eq!(GameResult("0-1".to_string(), None).to_string(), "0-1");
        assert_eq!(Hint("g1f3".to_string()).to_string(), "Hint: g1f3");
        assert_eq!(IllegalMove("e1g1".to_string(),
            Some("castling through check".to_string())).to_string(),
            "Illegal move (castling through check): e1g1");
        assert_eq!(IllegalMove("g1f3".to_string(), None).to_string(), "Illegal move: g1f3");
        assert_eq!(ErrorMessage("foo".to_string(), "unknown command".to_string()).to_string(),
            "Error (unknown command): foo");
        assert_eq!(DebugMessage("message".to_string()).to_string(), "# message");
        assert_eq!(
            Feature(vec![
                super::Feature::MyName("windmill".to_string()),
                super::Feature::Ping(true),
                super::Feature::Nps(false),
            ]).to_string(),
            "feature myname=windmill ping=1 nps=0"
        );
        assert_eq!(
            ThinkingOutput{
                depth: 9,
                score: 35,
                time: Duration::from_millis(2740),
                nodes: 459_024,
                pv: "e2e4 e7e5 g1f3".to_string(),
            }.to_string(),
            "9 35 274 459024 e2e4 e7e5 g1f3"
        );
    }

    #[test]
    fn time_budgets_follow_the_time_control() {
        // sudden death spreads the remaining time out
        let clock = Clock::new(TimeControl::SuddenDeath(Duration::from_secs(60)));
        assert_eq!(time_budget(&clock, Color::White),
            (Some(Duration::from_secs(2)), Some(Duration::from_secs(4))));

        // session clocks work the same way on what is left
        let clock = Clock::new(TimeControl::Session{
            base: Duration::from_secs(120),
            mps: 40,
        });
        assert_eq!(time_budget(&clock, Color::White),
            (Some(Duration::from_secs(4)), Some(Duration::from_secs(8))));

        // the increment is added in full while there is time to spare
        let clock = Clock::new(TimeControl::Incremental{
            base: Duration::from_secs(60),
            inc: Duration::from_secs(1),
        });
        assert_eq!(time_budget(&clock, Color::White),
            (Some(Duration::from_secs(3)), Some(Duration::from_secs(6))));

        // once the clock runs low the increment no longer carries the move
        let mut clock = Clock::new(TimeControl::Incremental{
            base: Duration::from_secs(60),
            inc: Duration::from_secs(1),
        });
        clock.set(Color::White, Duration::from_secs(5));
        assert_eq!(time_budget(&clock, Color::White),
            (Some(Duration::from_secs(1)), Some(Duration::from_secs(2))));

        // exact time controls use the whole allowance, with nothing extra
        let clock = Clock::new(TimeControl::Exact(Duration::from_secs(5)));
        assert_eq!(time_budget(&clock, Color::White),
            (Some(Duration::from_secs(5)), Some(Duration::from_secs(5))));

        // without a clock there is no budget at all
        let clock = Clock::new(TimeControl::Infinite);
        assert_eq!(time_budget(&clock, Color::White), (None, None));
    }
}
