//! A chess engine which runs on its own thread and answers commands.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use log::debug;
use crate::chess::{Move, Position, Zobrist};

mod eval;
pub use eval::Score;

mod hash;
mod search;
use search::Searcher;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A message from the engine to whoever is listening.
#[derive(Debug, Clone)]
pub enum Report {
    /// The move the engine settled on, with the reply it expects if it found one.
    BestMove {
        mov: Move,
        ponder: Option<Move>,
    },
    /// A completed search iteration.
    Thinking {
        depth: usize,
        score: Score,
        time: Duration,
        nodes: u64,
        pv: Vec<Move>,
    },
}

////////////////////////////////////////////////////////////////////////////////////////////////////
enum Command {
    Think(Position, Option<Duration>),
    Analyze(Position),
    Ponder(Position),
    SeedBook(Vec<(Zobrist, Move)>),
    SetHashSize(usize),
    SetDepth(usize),
    NewGame,
    Quit,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A handle to a running engine.
///
/// The searches run on a worker thread which owns all of the caches, so this handle only talks
/// to it: commands go down a channel, and the engine answers with [`Report`]s on the channel
/// given to [`start`](#method.start). A second thread keeps the hard deadline, which cuts the
/// search off even while the worker is buried in its tree.
///
/// Posting new work raises the cancellation flag first, so a search still in progress winds up
/// quickly, but its reports can already be in the channel. A listener which has changed its
/// mind must be prepared to ignore a best move it no longer wants.
#[derive(Debug)]
pub struct Engine {
    commands: Sender<Command>,
    alarm: Option<Sender<Option<Instant>>>,
    cancel: Arc<AtomicBool>,
    abort: Arc<AtomicBool>,
    post: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    timer: Option<JoinHandle<()>>,
}

impl Engine {
    /// Starts the worker and timer threads and returns the handle to them.
    ///
    /// Reports arrive as whatever type the listener prefers, as long as it can be built from
    /// [`Report`]. Thinking output is off until [`set_post`](#method.set_post) turns it on.
    pub fn start<T>(
        report_tx: Sender<T>,
        hash_megabytes: usize,
        pawn_megabytes: usize,
        contempt: i16,
        max_depth: usize)
    -> io::Result<Engine> where T: From<Report> + Send + 'static {
        let (command_tx, command_rx) = channel();
        let (alarm_tx, alarm_rx) = channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let abort = Arc::new(AtomicBool::new(false));
        let post = Arc::new(AtomicBool::new(false));

        let worker = {
            let worker = Worker {
                searcher: Searcher::new(
                    hash_megabytes, pawn_megabytes, contempt, max_depth, cancel.clone()),
                commands: command_rx,
                reports: report_tx,
                alarm: alarm_tx.clone(),
                cancel: cancel.clone(),
                abort: abort.clone(),
                post: post.clone(),
            };

            thread::Builder::new().name("engine".to_string()).spawn(move || worker.run())?
        };

        let timer = {
            let cancel = cancel.clone();
            thread::Builder::new()
                .name("timer".to_string())
                .spawn(move || run_timer(alarm_rx, cancel))?
        };

        Ok(Engine {
            commands: command_tx,
            alarm: Some(alarm_tx),
            cancel,
            abort,
            post,
            worker: Some(worker),
            timer: Some(timer),
        })
    }

    /// Searches for the best move in `pos` and reports it.
    ///
    /// The engine tries to finish within the soft budget, and is cut off outright at the
    /// hard deadline. With neither, it searches to its maximum depth.
    pub fn think(&self, pos: Position, budget: Option<Duration>, deadline: Option<Instant>) {
        self.abort();
        self.arm(deadline);
        let _ = self.commands.send(Command::Think(pos, budget));
    }

    /// Searches `pos` for the listener's benefit, reporting lines but never a move.
    pub fn analyze(&self, pos: Position) {
        self.abort();
        let _ = self.commands.send(Command::Analyze(pos));
    }

    /// Searches `pos` while the opponent decides, to fill the caches for the real search.
    pub fn ponder(&self, pos: Position) {
        self.abort();
        let _ = self.commands.send(Command::Ponder(pos));
    }

    /// Ends the current search, letting it report the best move found so far.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.arm(None);
    }

    /// Ends the current search and throws its result away.
    pub fn abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
        self.cancel.store(true, Ordering::Relaxed);
        self.arm(None);
    }

    /// Turns thinking output on or off.
    pub fn set_post(&self, on: bool) {
        self.post.store(on, Ordering::Relaxed);
    }

    /// Plants opening book moves for the positions they were recorded in.
    pub fn seed_book(&self, entries: Vec<(Zobrist, Move)>) {
        let _ = self.commands.send(Command::SeedBook(entries));
    }

    /// Replaces the transposition table with one of the given size.
    pub fn set_hash_size(&self, megabytes: usize) {
        let _ = self.commands.send(Command::SetHashSize(megabytes));
    }

    /// Limits how deep future searches go.
    pub fn set_depth(&self, max_depth: usize) {
        let _ = self.commands.send(Command::SetDepth(max_depth));
    }

    /// Tells the engine a new game is starting.
    pub fn new_game(&self) {
        self.abort();
        let _ = self.commands.send(Command::NewGame);
    }

    fn arm(&self, deadline: Option<Instant>) {
        if let Some(alarm) = &self.alarm {
            let _ = alarm.send(deadline);
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.abort();
        let _ = self.commands.send(Command::Quit);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        // the timer exits once every alarm sender is gone
        self.alarm = None;
        if let Some(timer) = self.timer.take() {
            let _ = timer.join();
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
struct Worker<T> {
    searcher: Searcher,
    commands: Receiver<Command>,
    reports: Sender<T>,
    alarm: Sender<Option<Instant>>,
    cancel: Arc<AtomicBool>,
    abort: Arc<AtomicBool>,
    post: Arc<AtomicBool>,
}

impl<T: From<Report>> Worker<T> {
    fn run(mut self) {
        while let Ok(command) = self.commands.recv() {
            match command {
                Command::Think(mut pos, budget) => self.think(&mut pos, budget),
                Command::Analyze(mut pos) | Command::Ponder(mut pos) => self.examine(&mut pos),
                Command::SeedBook(entries) => self.searcher.seed_book(&entries),
                Command::SetHashSize(megabytes) => self.searcher.set_hash_size(megabytes),
                Command::SetDepth(max_depth) => self.searcher.set_depth(max_depth),
                Command::NewGame => self.searcher.new_game(),
                Command::Quit => break,
            }
        }
    }

    fn think(&mut self, pos: &mut Position, budget: Option<Duration>) {
        let result = self.search(pos, budget);

        // even a search cancelled before its first iteration must answer with something
        let result = result.or_else(|| pos.legal_moves().first().map(|&mov| (mov, None)));

        let _ = self.alarm.send(None);
        if self.abort.load(Ordering::Relaxed) {
            debug!("search aborted");
            return;
        }

        if let Some((mov, ponder)) = result {
            let _ = self.reports.send(Report::BestMove { mov, ponder }.into());
        }
    }

    fn examine(&mut self, pos: &mut Position) {
        self.search(pos, None);
    }

    fn search(&mut self, pos: &mut Position, budget: Option<Duration>)
    -> Option<(Move, Option<Move>)> {
        self.cancel.store(false, Ordering::Relaxed);
        self.abort.store(false, Ordering::Relaxed);
        let deadline = budget.map(|budget| Instant::now() + budget);

        let reports = &self.reports;
        let post = &self.post;
        self.searcher.iterate(pos, deadline, |report| {
            if post.load(Ordering::Relaxed) {
                let _ = reports.send(report.into());
            }
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Watches the hard deadline and raises the cancellation flag when it arrives.
///
/// Sending a new deadline replaces the old one, and `None` disarms the alarm. The thread ends
/// when the channel does.
fn run_timer(alarm: Receiver<Option<Instant>>, cancel: Arc<AtomicBool>) {
    let mut deadline = None;

    loop {
        match deadline {
            None => match alarm.recv() {
                Ok(new) => deadline = new,
                Err(_) => return,
            },
            Some(when) => {
                let now = Instant::now();
                if when <= now {
                    cancel.store(true, Ordering::Relaxed);
                    deadline = None;
                    continue;
                }

                match alarm.recv_timeout(when - now) {
                    Ok(new) => deadline = new,
                    Err(RecvTimeoutError::Timeout) => {
                        cancel.store(true, Ordering::Relaxed);
                        deadline = None;
                    }
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        }
    }
}
