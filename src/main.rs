//! The windmill chess engine.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs, missing_debug_implementations, unused_extern_crates)]
#![warn(clippy::unimplemented, clippy::todo)]
#![warn(clippy::option_unwrap_used, clippy::result_unwrap_used)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use clap::{App, Arg, SubCommand, crate_version};
use log::warn;
use serde::Deserialize;
use simplelog::{WriteLogger, LevelFilter};
use windmill::chess::variations;
use windmill::engine::Engine;
use windmill::pgn;
use windmill::protocol::io::Client;
use windmill::protocol::xboard::Xboard;

/// Number of plies of each game the opening book keeps.
const BOOK_PLIES: usize = 20;

fn main() -> Result<(), Error> {
    let app_dir = dirs::home_dir()
        .map(|home| { home.join(".windmill") })
        .unwrap_or_else(|| PathBuf::from("."));

    let matches =
        App::new("Windmill")
            .version(crate_version!())
            .author("Mike Leany")
            .arg(Arg::with_name("xboard")
                .long("xboard")
                .hidden(true)
                .help("Uses the xboard interface"))
            .arg(Arg::with_name("log")
                .long("log")
                .short("l")
                .global(true)
                .help("Turns on logging"))
            .arg(Arg::with_name("log-file")
                .long("log-file")
                .global(true)
                .value_name("LOG_FILE")
                .takes_value(true)
                .default_value("windmill.log")
                .help("Sets the log file if logging is turned on"))
            .arg(Arg::with_name("log-level")
                .long("log-level")
                .global(true)
                .value_name("LEVEL")
                .takes_value(true)
                .default_value("info")
                .help("Sets the log level if logging is turned on"))
            .subcommand(SubCommand::with_name("counts")
                .about("Counts the number of variations from a given starting position \
                        to a specified\ndepth. Defaults to the standard starting position.")
                .arg(Arg::with_name("depth")
                    .long("depth")
                    .short("d")
                    .value_name("DEPTH")
                    .takes_value(true)
                    .required(true)
                    .help("Depth to search the position"))
                .arg(Arg::with_name("fen")
                    .value_name("FEN_STRING")
                    .default_value("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                    .hide_default_value(true)
                    .multiple(true)
                    .help("Position to search in Forsyth-Edwards Notation (FEN)")))
            .get_matches();

    let log_file = PathBuf::from(matches.value_of_os("log-file").expect("INFALLIBLE"));
    let log_level = match matches.value_of("log-level") {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        Some(level) => return Err(Error(format!("{}: invalid log level", level))),
        None => unreachable!(),
    };

    let _logger = if matches.is_present("log") {
        WriteLogger::init(
            log_level,
            simplelog::Config::default(),
            File::create(&log_file).map_err(|err| {
                Error(format!("{}: {}", log_file.display(), err))
            })?)
    } else {
        WriteLogger::init(LevelFilter::Off, simplelog::Config::default(), std::io::sink())
    };

    match matches.subcommand() {
        (_, None) => {
            let config = Config::read(&app_dir.join("config.yaml"))?;

            let (events_tx, events_rx) = channel();
            Client::connect(events_tx.clone())
                .map_err(|err| Error(format!("failed to read client input: {}", err)))?;

            let engine = Engine::start(
                    events_tx,
                    config.hash_mb,
                    config.pawn_mb,
                    config.contempt,
                    config.max_depth)
                .map_err(|err| Error(format!("failed to start the engine: {}", err)))?;

            let book_path = app_dir.join(&config.book);
            if let Ok(file) = File::open(&book_path) {
                match pgn::read_book(file, BOOK_PLIES) {
                    Ok(entries) => engine.seed_book(entries),
                    Err(err) => warn!("{}: {}", book_path.display(), err),
                }
            }

            Xboard::new(engine, events_rx).run();
        },
        ("counts", Some(matches)) => {
            let depth = matches
                .value_of("depth")
                .expect("INFALLIBLE")
                .parse()
                .map_err(|_| {Error("depth must be numeric".to_owned())})?;

            println!();
            for fen in matches.values_of("fen").expect("INFALLIBLE") {
                let mut pos = fen.parse().map_err(|err| {Error(format!("{}: {}", fen, err))})?;
                println!("{}", fen);
                let count = variations::print(&mut pos, depth);
                println!("Depth {} total:\t{:12}\n", depth, count);
            }
        },
        _ => unreachable!(),
    }

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Engine settings read from `config.yaml` in the engine directory. Every field has a
/// default, and a missing file means all defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Config {
    /// Transposition table size in megabytes
    hash_mb: usize,
    /// Pawn structure cache size in megabytes
    pawn_mb: usize,
    /// Opening book file, relative to the engine directory
    book: PathBuf,
    /// How much the engine dislikes draws, in hundredths of a pawn
    contempt: i16,
    /// Maximum search depth
    max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hash_mb: 64,
            pawn_mb: 1,
            book: PathBuf::from("book.pgn"),
            contempt: 0,
            max_depth: 64,
        }
    }
}

impl Config {
    /// Reads the configuration file, or falls back to the defaults if there is none.
    fn read(path: &Path) -> Result<Config, Error> {
        match File::open(path) {
            Ok(file) => serde_yaml::from_reader(file)
                .map_err(|err| Error(format!("{}: {}", path.display(), err))),
            Err(_) => Ok(Config::default()),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
struct Error(String);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Error { }
