//! Tools for reading PGN files, and for building an opening book from them.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::io;
use std::io::{Read, BufRead, BufReader};
use std::collections::HashMap;
use log::warn;
use crate::chess;
use chess::{Move, Position, Zobrist};
use chess::game::{Game, GameResult};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Returns an iterator over the games in a PGN file.
pub fn read_pgn_games<R: Read>(reader: R) -> ReadPgnGames<R> {
    ReadPgnGames{ reader: BufReader::new(reader), buffer: String::new() }
}

/// Iterator over the games of a PGN file. Created by [`read_pgn_games`].
#[derive(Debug)]
pub struct ReadPgnGames<R: Read> {
    reader: BufReader<R>,
    buffer: String,
}

impl<R: Read> Iterator for ReadPgnGames<R> {
    type Item = io::Result<PgnParser>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut tags = Vec::new();
        let mut move_text = String::new();

        loop {
            let s = self.buffer.trim();

            if s.starts_with('[') {
                if move_text.is_empty() {
                    tags.push(s.to_owned());
                    self.buffer = String::new();
                } else {
                    // a new tag section begins the next game
                    return Some(Ok(PgnParser{ tags, move_text }));
                }
            } else if !s.is_empty() {
                // line comments run to the end of a line, so the line structure is kept
                move_text += "\n";
                move_text += s;
            }

            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => {
                    if tags.is_empty() && move_text.is_empty() {
                        return None;
                    } else {
                        return Some(Ok(PgnParser{ tags, move_text }));
                    }
                },
                Err(error) => return Some(Err(error)),
                _ => {},
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A single game read from a PGN file, not yet parsed.
#[derive(Debug, Clone)]
pub struct PgnParser {
    tags: Vec<String>,
    move_text: String,
}

impl PgnParser {
    /// Parses the tag pair section into a map from tag names to their values.
    pub fn tags(&self) -> Result<HashMap<String, String>, PgnParseError> {
        let mut tags = HashMap::new();
        for tag in &self.tags {
            let split: Vec<_> = tag
                .trim_start_matches('[')
                .trim_end_matches(']')
                .trim()
                .trim_end_matches('"')
                .splitn(2, " \"")
                .collect();

            if split.len() == 2 {
                tags.insert(split[0].to_owned(), split[1].to_owned());
            } else {
                return Err(PgnParseError(format!("malformed tag pair: {}", tag)));
            }
        }

        Ok(tags)
    }

    /// Returns the unparsed move text of the game.
    pub fn move_text(&self) -> &str {
        &self.move_text
    }

    /// Parses the game, playing out its moves from the initial position.
    ///
    /// Comments, variations and annotation glyphs are skipped. The game starts from the
    /// position in the `FEN` tag when one is present, and the result is taken from the
    /// game termination marker.
    pub fn game(&self) -> Result<Game, PgnParseError> {
        let mut game = self.initial()?;

        for token in (Tokens{ text: &self.move_text }) {
            match token {
                Token::San(s) => { game.make_move_from_str(s)?; }
                Token::Termination(result) => {
                    if let Some(result) = result {
                        game.set_result(result);
                    }
                    break;
                }
            }
        }

        Ok(game)
    }

    /// Plays out at most `max_plies` moves of the game, returning each move paired with
    /// the key of the position it was played from.
    pub fn opening(&self, max_plies: usize) -> Result<Vec<(Zobrist, Move)>, PgnParseError> {
        let mut game = self.initial()?;
        let mut line = Vec::new();

        for token in (Tokens{ text: &self.move_text }) {
            if line.len() >= max_plies {
                break;
            }

            match token {
                Token::San(s) => {
                    let key = game.position().zobrist_key();
                    let mov = game.position().move_from_san(s)?;
                    game.make_move(mov)?;
                    line.push((key, mov));
                }
                Token::Termination(_) => break,
            }
        }

        Ok(line)
    }

    /// Returns the game's starting position, honoring the `FEN` tag when present.
    fn initial(&self) -> Result<Game, PgnParseError> {
        match self.tags()?.get("FEN") {
            Some(fen) => {
                let pos: Position = fen.parse()?;
                Ok(Game::starting_at(pos))
            }
            None => Ok(Game::new()),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Reads every game from a PGN file, keeping the first `max_plies` moves of each paired
/// with the key of the position they were played from.
///
/// Games which do not parse are logged and skipped, so one mangled game does not cost the
/// rest of the book. Errors reading the input end the read.
pub fn read_book<R: Read>(reader: R, max_plies: usize) -> io::Result<Vec<(Zobrist, Move)>> {
    let mut book = Vec::new();

    for game in read_pgn_games(reader) {
        match game?.opening(max_plies) {
            Ok(line) => book.extend(line),
            Err(error) => warn!("skipping unreadable book game: {}", error),
        }
    }

    Ok(book)
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// One meaningful token of a game's move text.
enum Token<'a> {
    /// A move, in algebraic notation
    San(&'a str),
    /// A game termination marker, `None` for an unknown or ongoing result
    Termination(Option<GameResult>),
}

/// Iterator over the meaningful tokens of PGN move text.
///
/// Brace comments, line comments, nested variations, numeric annotation glyphs and move
/// numbers are dropped along the way.
struct Tokens<'a> {
    text: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            let text = self.text.trim_start();

            match text.chars().next() {
                None => {
                    self.text = text;
                    return None;
                }
                Some('{') => {
                    self.text = match text.find('}') {
                        Some(end) => &text[end + 1..],
                        None => "",
                    };
                }
                Some(';') => {
                    self.text = match text.find('\n') {
                        Some(end) => &text[end + 1..],
                        None => "",
                    };
                }
                Some('(') => {
                    self.text = skip_variation(text);
                }
                // stray closers have nothing to match, but must not stall the scan
                Some(')') | Some('}') => {
                    self.text = &text[1..];
                }
                Some(_) => {
                    let end = text
                        .find(|c: char| c.is_whitespace() || "{};()".contains(c))
                        .unwrap_or_else(|| text.len());
                    let (word, rest) = text.split_at(end);
                    self.text = rest;

                    if let Some(token) = classify(word) {
                        return Some(token);
                    }
                }
            }
        }
    }
}

/// Skips past a parenthesized variation, which can nest and can hold brace comments.
fn skip_variation(text: &str) -> &str {
    let mut depth = 0;
    let mut brace = false;

    for (i, c) in text.char_indices() {
        match c {
            '}' => brace = false,
            _ if brace => {}
            '{' => brace = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return &text[i + 1..];
                }
            }
            _ => {}
        }
    }

    ""
}

/// Classifies a whitespace-delimited word of move text, or drops it.
fn classify(word: &str) -> Option<Token<'_>> {
    match word {
        "1-0" => Some(Token::Termination(Some(GameResult::WhiteWins))),
        "0-1" => Some(Token::Termination(Some(GameResult::BlackWins))),
        "1/2-1/2" => Some(Token::Termination(Some(GameResult::Draw))),
        "*" => Some(Token::Termination(None)),
        _ if word.starts_with('$') => None,
        _ => {
            // move numbers are often glued to the move itself, as in "1.e4" or "2...Nc6",
            // but castling written with zeros must keep its leading digit
            let san = if word.starts_with("0-") {
                word
            } else {
                word.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
            };
            let san = san.trim_end_matches(|c| c == '!' || c == '?');

            if san.is_empty() {
                None
            } else {
                Some(Token::San(san))
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An error found while parsing a PGN game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnParseError(String);

impl fmt::Display for PgnParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for PgnParseError { }

impl From<chess::error::Error> for PgnParseError {
    fn from(error: chess::error::Error) -> Self {
        PgnParseError(error.to_string())
    }
}
