//! Supported chess protocols
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::engine::Report;

pub mod io;
pub mod xboard;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Everything which can wake the protocol loop: a line from the client, the end of the
/// client's input, or a report from the engine.
#[derive(Debug)]
pub enum Event {
    /// A line of input from the client, already trimmed
    Line(String),
    /// The client's input has ended
    Eof,
    /// A report from the engine
    Engine(Report),
}

impl From<Report> for Event {
    fn from(report: Report) -> Self {
        Event::Engine(report)
    }
}
