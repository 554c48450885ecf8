//! Handles the engine's input and output with the client.
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::io;
use std::io::stdin;
use std::sync::mpsc::Sender;
use std::thread;
use log::{info, error};
use super::Event;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The engine's connection with the client, over stdin and stdout. All input and output is
/// logged using the log crate (assuming a logger is set up).
#[derive(Debug)]
pub struct Client;

impl Client {
    /// Spawns a thread which turns each line of client input into an [`Event::Line`].
    ///
    /// When the input ends, or cannot be read, the thread sends one final [`Event::Eof`]
    /// and exits.
    pub fn connect(events: Sender<Event>) -> io::Result<()> {
        thread::Builder::new().name("client".to_owned()).spawn(move || {
            Self::read(events);
        })?;

        Ok(())
    }

    /// Sends a message to the client.
    pub fn send<T: fmt::Display>(message: T) {
        println!("{}", message);
        info!("<engine>: {}", message);
    }

    /// Reads client input until it ends or the events channel closes.
    fn read(events: Sender<Event>) {
        let stdin = stdin();
        let mut line = String::new();

        loop {
            line.clear();

            match stdin.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => { },
                Err(err) => {
                    error!("failed to read from the client: {}", err);
                    break;
                },
            }

            let line = line.trim().to_string();
            info!("<client>: {}", line);
            if events.send(Event::Line(line)).is_err() {
                return;
            }
        }

        let _ = events.send(Event::Eof);
    }
}
