// dispatcher.rs

use std::io::Write;

use itertools::Itertools;
use log::debug;

use crate::error::ShellError;
use crate::history::History;
use crate::parser::{parse_recall, tokenize, Command, Recall};
use crate::util::writeln_ignore_broken_pipe;

/// Starts external programs on behalf of the dispatcher.
///
/// `line` is the raw input the command came from; it is what gets reported
/// when the program cannot be found.
pub trait Launcher {
    fn foreground(&mut self, command: &Command, line: &str) -> Result<(), ShellError>;
    fn background(&mut self, command: &Command, line: &str) -> Result<(), ShellError>;
}

/// What a single dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Blank line.
    Empty,
    /// `!` followed by something that is not an integer.
    Ignored,
    EventNotFound,
    Listed { id: u64 },
    Launched { id: u64, background: bool },
}

pub struct Dispatcher<L> {
    history: History,
    launcher: L,
}

impl<L: Launcher> Dispatcher<L> {
    pub fn new(history: History, launcher: L) -> Self {
        Self { history, launcher }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn dispatch<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Outcome, ShellError> {
        match parse_recall(line) {
            Some(Recall::Event(target)) => self.replay(line, target, out),
            Some(Recall::Malformed) => {
                debug!("ignoring malformed recall {line:?}");
                Ok(Outcome::Ignored)
            }
            None => self.execute(line, out),
        }
    }

    // Recalled text goes straight to `execute`, never back through recall
    // parsing, so a replay can't chain into another one.
    fn replay<W: Write>(&mut self, line: &str, target: i64, out: &mut W) -> Result<Outcome, ShellError> {
        let recalled = u64::try_from(target)
            .ok()
            .and_then(|id| self.history.get(id))
            .map(|entry| entry.command.clone());
        match recalled {
            Some(command) => {
                debug!("replaying event {target}: {command:?}");
                self.execute(&command, out)
            }
            None => {
                writeln_ignore_broken_pipe(&mut *out, format!("{line}: event not found"))?;
                Ok(Outcome::EventNotFound)
            }
        }
    }

    fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Outcome, ShellError> {
        if line == "history" {
            // Recorded before listing, so the listing includes itself.
            let id = self.history.add(line.to_string());
            for entry in self.history.all() {
                writeln_ignore_broken_pipe(&mut *out, format!("  {} {}", entry.id, entry.command))?;
            }
            return Ok(Outcome::Listed { id });
        }

        let command = tokenize(line);
        if command.is_empty() {
            return Ok(Outcome::Empty);
        }

        out.flush()?;
        debug!(
            "launching [{}]{}",
            command.argv.iter().join(", "),
            if command.background { " in background" } else { "" }
        );
        if command.background {
            self.launcher.background(&command, line)?;
        } else {
            self.launcher.foreground(&command, line)?;
        }
        let id = self.history.add(line.to_string());
        debug!("recorded event {id}, {} of {} slots used", self.history.len(), self.history.capacity());
        Ok(Outcome::Launched { id, background: command.background })
    }
}
