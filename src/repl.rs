// repl.rs

use std::io::{BufRead, Write};

use log::{debug, warn};

use crate::config::Config;
use crate::dispatcher::{Dispatcher, Launcher};
use crate::error::ShellError;
use crate::history::History;
use crate::process::take_reaped;
use crate::util::writeln_ignore_broken_pipe;

pub struct Repl<L> {
    config: Config,
    dispatcher: Dispatcher<L>,
}

impl<L: Launcher> Repl<L> {
    pub fn new(config: Config, launcher: L) -> Self {
        let history = History::new(config.history_capacity);
        debug!("history capacity {}", history.capacity());
        Self {
            config,
            dispatcher: Dispatcher::new(history, launcher),
        }
    }

    /// Prompts and dispatches lines until `exit` or end of input.
    ///
    /// Only fatal errors (the OS refusing to fork, a broken terminal) end the
    /// loop early.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<(), ShellError> {
        let mut buf = Vec::new();
        loop {
            let reaped = take_reaped();
            if reaped > 0 {
                debug!("reaped {reaped} background child(ren)");
            }

            write!(out, "{}", self.config.prompt)?;
            out.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                debug!("end of input");
                return Ok(());
            }
            // Bytes that aren't UTF-8 become U+FFFD instead of ending the session.
            let text = String::from_utf8_lossy(&buf);
            let line = text.strip_suffix('\n').unwrap_or(&*text);
            let line = line.strip_suffix('\r').unwrap_or(line);

            if line == "exit" {
                return Ok(());
            }
            if line.len() > self.config.max_line {
                warn!("rejecting {}-byte line", line.len());
                writeln_ignore_broken_pipe(
                    &mut out,
                    format!("rashell: line too long (max {})", self.config.max_line),
                )?;
                continue;
            }

            let outcome = self.dispatcher.dispatch(line, &mut out)?;
            debug!("{line:?} -> {outcome:?}");
        }
    }
}
