// main.rs

mod config;
mod dispatcher;
mod error;
mod history;
mod parser;
mod process;
mod repl;
mod util;

use std::io;

use anyhow::Context;
use env_logger::Env;

use crate::config::Config;
use crate::process::ProcessRunner;
use crate::repl::Repl;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = Config::from_env().context("bad configuration")?;
    let runner = ProcessRunner::new()?;
    let mut repl = Repl::new(config, runner);

    let stdin = io::stdin();
    repl.run(stdin.lock(), io::stdout())
        .context("rashell terminated")?;
    Ok(())
}
