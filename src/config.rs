// config.rs

use std::num::NonZeroUsize;

use crate::error::ShellError;

pub const DEFAULT_PROMPT: &str = "rashell> ";
pub const DEFAULT_HISTORY_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => panic!("zero history capacity"),
};
pub const DEFAULT_MAX_LINE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub history_capacity: NonZeroUsize,
    pub max_line: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_line: DEFAULT_MAX_LINE,
        }
    }
}

impl Config {
    /// Reads `RASHELL_PROMPT`, `RASHELL_HISTSIZE` and `RASHELL_MAX_LINE`.
    pub fn from_env() -> Result<Self, ShellError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ShellError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(prompt) = lookup("RASHELL_PROMPT") {
            config.prompt = prompt;
        }
        if let Some(size) = lookup("RASHELL_HISTSIZE") {
            config.history_capacity = parse_positive("RASHELL_HISTSIZE", size)?;
        }
        if let Some(len) = lookup("RASHELL_MAX_LINE") {
            config.max_line = parse_positive("RASHELL_MAX_LINE", len)?.get();
        }
        Ok(config)
    }
}

fn parse_positive(key: &'static str, value: String) -> Result<NonZeroUsize, ShellError> {
    match value.trim().parse::<usize>().map(NonZeroUsize::new) {
        Ok(Some(n)) => Ok(n),
        Ok(None) => Err(ShellError::InvalidConfig { key, value, reason: "must be at least 1" }),
        Err(_) => Err(ShellError::InvalidConfig { key, value, reason: "not a number" }),
    }
}
