// error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    /// The OS refused to create a new process. Fatal to the interpreter.
    #[error("error in forking: {0}")]
    Fork(#[source] nix::Error),
    #[error("error waiting for child: {0}")]
    Wait(#[source] nix::Error),
    #[error("cannot install child reaper: {0}")]
    Signal(#[source] nix::Error),
    #[error("invalid {key}={value:?}: {reason}")]
    InvalidConfig {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
