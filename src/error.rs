use crate::command::{self, ExitCode};
use thiserror::Error;

/// Recoverable failures of a single sub-command.
///
/// None of these stop the interpreter: the pipeline reports the message,
/// stores [`ShellError::status`] as the last status and moves on.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Malformed builtin arguments.
    #[error("{0}")]
    Usage(String),

    /// A builtin could not find what it was asked about, e.g. an unknown alias.
    #[error("{0}")]
    Lookup(String),

    #[error("not found")]
    NotFound,

    #[error("Permission denied")]
    NotExecutable,

    #[error("{0}")]
    Spawn(#[source] std::io::Error),

    /// `cd` failed; the working directory is unchanged.
    #[error("can't cd to {0}")]
    Directory(String),

    #[error("OLDPWD not set")]
    NoPreviousDirectory,

    /// Writing a builtin's output failed.
    #[error("write error: {0}")]
    Output(#[from] std::io::Error),
}

impl ShellError {
    pub fn status(&self) -> ExitCode {
        match self {
            ShellError::Usage(_) => command::USAGE,
            ShellError::Lookup(_)
            | ShellError::Directory(_)
            | ShellError::NoPreviousDirectory
            | ShellError::Output(_) => command::FAILURE,
            ShellError::NotExecutable | ShellError::Spawn(_) => command::NOT_EXECUTABLE,
            ShellError::NotFound => command::NOT_FOUND,
        }
    }
}
