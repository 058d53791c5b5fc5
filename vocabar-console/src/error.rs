use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Unknown command \"{0}\", type `help` for the list")]
    UnknownCommand(String),

    #[error("Invalid arguments for `{command}`: {reason}")]
    InvalidArguments {
        command: &'static str,
        reason: String,
    },

    #[error("Failed to read import file {path}: {source}")]
    ImportRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read stdin: {0}")]
    Stdin(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
