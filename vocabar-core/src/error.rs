use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Dictionary errors
    #[error("Dictionary not found at {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to parse dictionary {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid dictionary: {reason}")]
    ValidationError { reason: String },

    // Host errors
    #[error("Failed to register shortcut {accelerator}: {reason}")]
    Shortcut { accelerator: String, reason: String },

    // Settings errors
    #[error("Failed to parse settings file: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("Failed to serialize dictionary: {0}")]
    Serialize(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoreError {
    /// Map an IO error on `path` to [`CoreError::NotFound`] when the file is missing.
    pub(crate) fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::IoError(error)
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
