//! Path constants for configuration, state and dictionary files.

use std::path::PathBuf;

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "vocabar";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the persisted playback state file
pub const STATE_FILE_NAME: &str = "state.json";

/// Directory holding user-imported dictionaries
pub const CUSTOM_DICTIONARIES_DIR_NAME: &str = "custom_dictionaries";

/// Directory holding the bundled, read-only dictionaries
pub const BUNDLED_DICTIONARIES_DIR_NAME: &str = "dictionaries";

/// The name of the log file written when file logging is enabled
pub const LOG_FILE_NAME: &str = "vocabar.log";

/// Get the configuration directory path (~/.config/vocabar/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the config file path (~/.config/vocabar/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the persisted state path (~/.config/vocabar/state.json)
#[must_use]
pub fn state_path() -> PathBuf {
    config_dir().join(STATE_FILE_NAME)
}

/// Get the custom dictionary directory (`~/.config/vocabar/custom_dictionaries/`)
#[must_use]
pub fn custom_dictionaries_dir() -> PathBuf {
    config_dir().join(CUSTOM_DICTIONARIES_DIR_NAME)
}

/// Get the default bundled dictionary directory (`~/.config/vocabar/dictionaries/`)
#[must_use]
pub fn bundled_dictionaries_dir() -> PathBuf {
    config_dir().join(BUNDLED_DICTIONARIES_DIR_NAME)
}

/// Get the log file path (`~/.cache/vocabar/vocabar.log`)
#[must_use]
pub fn log_file_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(config_dir)
        .join(CONFIG_DIR_NAME)
        .join(LOG_FILE_NAME)
}
