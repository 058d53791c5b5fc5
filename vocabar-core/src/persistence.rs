//! Playback state persistence across restarts.

use crate::playback::{Mode, PlaybackState, DEFAULT_INTERVAL};
use crate::time::DurationExt;
use crate::vocabulary::Level;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Durable subset of [`PlaybackState`], stored as `state.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedConfig {
    #[serde(rename = "currentIndex")]
    pub current_index: usize,
    #[serde(rename = "currentLanguage")]
    pub current_language: String,
    #[serde(rename = "currentFromLanguage")]
    pub current_from_language: String,
    #[serde(rename = "currentLevel")]
    pub current_level: Level,
    #[serde(rename = "currentMode")]
    pub current_mode: Mode,
    #[serde(rename = "isSoundMode")]
    pub is_sound_mode: bool,
    #[serde(rename = "WORDS_CHANGE_INTERVAL_IN_MS")]
    pub words_change_interval_in_ms: u64,
}

impl Default for PersistedConfig {
    fn default() -> Self {
        Self::from(&PlaybackState::default())
    }
}

impl From<&PlaybackState> for PersistedConfig {
    fn from(state: &PlaybackState) -> Self {
        Self {
            current_index: state.cursor,
            current_language: state.language_to.clone(),
            current_from_language: state.language_from.clone(),
            current_level: state.level.clone(),
            current_mode: state.mode,
            is_sound_mode: state.sound_enabled,
            words_change_interval_in_ms: state.interval.as_millis_u64(),
        }
    }
}

impl From<PersistedConfig> for PlaybackState {
    fn from(config: PersistedConfig) -> Self {
        Self {
            cursor: config.current_index,
            language_to: config.current_language,
            language_from: config.current_from_language,
            level: config.current_level,
            mode: config.current_mode,
            interval: Duration::from_millis(config.words_change_interval_in_ms),
            sound_enabled: config.is_sound_mode,
        }
    }
}

impl PersistedConfig {
    /// Load from the default location, see [`PersistedConfig::load_from`]
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(&crate::paths::state_path())
    }

    /// Load persisted state. Never fails: a missing or unreadable file gives
    /// the defaults, and each missing or malformed field falls back on its own.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(fields)) => {
                    info!("Loaded playback state from {:?}", path);
                    Self::from_fields(&fields)
                }
                Ok(_) => {
                    warn!("Playback state at {:?} is not an object, using defaults", path);
                    Self::default()
                }
                Err(e) => {
                    warn!("Failed to parse playback state: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read playback state file: {}", e);
                Self::default()
            }
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            current_index: field(fields, "currentIndex").unwrap_or(defaults.current_index),
            current_language: field::<String>(fields, "currentLanguage")
                .filter(|code| !code.is_empty())
                .unwrap_or(defaults.current_language),
            current_from_language: field::<String>(fields, "currentFromLanguage")
                .filter(|code| !code.is_empty())
                .unwrap_or(defaults.current_from_language),
            current_level: field(fields, "currentLevel").unwrap_or(defaults.current_level),
            current_mode: field(fields, "currentMode").unwrap_or(defaults.current_mode),
            is_sound_mode: field(fields, "isSoundMode").unwrap_or(defaults.is_sound_mode),
            words_change_interval_in_ms: field::<u64>(fields, "WORDS_CHANGE_INTERVAL_IN_MS")
                .filter(|&ms| ms > 0)
                .unwrap_or(DEFAULT_INTERVAL.as_millis_u64()),
        }
    }

    /// Save to the default location, see [`PersistedConfig::save_to`]
    pub fn save(&self) {
        self.save_to(&crate::paths::state_path());
    }

    /// Write the state next to `path` and rename it into place. Failures are
    /// logged and otherwise ignored.
    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create playback state directory: {}", e);
                return;
            }
        }

        let content = match serde_json::to_string_pretty(self) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to serialize playback state: {}", e);
                return;
            }
        };

        let tmp_path = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp_path, content) {
            warn!("Failed to write playback state: {}", e);
            return;
        }
        if let Err(e) = fs::rename(&tmp_path, path) {
            warn!("Failed to move playback state into place: {}", e);
            let _ = fs::remove_file(&tmp_path);
        } else {
            info!("Saved playback state to {:?}", path);
        }
    }
}

fn field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key)?;
    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Ignoring malformed playback state field {}: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> PlaybackState {
        PlaybackState {
            cursor: 17,
            language_to: "fr".to_string(),
            language_from: "de".to_string(),
            level: Level::custom("verbs"),
            mode: Mode::Checkup,
            interval: Duration::from_millis(30_000),
            sound_enabled: true,
        }
    }

    #[test]
    fn test_defaults() {
        let config = PersistedConfig::default();
        assert_eq!(config.current_index, 0);
        assert_eq!(config.current_language, "de");
        assert_eq!(config.current_from_language, "en");
        assert_eq!(config.current_level, Level::A1);
        assert_eq!(config.current_mode, Mode::Window);
        assert!(!config.is_sound_mode);
        assert_eq!(config.words_change_interval_in_ms, 5000);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let state = sample_state();

        PersistedConfig::from(&state).save_to(&path);
        let restored = PlaybackState::from(PersistedConfig::load_from(&path));

        assert_eq!(restored, state);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_field_names() {
        let json = serde_json::to_value(PersistedConfig::from(&sample_state())).unwrap();
        assert_eq!(json["currentIndex"], 17);
        assert_eq!(json["currentLanguage"], "fr");
        assert_eq!(json["currentFromLanguage"], "de");
        assert_eq!(json["currentLevel"], "custom:verbs");
        assert_eq!(json["currentMode"], "Checkup");
        assert_eq!(json["isSoundMode"], true);
        assert_eq!(json["WORDS_CHANGE_INTERVAL_IN_MS"], 30_000);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PersistedConfig::load_from(&dir.path().join("absent.json"));
        assert_eq!(config, PersistedConfig::default());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{\"currentIndex\": 3,").unwrap();
        assert_eq!(PersistedConfig::load_from(&path), PersistedConfig::default());

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert_eq!(PersistedConfig::load_from(&path), PersistedConfig::default());
    }

    #[test]
    fn test_malformed_fields_fall_back_individually() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{
                "currentIndex": -4,
                "currentLanguage": "es",
                "currentLevel": "Z9",
                "currentMode": "Hologram",
                "isSoundMode": "yes",
                "WORDS_CHANGE_INTERVAL_IN_MS": 0
            }"#,
        )
        .unwrap();

        let config = PersistedConfig::load_from(&path);
        assert_eq!(config.current_index, 0);
        assert_eq!(config.current_language, "es");
        assert_eq!(config.current_from_language, "en");
        assert_eq!(config.current_level, Level::A1);
        assert_eq!(config.current_mode, Mode::Window);
        assert!(!config.is_sound_mode);
        assert_eq!(config.words_change_interval_in_ms, 5000);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        PersistedConfig::default().save_to(&path);
        let state = sample_state();
        PersistedConfig::from(&state).save_to(&path);

        assert_eq!(PlaybackState::from(PersistedConfig::load_from(&path)), state);
    }
}
