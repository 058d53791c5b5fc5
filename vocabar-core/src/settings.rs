use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// User-editable settings (config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub timing: TimingSettings,
    #[serde(default)]
    pub languages: LanguageSettings,
    #[serde(default)]
    pub dictionaries: DictionarySettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Delay before the translation is revealed in checkup mode
    #[serde(default = "default_checkup_reveal_delay")]
    pub checkup_reveal_delay_ms: u64,
    /// Delay before the translation is spoken outside checkup mode
    #[serde(default = "default_translation_speech_delay")]
    pub translation_speech_delay_ms: u64,
    /// Intervals offered in the menu
    #[serde(default = "default_interval_presets")]
    pub interval_presets_ms: Vec<u64>,
}

const fn default_checkup_reveal_delay() -> u64 {
    3000
}

const fn default_translation_speech_delay() -> u64 {
    2000
}

fn default_interval_presets() -> Vec<u64> {
    vec![2000, 5000, 10_000, 30_000, 60_000]
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            checkup_reveal_delay_ms: default_checkup_reveal_delay(),
            translation_speech_delay_ms: default_translation_speech_delay(),
            interval_presets_ms: default_interval_presets(),
        }
    }
}

impl TimingSettings {
    #[must_use]
    pub const fn checkup_reveal_delay(&self) -> Duration {
        Duration::from_millis(self.checkup_reveal_delay_ms)
    }

    #[must_use]
    pub const fn translation_speech_delay(&self) -> Duration {
        Duration::from_millis(self.translation_speech_delay_ms)
    }

    /// Non-zero presets as durations
    #[must_use]
    pub fn interval_presets(&self) -> Vec<Duration> {
        self.interval_presets_ms
            .iter()
            .filter(|&&ms| ms > 0)
            .map(|&ms| Duration::from_millis(ms))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageSettings {
    #[serde(default = "default_languages")]
    pub available: Vec<String>,
}

fn default_languages() -> Vec<String> {
    ["de", "en", "es", "fr", "ru"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            available: default_languages(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionarySettings {
    /// Root of the bundled dictionaries, defaults to ~/.config/vocabar/dictionaries
    #[serde(default)]
    pub bundled_dir: Option<PathBuf>,
}

impl DictionarySettings {
    #[must_use]
    pub fn bundled_dir(&self) -> PathBuf {
        self.bundled_dir
            .clone()
            .unwrap_or_else(crate::paths::bundled_dictionaries_dir)
    }
}

/// Background theme of the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const ALL: [Self; 2] = [Self::Light, Self::Dark];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub theme: Theme,
    /// Prefix phrases with their 1-based position
    #[serde(default = "default_true")]
    pub numbered: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            numbered: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub enabled: bool,
}

impl Settings {
    /// Get the config file path (~/.config/vocabar/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load settings, writing the template and returning defaults on first run
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written, or has a syntax error.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Same as [`Settings::load_or_create`] for an explicit path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written, or has a syntax error.
    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, SETTINGS_TEMPLATE)?;
            info!("Created settings template at {:?}", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse settings from TOML
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

const SETTINGS_TEMPLATE: &str = r#"# Vocabar Configuration
# ~/.config/vocabar/config.toml

[timing]
# Checkup mode: how long the term is shown alone before the translation appears
checkup_reveal_delay_ms = 3000
# Window and menu bar modes: delay between speaking the term and the translation
translation_speech_delay_ms = 2000
# Word change intervals offered in the menu
interval_presets_ms = [2000, 5000, 10000, 30000, 60000]

[languages]
# Language codes offered in the language menus
available = ["de", "en", "es", "fr", "ru"]

[dictionaries]
# Root of the bundled dictionaries (<root>/<language>/<from language>/<LEVEL>.json)
# bundled_dir = "/usr/share/vocabar/dictionaries"

[display]
# Background: "light" or "dark"
theme = "light"
# Prefix each phrase with its position in the dictionary
numbered = true

[logging]
# Also write logs to ~/.cache/vocabar/vocabar.log
enabled = false
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_template_parses_to_defaults() {
        let settings = Settings::parse(SETTINGS_TEMPLATE).unwrap();
        assert_eq!(settings.timing.checkup_reveal_delay_ms, 3000);
        assert_eq!(settings.timing.translation_speech_delay_ms, 2000);
        assert_eq!(settings.languages.available, default_languages());
        assert_eq!(settings.display.theme, Theme::Light);
        assert!(settings.display.numbered);
        assert!(!settings.logging.enabled);
        assert!(settings.dictionaries.bundled_dir.is_none());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings.timing.checkup_reveal_delay(), Duration::from_secs(3));
        assert_eq!(settings.timing.translation_speech_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_section() {
        let settings = Settings::parse("[display]\ntheme = \"dark\"\n").unwrap();
        assert_eq!(settings.display.theme, Theme::Dark);
        assert!(settings.display.numbered);
    }

    #[test]
    fn test_interval_presets_skip_zero() {
        let settings = Settings::parse("[timing]\ninterval_presets_ms = [0, 1500]\n").unwrap();
        assert_eq!(
            settings.timing.interval_presets(),
            vec![Duration::from_millis(1500)]
        );
    }

    #[test]
    fn test_syntax_error() {
        let result = Settings::parse("[timing\n");
        assert!(matches!(result, Err(CoreError::SettingsParse(_))));
    }

    #[test]
    fn test_load_or_create_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let settings = Settings::load_or_create_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(settings.timing.checkup_reveal_delay_ms, 3000);

        fs::write(&path, "[timing]\ncheckup_reveal_delay_ms = 100\n").unwrap();
        let reloaded = Settings::load_or_create_at(&path).unwrap();
        assert_eq!(reloaded.timing.checkup_reveal_delay_ms, 100);
    }
}
