//! Commands accepted by the coordinator and notifications it broadcasts.

use crate::playback::{Direction, Mode, PhraseChange};
use crate::settings::Theme;
use crate::vocabulary::Level;
use std::time::Duration;

/// Key names as delivered by the display surface
pub const KEY_ARROW_RIGHT: &str = "ArrowRight";
pub const KEY_ARROW_LEFT: &str = "ArrowLeft";

/// Global navigation shortcuts, registered only in menu bar mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    Forward,
    Backward,
}

impl Shortcut {
    pub const ALL: [Self; 2] = [Self::Forward, Self::Backward];

    #[must_use]
    pub const fn accelerator(self) -> &'static str {
        match self {
            Self::Forward => "Shift+Right",
            Self::Backward => "Shift+Left",
        }
    }

    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Forward => Direction::Forward,
            Self::Backward => Direction::Backward,
        }
    }
}

/// Key event from a focused display surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub shift: bool,
    pub key: String,
}

impl KeyPress {
    #[must_use]
    pub fn new(shift: bool, key: impl Into<String>) -> Self {
        Self {
            shift,
            key: key.into(),
        }
    }

    /// Shift+ArrowRight / Shift+ArrowLeft navigate, everything else is ignored
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        if !self.shift {
            return None;
        }
        match self.key.as_str() {
            KEY_ARROW_RIGHT => Some(Direction::Forward),
            KEY_ARROW_LEFT => Some(Direction::Backward),
            _ => None,
        }
    }
}

/// Input to the coordinator loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Advance(Direction),
    /// Key event from the display surface (window/checkup modes)
    Key(KeyPress),
    /// Global shortcut fired (menu bar mode)
    Shortcut(Shortcut),
    SelectLanguage(String),
    SelectFromLanguage(String),
    /// Switch both languages in one load
    SelectLanguages { to: String, from: String },
    SelectLevel(Level),
    SwitchMode(Mode),
    SetInterval(Duration),
    SetSound(bool),
    ToggleSound,
    SetTheme(Theme),
    /// Ask the host to run its import UI
    PromptImport,
    /// Import text into a custom dictionary for the current language pair
    Import { raw_text: String, name: String },
    /// Delete a custom dictionary of the current language pair
    Delete { name: String },
    Quit,
}

/// Notifications broadcast to display surfaces
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    /// Cursor moved or a new set was loaded
    PhraseChanged(PhraseChange),
    BackgroundChanged { theme: Theme },
    SoundModeChanged { enabled: bool },
    /// Speech locales for the term and the translation
    LanguagesChanged {
        term_locale: String,
        translation_locale: String,
    },
    /// Drop pending reveal/speech steps
    TimersCleared,
    /// The loaded set has no entries, blank the display
    SetEmptied,
    Error { message: String },
}
