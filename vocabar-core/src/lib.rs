pub mod coordinator;
pub mod dictionary;
pub mod error;
pub mod events;
pub mod menu;
pub mod paths;
pub mod persistence;
pub mod playback;
pub mod presenter;
pub mod settings;
pub mod time;
pub mod vocabulary;

pub use coordinator::{
    Capabilities, Coordinator, CoordinatorHandle, CoordinatorOptions, HostSurface,
    ShortcutRegistry, PRODUCT_NAME,
};
pub use dictionary::DictionaryStore;
pub use error::{CoreError, Result};
pub use events::{Command, KeyPress, PlaybackEvent, Shortcut};
pub use menu::{build_menu, Menu, MenuContext, MenuItem};
pub use paths::{
    config_dir, state_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, STATE_FILE_NAME,
};
pub use persistence::PersistedConfig;
pub use playback::{CursorPolicy, Direction, Mode, PhraseChange, Playback, PlaybackState};
pub use presenter::{run_presenter, DisplaySurface, PresentStep, Presenter, RevealTiming};
pub use settings::{Settings, Theme};
pub use time::DurationExt;
pub use vocabulary::{DictionaryDescriptor, Level, PhraseSet, VocabularyEntry};

/// Re-export toml error type for settings parse error handling
pub use toml::de::Error as TomlParseError;
