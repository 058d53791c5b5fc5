//! Menu description derived from playback state.
//!
//! The host renders whatever [`build_menu`] returns; nothing is mutated in
//! place, so the menu can never drift from the state it was built from.

use crate::events::Command;
use crate::playback::{Mode, PlaybackState};
use crate::settings::Theme;
use crate::time::DurationExt;
use crate::vocabulary::{language_name, Level};
use std::time::Duration;

pub const LANGUAGE_MENU: &str = "Language";
pub const FROM_LANGUAGE_MENU: &str = "From Language";
pub const LEVEL_MENU: &str = "Level";
pub const MODE_MENU: &str = "Mode";
pub const INTERVAL_MENU: &str = "Interval";
pub const BACKGROUND_MENU: &str = "Background";
pub const DELETE_MENU: &str = "Delete Dictionary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Submenu {
        label: String,
        children: Vec<MenuItem>,
        disabled: bool,
    },
    Check {
        label: String,
        checked: bool,
        command: Command,
    },
    Action {
        label: String,
        command: Command,
    },
    Separator,
}

impl MenuItem {
    fn check(label: impl Into<String>, checked: bool, command: Command) -> Self {
        Self::Check {
            label: label.into(),
            checked,
            command,
        }
    }

    fn action(label: impl Into<String>, command: Command) -> Self {
        Self::Action {
            label: label.into(),
            command,
        }
    }

    fn submenu(label: impl Into<String>, children: Vec<Self>) -> Self {
        let disabled = children.is_empty();
        Self::Submenu {
            label: label.into(),
            children,
            disabled,
        }
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Submenu { label, .. } | Self::Check { label, .. } | Self::Action { label, .. } => {
                Some(label)
            }
            Self::Separator => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub items: Vec<MenuItem>,
}

impl Menu {
    /// Children of the top-level submenu named `label`
    #[must_use]
    pub fn submenu(&self, label: &str) -> Option<&[MenuItem]> {
        self.items.iter().find_map(|item| match item {
            MenuItem::Submenu {
                label: l, children, ..
            } if l == label => Some(children.as_slice()),
            _ => None,
        })
    }

    /// Label of the checked item in a top-level submenu
    #[must_use]
    pub fn checked_in(&self, label: &str) -> Option<&str> {
        self.submenu(label)?.iter().find_map(|item| match item {
            MenuItem::Check {
                label,
                checked: true,
                ..
            } => Some(label.as_str()),
            _ => None,
        })
    }
}

/// Everything the menu reflects
#[derive(Debug, Clone, Copy)]
pub struct MenuContext<'a> {
    pub state: &'a PlaybackState,
    pub languages: &'a [String],
    pub custom_names: &'a [String],
    pub interval_presets: &'a [Duration],
    pub theme: Theme,
    /// Host has a persistent tray, so menu bar and checkup modes are offered
    pub tray_modes: bool,
}

#[must_use]
pub fn build_menu(ctx: &MenuContext<'_>) -> Menu {
    let state = ctx.state;
    let mut items = Vec::new();

    let languages = ctx
        .languages
        .iter()
        .map(|code| {
            MenuItem::check(
                language_name(code),
                *code == state.language_to,
                Command::SelectLanguage(code.clone()),
            )
        })
        .collect();
    items.push(MenuItem::submenu(LANGUAGE_MENU, languages));

    let from_languages = ctx
        .languages
        .iter()
        .map(|code| {
            MenuItem::check(
                language_name(code),
                *code == state.language_from,
                Command::SelectFromLanguage(code.clone()),
            )
        })
        .collect();
    items.push(MenuItem::submenu(FROM_LANGUAGE_MENU, from_languages));

    let mut levels: Vec<MenuItem> = Level::STANDARD
        .iter()
        .map(|level| level_item(level.clone(), state))
        .collect();
    if !ctx.custom_names.is_empty() {
        levels.push(MenuItem::Separator);
        levels.extend(
            ctx.custom_names
                .iter()
                .map(|name| level_item(Level::custom(name.as_str()), state)),
        );
    }
    items.push(MenuItem::submenu(LEVEL_MENU, levels));

    if ctx.tray_modes {
        let modes = Mode::ALL
            .iter()
            .map(|&mode| MenuItem::check(mode.label(), mode == state.mode, Command::SwitchMode(mode)))
            .collect();
        items.push(MenuItem::submenu(MODE_MENU, modes));
    }

    let intervals = ctx
        .interval_presets
        .iter()
        .map(|&interval| {
            MenuItem::check(
                interval.interval_label(),
                interval == state.interval,
                Command::SetInterval(interval),
            )
        })
        .collect();
    items.push(MenuItem::submenu(INTERVAL_MENU, intervals));

    items.push(MenuItem::check("Sound", state.sound_enabled, Command::ToggleSound));

    let themes = Theme::ALL
        .iter()
        .map(|&theme| MenuItem::check(theme.label(), theme == ctx.theme, Command::SetTheme(theme)))
        .collect();
    items.push(MenuItem::submenu(BACKGROUND_MENU, themes));

    items.push(MenuItem::Separator);
    items.push(MenuItem::action("Import Dictionary...", Command::PromptImport));

    let deletions = ctx
        .custom_names
        .iter()
        .map(|name| MenuItem::action(name.as_str(), Command::Delete { name: name.clone() }))
        .collect();
    items.push(MenuItem::submenu(DELETE_MENU, deletions));

    items.push(MenuItem::Separator);
    items.push(MenuItem::action("Quit", Command::Quit));

    Menu { items }
}

fn level_item(level: Level, state: &PlaybackState) -> MenuItem {
    let checked = level == state.level;
    let label = level.label().to_string();
    MenuItem::check(label, checked, Command::SelectLevel(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        state: PlaybackState,
        languages: Vec<String>,
        custom_names: Vec<String>,
        presets: Vec<Duration>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: PlaybackState::default(),
                languages: vec!["de".into(), "en".into(), "fr".into()],
                custom_names: vec!["animals".into()],
                presets: vec![Duration::from_secs(2), Duration::from_secs(5)],
            }
        }

        fn build(&self, tray_modes: bool) -> Menu {
            build_menu(&MenuContext {
                state: &self.state,
                languages: &self.languages,
                custom_names: &self.custom_names,
                interval_presets: &self.presets,
                theme: Theme::Dark,
                tray_modes,
            })
        }
    }

    #[test]
    fn test_checked_items_reflect_state() {
        let fixture = Fixture::new();
        let menu = fixture.build(true);

        assert_eq!(menu.checked_in(LANGUAGE_MENU), Some("German"));
        assert_eq!(menu.checked_in(FROM_LANGUAGE_MENU), Some("English"));
        assert_eq!(menu.checked_in(LEVEL_MENU), Some("A1"));
        assert_eq!(menu.checked_in(MODE_MENU), Some("Window"));
        assert_eq!(menu.checked_in(INTERVAL_MENU), Some("5 seconds"));
        assert_eq!(menu.checked_in(BACKGROUND_MENU), Some("Dark"));
    }

    #[test]
    fn test_custom_levels_listed_after_standard() {
        let mut fixture = Fixture::new();
        fixture.state.level = Level::custom("animals");
        let menu = fixture.build(true);

        let labels: Vec<_> = menu
            .submenu(LEVEL_MENU)
            .unwrap()
            .iter()
            .map(MenuItem::label)
            .collect();
        assert_eq!(
            labels,
            vec![
                Some("A1"),
                Some("A2"),
                Some("B1"),
                Some("B2"),
                Some("C1"),
                None,
                Some("animals")
            ]
        );
        assert_eq!(menu.checked_in(LEVEL_MENU), Some("animals"));
    }

    #[test]
    fn test_level_items_select_their_level() {
        let fixture = Fixture::new();
        let menu = fixture.build(true);
        let levels = menu.submenu(LEVEL_MENU).unwrap();

        assert_eq!(
            levels.last(),
            Some(&MenuItem::Check {
                label: "animals".into(),
                checked: false,
                command: Command::SelectLevel(Level::custom("animals")),
            })
        );
        assert_eq!(
            levels.first(),
            Some(&MenuItem::Check {
                label: "A1".into(),
                checked: true,
                command: Command::SelectLevel(Level::A1),
            })
        );
    }

    #[test]
    fn test_mode_menu_requires_tray_capability() {
        let fixture = Fixture::new();
        assert!(fixture.build(true).submenu(MODE_MENU).is_some());
        assert!(fixture.build(false).submenu(MODE_MENU).is_none());
    }

    #[test]
    fn test_delete_menu_disabled_without_custom_sets() {
        let mut fixture = Fixture::new();
        fixture.custom_names.clear();
        let menu = fixture.build(true);

        let delete = menu
            .items
            .iter()
            .find(|item| item.label() == Some(DELETE_MENU))
            .unwrap();
        assert!(matches!(delete, MenuItem::Submenu { disabled: true, .. }));
    }

    #[test]
    fn test_delete_items_carry_command() {
        let fixture = Fixture::new();
        let menu = fixture.build(true);
        let items = menu.submenu(DELETE_MENU).unwrap();
        assert_eq!(
            items,
            &[MenuItem::Action {
                label: "animals".into(),
                command: Command::Delete {
                    name: "animals".into()
                },
            }]
        );
    }

    #[test]
    fn test_menu_rebuilds_from_new_state() {
        let mut fixture = Fixture::new();
        fixture.state.sound_enabled = true;
        fixture.state.mode = Mode::MenuBar;
        let menu = fixture.build(true);

        assert_eq!(menu.checked_in(MODE_MENU), Some("Menu Bar"));
        assert!(menu.items.contains(&MenuItem::Check {
            label: "Sound".into(),
            checked: true,
            command: Command::ToggleSound,
        }));
        assert_eq!(
            menu.items.last(),
            Some(&MenuItem::Action {
                label: "Quit".into(),
                command: Command::Quit
            })
        );
    }
}
