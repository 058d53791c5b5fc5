//! Stdin command parsing.

use crate::error::{ConsoleError, Result};
use std::path::PathBuf;
use std::time::Duration;
use vocabar_core::events::{KEY_ARROW_LEFT, KEY_ARROW_RIGHT};
use vocabar_core::{Command, Direction, KeyPress, Level, Mode, Shortcut, Theme};

pub const HELP: &str = "\
Commands:
  next | prev                     move one entry
  key shift+right|shift+left      key event from the window
  shortcut forward|backward       global shortcut (menu bar mode)
  mode window|menubar|checkup     switch presentation mode
  level A1..C1|custom:<name>      select a level
  lang <to> [<from>]              select the languages
  interval <ms>                   word change interval
  sound on|off|toggle             speech output
  theme light|dark                background
  import <file> <name>            import term-translation lines
  delete <name>                   delete a custom dictionary
  menu                            print the current menu
  help                            this text
  quit                            save and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// Read the file, then send [`Command::Import`]
    Import { path: PathBuf, name: String },
    Menu,
    Help,
}

/// Parse one stdin line. Blank lines give `None`.
///
/// # Errors
///
/// Returns [`ConsoleError::UnknownCommand`] or
/// [`ConsoleError::InvalidArguments`] for input that is not a command.
pub fn parse_line(line: &str) -> Result<Option<Input>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let input = match verb.to_ascii_lowercase().as_str() {
        "next" | "n" => Input::Command(Command::Advance(Direction::Forward)),
        "prev" | "p" => Input::Command(Command::Advance(Direction::Backward)),
        "key" => Input::Command(Command::Key(parse_key(single("key", &args)?))),
        "shortcut" => {
            let shortcut = match single("shortcut", &args)? {
                "forward" => Shortcut::Forward,
                "backward" => Shortcut::Backward,
                other => return Err(invalid("shortcut", format!("unknown shortcut {other}"))),
            };
            Input::Command(Command::Shortcut(shortcut))
        }
        "mode" => {
            let mode = match single("mode", &args)?.to_ascii_lowercase().as_str() {
                "window" => Mode::Window,
                "menubar" => Mode::MenuBar,
                "checkup" => Mode::Checkup,
                other => return Err(invalid("mode", format!("unknown mode {other}"))),
            };
            Input::Command(Command::SwitchMode(mode))
        }
        "level" => {
            let code = single("level", &args)?;
            let level = Level::parse(code)
                .or_else(|| Level::parse(&code.to_ascii_uppercase()))
                .ok_or_else(|| invalid("level", format!("unknown level {code}")))?;
            Input::Command(Command::SelectLevel(level))
        }
        "lang" => match args.as_slice() {
            [to] => Input::Command(Command::SelectLanguage((*to).to_string())),
            [to, from] => Input::Command(Command::SelectLanguages {
                to: (*to).to_string(),
                from: (*from).to_string(),
            }),
            _ => return Err(invalid("lang", "expected <to> [<from>]".to_string())),
        },
        "interval" => {
            let ms = single("interval", &args)?
                .parse::<u64>()
                .ok()
                .filter(|&ms| ms > 0)
                .ok_or_else(|| invalid("interval", "expected a positive number of ms".to_string()))?;
            Input::Command(Command::SetInterval(Duration::from_millis(ms)))
        }
        "sound" => {
            let command = match single("sound", &args)? {
                "on" => Command::SetSound(true),
                "off" => Command::SetSound(false),
                "toggle" => Command::ToggleSound,
                other => return Err(invalid("sound", format!("expected on|off|toggle, got {other}"))),
            };
            Input::Command(command)
        }
        "theme" => {
            let theme = match single("theme", &args)? {
                "light" => Theme::Light,
                "dark" => Theme::Dark,
                other => return Err(invalid("theme", format!("unknown theme {other}"))),
            };
            Input::Command(Command::SetTheme(theme))
        }
        "import" => match args.as_slice() {
            [] => Input::Command(Command::PromptImport),
            [path, name] => Input::Import {
                path: PathBuf::from(path),
                name: (*name).to_string(),
            },
            _ => return Err(invalid("import", "expected <file> <name>".to_string())),
        },
        "delete" => Input::Command(Command::Delete {
            name: single("delete", &args)?.to_string(),
        }),
        "menu" => Input::Menu,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Command(Command::Quit),
        _ => return Err(ConsoleError::UnknownCommand(verb.to_string())),
    };
    Ok(Some(input))
}

fn single<'a>(command: &'static str, args: &[&'a str]) -> Result<&'a str> {
    match args {
        [arg] => Ok(*arg),
        _ => Err(invalid(command, format!("expected one argument, got {}", args.len()))),
    }
}

fn parse_key(text: &str) -> KeyPress {
    let lower = text.to_ascii_lowercase();
    let (shift, key) = match lower.strip_prefix("shift+") {
        Some(key) => (true, key),
        None => (false, lower.as_str()),
    };
    let key = match key {
        "right" => KEY_ARROW_RIGHT.to_string(),
        "left" => KEY_ARROW_LEFT.to_string(),
        _ => text.rsplit('+').next().unwrap_or(text).to_string(),
    };
    KeyPress::new(shift, key)
}

fn invalid(command: &'static str, reason: String) -> ConsoleError {
    ConsoleError::InvalidArguments { command, reason }
}
