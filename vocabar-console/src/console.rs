//! Terminal stand-ins for the window, tray, shortcut and speech surfaces.

use std::fmt::Write as _;
use tokio::sync::watch;
use tracing::{info, warn};
use vocabar_core::{
    CoreError, DisplaySurface, HostSurface, Menu, MenuItem, Shortcut, ShortcutRegistry, Theme,
};

/// Window and tray host. Every call prints a tagged line.
pub struct ConsoleHost {
    menu_tx: watch::Sender<Menu>,
}

impl ConsoleHost {
    pub const fn new(menu_tx: watch::Sender<Menu>) -> Self {
        Self { menu_tx }
    }
}

impl HostSurface for ConsoleHost {
    fn show_window(&mut self) {
        println!("[window] shown");
    }

    fn hide_window(&mut self) {
        println!("[window] hidden");
    }

    fn set_tray_title(&mut self, title: &str) {
        println!("[tray] {title}");
    }

    fn set_menu(&mut self, menu: &Menu) {
        self.menu_tx.send_replace(menu.clone());
    }

    fn show_error(&mut self, title: &str, message: &str) {
        eprintln!("[error] {title}: {message}");
    }

    fn prompt_import(&mut self) {
        println!("[import] usage: import <file> <name>");
    }
}

/// Tracks the accelerators that would be claimed system-wide
#[derive(Debug, Default)]
pub struct ConsoleShortcuts {
    registered: Vec<Shortcut>,
}

impl ShortcutRegistry for ConsoleShortcuts {
    fn register(&mut self, shortcut: Shortcut) -> vocabar_core::Result<()> {
        if self.registered.contains(&shortcut) {
            return Err(CoreError::Shortcut {
                accelerator: shortcut.accelerator().to_string(),
                reason: "already registered".to_string(),
            });
        }
        info!("Registered global shortcut {}", shortcut.accelerator());
        self.registered.push(shortcut);
        Ok(())
    }

    fn unregister_all(&mut self) {
        if !self.registered.is_empty() {
            info!("Unregistered {} global shortcut(s)", self.registered.len());
        }
        self.registered.clear();
    }
}

/// Phrase display. Speech is printed rather than synthesized.
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl DisplaySurface for ConsoleDisplay {
    fn show_text(&mut self, text: &str) {
        println!("[show] {text}");
    }

    fn show_progress(&mut self, cursor: usize, total: usize) {
        if total == 0 {
            println!("[progress] empty");
        } else {
            println!("[progress] {}/{}", cursor + 1, total);
        }
    }

    fn speak(&mut self, text: &str, locale: &str) {
        println!("[speak {locale}] {text}");
    }

    fn set_theme(&mut self, theme: Theme) {
        println!("[background] {}", theme.label());
    }
}

/// Indented text rendering of a menu
pub fn render_menu(menu: &Menu) -> String {
    let mut out = String::new();
    render_items(&mut out, &menu.items, 0);
    out
}

fn render_items(out: &mut String, items: &[MenuItem], depth: usize) {
    let indent = "  ".repeat(depth);
    for item in items {
        let line = match item {
            MenuItem::Submenu {
                label, disabled, ..
            } => {
                if *disabled {
                    format!("{label} (empty)")
                } else {
                    format!("{label} >")
                }
            }
            MenuItem::Check { label, checked, .. } => {
                format!("[{}] {label}", if *checked { "x" } else { " " })
            }
            MenuItem::Action { label, .. } => label.clone(),
            MenuItem::Separator => "----".to_string(),
        };
        if writeln!(out, "{indent}{line}").is_err() {
            warn!("Failed to render menu");
            return;
        }
        if let MenuItem::Submenu { children, .. } = item {
            render_items(out, children, depth + 1);
        }
    }
}
