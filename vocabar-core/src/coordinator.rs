//! The coordinator loop owns playback state, the presentation mode, the tick
//! timer and every host side effect.
//!
//! Hosts talk to it through a [`CoordinatorHandle`]: commands go in over an
//! mpsc channel, [`PlaybackEvent`]s come out over a broadcast channel.
//! Dictionary I/O runs in spawned tasks whose completions are posted back on
//! the same channel, so the loop never blocks on the filesystem.

use crate::dictionary::{validate_name, DictionaryStore};
use crate::error::{CoreError, Result};
use crate::events::{Command, PlaybackEvent, Shortcut};
use crate::menu::{build_menu, Menu, MenuContext};
use crate::persistence::PersistedConfig;
use crate::playback::{
    CursorPolicy, Direction, LoadOutcome, LoadRequest, Mode, Playback, PlaybackState,
};
use crate::settings::{Settings, Theme};
use crate::time::sleep_until_deadline;
use crate::vocabulary::{speech_locale, DictionaryDescriptor, Level, PhraseSet};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Tray title outside menu bar mode
pub const PRODUCT_NAME: &str = "Vocabar";

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// What the host platform can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// A persistent tray/menu bar exists, enabling menu bar and checkup modes
    pub tray_modes: bool,
}

/// Window, tray and dialog side of the host
pub trait HostSurface: Send + 'static {
    fn show_window(&mut self);
    fn hide_window(&mut self);
    fn set_tray_title(&mut self, title: &str);
    /// Replace the whole menu
    fn set_menu(&mut self, menu: &Menu);
    /// Blocking error dialog
    fn show_error(&mut self, title: &str, message: &str);
    /// Run the host's import UI. The host answers with [`Command::Import`].
    fn prompt_import(&mut self) {}
}

/// Global keyboard shortcuts of the host
pub trait ShortcutRegistry: Send + 'static {
    /// Register a navigation shortcut
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Shortcut`] if the accelerator cannot be claimed.
    fn register(&mut self, shortcut: Shortcut) -> Result<()>;

    fn unregister_all(&mut self);
}

pub struct CoordinatorOptions {
    /// Restored (or default) playback state
    pub initial: PlaybackState,
    pub store: DictionaryStore,
    pub settings: Settings,
    pub capabilities: Capabilities,
    /// Where playback state is saved
    pub state_path: PathBuf,
}

#[derive(Debug)]
enum Message {
    Command(Command),
    Completion(Completion),
}

#[derive(Debug)]
enum Completion {
    Loaded {
        request: LoadRequest,
        result: Result<PhraseSet>,
    },
    Imported(Result<DictionaryDescriptor>),
    Deleted {
        descriptor: DictionaryDescriptor,
        result: Result<()>,
    },
    CustomListed {
        language_to: String,
        language_from: String,
        result: Result<Vec<String>>,
    },
}

/// Cloneable sender side of a running coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    message_tx: mpsc::UnboundedSender<Message>,
    event_tx: broadcast::Sender<PlaybackEvent>,
}

impl CoordinatorHandle {
    /// Queue a command. Returns false once the coordinator has stopped.
    #[must_use]
    pub fn send(&self, command: Command) -> bool {
        self.message_tx.send(Message::Command(command)).is_ok()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.event_tx.subscribe()
    }
}

pub struct Coordinator<H, R> {
    playback: Playback,
    store: DictionaryStore,
    settings: Settings,
    capabilities: Capabilities,
    state_path: PathBuf,
    interval_presets: Vec<Duration>,
    theme: Theme,
    custom_names: Vec<String>,
    host: H,
    shortcuts: R,
    event_tx: broadcast::Sender<PlaybackEvent>,
    message_tx: mpsc::UnboundedSender<Message>,
    message_rx: mpsc::UnboundedReceiver<Message>,
    tick_deadline: Option<Instant>,
    /// Startup load that may fall back to A1 when it fails
    fallback_request: Option<u64>,
    cancel_token: CancellationToken,
}

impl<H: HostSurface, R: ShortcutRegistry> Coordinator<H, R> {
    #[must_use]
    pub fn new(
        options: CoordinatorOptions,
        host: H,
        shortcuts: R,
        cancel_token: CancellationToken,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let interval_presets = options.settings.timing.interval_presets();
        let theme = options.settings.display.theme;

        Self {
            playback: Playback::new(options.initial),
            store: options.store,
            settings: options.settings,
            capabilities: options.capabilities,
            state_path: options.state_path,
            interval_presets,
            theme,
            custom_names: Vec::new(),
            host,
            shortcuts,
            event_tx,
            message_tx,
            message_rx,
            tick_deadline: None,
            fallback_request: None,
            cancel_token,
        }
    }

    #[must_use]
    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle {
            message_tx: self.message_tx.clone(),
            event_tx: self.event_tx.clone(),
        }
    }

    /// Subscribe to playback events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.event_tx.subscribe()
    }

    /// Run until `quit` or cancellation. Saves and returns the final state.
    pub async fn run(mut self) -> PlaybackState {
        info!(
            "Coordinator started ({} {}/{}, {:?} mode)",
            self.playback.state().level,
            self.playback.state().language_to,
            self.playback.state().language_from,
            self.playback.state().mode
        );
        self.start();

        let cancel_token = self.cancel_token.clone();
        loop {
            tokio::select! {
                biased;
                () = cancel_token.cancelled() => {
                    info!("Coordinator shutting down");
                    break;
                }
                () = sleep_until_deadline(self.tick_deadline) => self.on_tick(),
                message = self.message_rx.recv() => match message {
                    Some(Message::Command(command)) => self.handle_command(command),
                    Some(Message::Completion(completion)) => self.handle_completion(completion),
                    None => break,
                },
            }
        }

        self.shutdown()
    }

    fn start(&mut self) {
        let mode = self.playback.state().mode;
        if mode.requires_tray() && !self.capabilities.tray_modes {
            warn!("{:?} mode needs a tray, starting in window mode", mode);
            self.playback.set_mode(Mode::Window);
        }
        self.apply_mode_surface();

        self.emit(PlaybackEvent::SoundModeChanged {
            enabled: self.playback.state().sound_enabled,
        });
        self.emit_languages();
        self.emit(PlaybackEvent::BackgroundChanged { theme: self.theme });

        let descriptor = self.playback.state().descriptor();
        self.fallback_request = Some(self.request_load(descriptor, CursorPolicy::Preserve));
        self.refresh_custom_names();
        self.rebuild_menu();
    }

    fn shutdown(mut self) -> PlaybackState {
        self.tick_deadline = None;
        self.emit(PlaybackEvent::TimersCleared);
        self.shortcuts.unregister_all();
        self.save_state();
        self.cancel_token.cancel();
        info!("Coordinator stopped");
        self.playback.state().clone()
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Advance(direction) => self.navigate(direction),
            Command::Key(key) => match key.direction() {
                Some(direction) if self.playback.state().mode != Mode::MenuBar => {
                    self.navigate(direction);
                }
                _ => debug!("Ignoring key {:?}", key),
            },
            Command::Shortcut(shortcut) => {
                if self.playback.state().mode == Mode::MenuBar {
                    self.navigate(shortcut.direction());
                } else {
                    debug!("Ignoring shortcut {} outside menu bar mode", shortcut.accelerator());
                }
            }
            Command::SelectLanguage(language_to) => {
                let language_from = self.playback.target().language_from;
                self.select_languages(language_to, language_from);
            }
            Command::SelectFromLanguage(language_from) => {
                let language_to = self.playback.target().language_to;
                self.select_languages(language_to, language_from);
            }
            Command::SelectLanguages { to, from } => self.select_languages(to, from),
            Command::SelectLevel(level) => {
                let descriptor = self.playback.target().with_level(level);
                self.request_load(descriptor, CursorPolicy::Reset);
            }
            Command::SwitchMode(mode) => self.switch_mode(mode),
            Command::SetInterval(interval) => self.set_interval(interval),
            Command::SetSound(enabled) => self.set_sound(enabled),
            Command::ToggleSound => self.set_sound(!self.playback.state().sound_enabled),
            Command::SetTheme(theme) => {
                self.theme = theme;
                self.emit(PlaybackEvent::BackgroundChanged { theme });
                self.rebuild_menu();
            }
            Command::PromptImport => self.host.prompt_import(),
            Command::Import { raw_text, name } => self.import(raw_text, name),
            Command::Delete { name } => self.delete(&name),
            Command::Quit => {
                info!("Quit requested");
                self.cancel_token.cancel();
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Loaded { request, result } => self.on_loaded(&request, result),
            Completion::Imported(Ok(descriptor)) => {
                // Overwrote the set being shown or about to be shown
                if self.playback.is_targeted(&descriptor) {
                    let policy = self
                        .playback
                        .pending()
                        .map_or(CursorPolicy::Preserve, |request| request.policy);
                    self.request_load(descriptor, policy);
                }
                self.refresh_custom_names();
            }
            Completion::Imported(Err(e)) => self.report_error("Import failed", &e),
            Completion::Deleted {
                descriptor,
                result: Ok(()),
            } => {
                if self.playback.is_targeted(&descriptor) {
                    info!("Deleted the active dictionary {}, falling back to A1", descriptor);
                    self.playback.fall_back_to(Level::A1);
                    self.save_state();
                    let fallback = self.playback.state().descriptor();
                    self.request_load(fallback, CursorPolicy::Reset);
                }
                self.refresh_custom_names();
                self.rebuild_menu();
            }
            Completion::Deleted {
                result: Err(e), ..
            } => self.report_error("Delete failed", &e),
            Completion::CustomListed {
                language_to,
                language_from,
                result,
            } => {
                let state = self.playback.state();
                if state.language_to != language_to || state.language_from != language_from {
                    debug!("Discarding custom list for {}/{}", language_to, language_from);
                    return;
                }
                match result {
                    Ok(names) => {
                        self.custom_names = names;
                        self.rebuild_menu();
                    }
                    Err(e) => warn!("Failed to list custom dictionaries: {}", e),
                }
            }
        }
    }

    fn on_loaded(&mut self, request: &LoadRequest, result: Result<PhraseSet>) {
        let is_startup = self.fallback_request == Some(request.id);
        if is_startup {
            self.fallback_request = None;
        }

        let phrases = match result {
            Ok(phrases) => phrases,
            Err(e) => {
                if !self.playback.is_current(request) {
                    debug!("Ignoring failed stale load of {}", request.descriptor);
                    return;
                }
                self.playback.fail_load(request);
                self.report_error("Failed to load dictionary", &e);
                if is_startup && request.descriptor.level != Level::A1 {
                    warn!("Falling back to A1 for {}", request.descriptor);
                    self.request_load(request.descriptor.with_level(Level::A1), CursorPolicy::Reset);
                }
                return;
            }
        };

        let state = self.playback.state();
        let languages_changed = state.language_to != request.descriptor.language_to
            || state.language_from != request.descriptor.language_from;

        match self.playback.complete_load(request, phrases) {
            LoadOutcome::Stale => debug!("Discarding stale load of {}", request.descriptor),
            LoadOutcome::Applied => {
                info!(
                    "Loaded {} ({} entries)",
                    request.descriptor,
                    self.playback.total()
                );
                self.restart_timer();
                if languages_changed {
                    self.emit_languages();
                    self.refresh_custom_names();
                }
                if self.playback.has_entries() {
                    self.emit_phrase();
                } else {
                    warn!("{} has no entries", request.descriptor);
                    if self.playback.state().mode == Mode::MenuBar {
                        self.host.set_tray_title(PRODUCT_NAME);
                    }
                    self.emit(PlaybackEvent::TimersCleared);
                    self.emit(PlaybackEvent::SetEmptied);
                }
                self.rebuild_menu();
                self.save_state();
            }
        }
    }

    fn on_tick(&mut self) {
        self.tick_deadline = None;
        if self.playback.tick() {
            debug!("Tick to entry {}", self.playback.state().cursor);
            self.restart_timer();
            self.emit_phrase();
        }
    }

    /// Manual navigation. The tick is rescheduled before the render.
    fn navigate(&mut self, direction: Direction) {
        if !self.playback.advance(direction) {
            debug!("Nothing loaded to navigate");
            return;
        }
        debug!("Navigated {:?} to entry {}", direction, self.playback.state().cursor);
        self.restart_timer();
        self.emit_phrase();
    }

    fn select_languages(&mut self, language_to: String, language_from: String) {
        // Custom sets belong to one pair
        let level = match self.playback.target().level {
            Level::Custom(_) => Level::A1,
            standard => standard,
        };
        let descriptor = DictionaryDescriptor::new(language_to, language_from, level);
        self.request_load(descriptor, CursorPolicy::Reset);
    }

    fn switch_mode(&mut self, mode: Mode) {
        if mode.requires_tray() && !self.capabilities.tray_modes {
            warn!("{:?} mode is not available without a tray", mode);
            return;
        }
        let previous = self.playback.state().mode;
        if previous == mode {
            return;
        }

        info!("Switching mode {:?} -> {:?}", previous, mode);
        self.playback.set_mode(mode);
        self.emit(PlaybackEvent::TimersCleared);
        self.apply_mode_surface();
        self.restart_timer();
        self.emit_phrase();
        self.rebuild_menu();
        self.save_state();
    }

    /// Show or hide the window, re-register shortcuts and set the tray title
    fn apply_mode_surface(&mut self) {
        self.shortcuts.unregister_all();

        match self.playback.state().mode {
            Mode::Window | Mode::Checkup => {
                self.host.show_window();
                self.host.set_tray_title(PRODUCT_NAME);
            }
            Mode::MenuBar => {
                self.host.hide_window();
                for shortcut in Shortcut::ALL {
                    if let Err(e) = self.shortcuts.register(shortcut) {
                        warn!("{}", e);
                    }
                }
                let title = self
                    .playback
                    .phrase_change(self.settings.display.numbered)
                    .map_or_else(|| PRODUCT_NAME.to_string(), |change| change.phrase());
                self.host.set_tray_title(&title);
            }
        }
    }

    fn set_interval(&mut self, interval: Duration) {
        if interval.is_zero() {
            warn!("Ignoring zero interval");
            return;
        }
        info!("Interval set to {:?}", interval);
        self.playback.set_interval(interval);
        self.restart_timer();
        self.rebuild_menu();
        self.save_state();
    }

    fn set_sound(&mut self, enabled: bool) {
        self.playback.set_sound(enabled);
        self.emit(PlaybackEvent::SoundModeChanged { enabled });
        self.rebuild_menu();
        self.save_state();
    }

    fn import(&self, raw_text: String, name: String) {
        let state = self.playback.state();
        let language_to = state.language_to.clone();
        let language_from = state.language_from.clone();
        let store = self.store.clone();
        self.spawn_completion(async move {
            Completion::Imported(
                store
                    .import(&raw_text, &name, &language_to, &language_from)
                    .await,
            )
        });
    }

    fn delete(&mut self, name: &str) {
        let name = match validate_name(name) {
            Ok(name) => name.to_string(),
            Err(e) => {
                self.report_error("Delete failed", &e);
                return;
            }
        };
        let state = self.playback.state();
        let descriptor =
            DictionaryDescriptor::new(&state.language_to, &state.language_from, Level::custom(name));
        let store = self.store.clone();
        self.spawn_completion(async move {
            let result = store.delete(&descriptor).await;
            Completion::Deleted { descriptor, result }
        });
    }

    fn request_load(&mut self, descriptor: DictionaryDescriptor, policy: CursorPolicy) -> u64 {
        let request = self.playback.begin_load(descriptor, policy);
        let id = request.id;
        debug!("Loading {} (request {})", request.descriptor, id);

        let store = self.store.clone();
        self.spawn_completion(async move {
            let result = store.load_descriptor(&request.descriptor).await;
            Completion::Loaded { request, result }
        });
        id
    }

    fn refresh_custom_names(&self) {
        let state = self.playback.state();
        let language_to = state.language_to.clone();
        let language_from = state.language_from.clone();
        let store = self.store.clone();
        self.spawn_completion(async move {
            let result = store.list_custom(&language_to, &language_from).await;
            Completion::CustomListed {
                language_to,
                language_from,
                result,
            }
        });
    }

    fn spawn_completion<F>(&self, task: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let message_tx = self.message_tx.clone();
        tokio::spawn(async move {
            let completion = task.await;
            // The loop may already be gone during shutdown
            let _ = message_tx.send(Message::Completion(completion));
        });
    }

    fn restart_timer(&mut self) {
        self.tick_deadline = self
            .playback
            .has_entries()
            .then(|| Instant::now() + self.playback.state().interval);
    }

    fn emit_phrase(&mut self) {
        let Some(change) = self.playback.phrase_change(self.settings.display.numbered) else {
            return;
        };
        if change.mode == Mode::MenuBar {
            self.host.set_tray_title(&change.phrase());
        }
        self.emit(PlaybackEvent::PhraseChanged(change));
    }

    fn emit_languages(&self) {
        let state = self.playback.state();
        self.emit(PlaybackEvent::LanguagesChanged {
            term_locale: speech_locale(&state.language_from).to_string(),
            translation_locale: speech_locale(&state.language_to).to_string(),
        });
    }

    fn emit(&self, event: PlaybackEvent) {
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }

    fn rebuild_menu(&mut self) {
        let menu = build_menu(&MenuContext {
            state: self.playback.state(),
            languages: &self.settings.languages.available,
            custom_names: &self.custom_names,
            interval_presets: &self.interval_presets,
            theme: self.theme,
            tray_modes: self.capabilities.tray_modes,
        });
        self.host.set_menu(&menu);
    }

    fn report_error(&mut self, title: &str, e: &CoreError) {
        error!("{}: {}", title, e);
        let message = e.to_string();
        self.host.show_error(title, &message);
        self.emit(PlaybackEvent::Error { message });
    }

    fn save_state(&self) {
        PersistedConfig::from(self.playback.state()).save_to(&self.state_path);
    }
}
