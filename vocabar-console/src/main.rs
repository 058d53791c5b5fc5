mod commands;
mod console;
mod error;

use commands::{parse_line, Input, HELP};
use console::{render_menu, ConsoleDisplay, ConsoleHost, ConsoleShortcuts};
use error::ConsoleError;
use std::fs::File;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vocabar_core::{
    paths, run_presenter, Capabilities, Command, CoordinatorHandle, CoordinatorOptions, CoreError,
    DictionaryStore, Menu, PersistedConfig, PlaybackEvent, PlaybackState, Presenter, RevealTiming,
    Settings,
};

/// Our crates at info, dependencies only when they warn
const DEFAULT_LOG_FILTER: &str = "warn,vocabar=info,vocabar_core=info";

/// Blocking stdin reads are abandoned after this on shutdown
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

fn main() {
    // Settings decide whether to log to a file, so they load before tracing
    let loaded = Settings::load_or_create();
    init_tracing(loaded.as_ref().is_ok_and(|settings| settings.logging.enabled));

    let settings = match loaded {
        Ok(settings) => settings,
        Err(CoreError::SettingsParse(e)) => {
            error!(
                "Settings file {} has errors, using defaults: {e}",
                Settings::config_path().display()
            );
            Settings::default()
        }
        Err(e) => {
            error!("Failed to load settings, using defaults: {e}");
            Settings::default()
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    // Create shared cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    let initial = PlaybackState::from(PersistedConfig::load());
    let store = DictionaryStore::from_settings(&settings.dictionaries);
    info!(
        "Dictionaries: bundled {}, custom {}",
        settings.dictionaries.bundled_dir().display(),
        store.custom_root().display()
    );
    let presenter = Presenter::new(RevealTiming::from(&settings.timing));
    let (menu_tx, menu_rx) = watch::channel(Menu::default());

    let coordinator = vocabar_core::Coordinator::new(
        CoordinatorOptions {
            initial,
            store,
            settings,
            capabilities: Capabilities { tray_modes: true },
            state_path: paths::state_path(),
        },
        ConsoleHost::new(menu_tx),
        ConsoleShortcuts::default(),
        cancel_token.clone(),
    );

    let handle = coordinator.handle();
    let presenter_rx = coordinator.subscribe();
    let log_rx = coordinator.subscribe();

    runtime.block_on(async {
        let presenter_task = tokio::spawn(run_presenter(
            presenter_rx,
            ConsoleDisplay,
            presenter,
            cancel_token.clone(),
        ));
        tokio::spawn(log_playback_events(log_rx));
        tokio::spawn(read_commands(handle, menu_rx, cancel_token.clone()));

        let state = coordinator.run().await;
        let _ = presenter_task.await;
        info!(
            "Stopped at entry {} of {} {}/{}",
            state.cursor + 1,
            state.level,
            state.language_to,
            state.language_from
        );
    });

    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
}

/// Forward stdin lines to the coordinator until cancelled or stdin closes
async fn read_commands(
    handle: CoordinatorHandle,
    menu_rx: watch::Receiver<Menu>,
    cancel_token: CancellationToken,
) {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            () = cancel_token.cancelled() => break,
            line = lines.next_line() => line,
        };

        match line {
            Ok(Some(line)) => {
                if !dispatch(&handle, &menu_rx, &line).await {
                    break;
                }
            }
            Ok(None) => {
                info!("Stdin closed, quitting");
                let _ = handle.send(Command::Quit);
                break;
            }
            Err(e) => {
                error!("{}", ConsoleError::Stdin(e));
                let _ = handle.send(Command::Quit);
                break;
            }
        }
    }
}

/// Returns false once the coordinator is gone
async fn dispatch(handle: &CoordinatorHandle, menu_rx: &watch::Receiver<Menu>, line: &str) -> bool {
    let input = match parse_line(line) {
        Ok(Some(input)) => input,
        Ok(None) => return true,
        Err(e) => {
            println!("{e}");
            return true;
        }
    };

    match input {
        Input::Command(command) => handle.send(command),
        Input::Import { path, name } => match tokio::fs::read_to_string(&path).await {
            Ok(raw_text) => handle.send(Command::Import { raw_text, name }),
            Err(source) => {
                let e = ConsoleError::ImportRead { path, source };
                warn!("{e}");
                println!("{e}");
                true
            }
        },
        Input::Menu => {
            print!("{}", render_menu(&menu_rx.borrow()));
            true
        }
        Input::Help => {
            println!("{HELP}");
            true
        }
    }
}

/// Log playback events at debug level
async fn log_playback_events(mut rx: broadcast::Receiver<PlaybackEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match &event {
                PlaybackEvent::PhraseChanged(change) => {
                    debug!(
                        "[Event] Phrase {}/{} ({:?}): {}",
                        change.cursor + 1,
                        change.total,
                        change.mode,
                        change.phrase()
                    );
                }
                PlaybackEvent::Error { message } => {
                    debug!("[Event] Error: {}", message);
                }
                other => debug!("[Event] {:?}", other),
            },
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Event logger lagged by {} events", n);
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("Event channel closed, stopping logger");
                break;
            }
        }
    }
}

/// Console logging, plus a plain-text log file when settings enable it
fn init_tracing(file_logging_enabled: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let file_layer = file_logging_enabled.then(open_log_file).flatten().map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(Arc::new(file))
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();
}

/// Truncates the previous run's log. Tracing is not up yet, so failures go to stderr.
fn open_log_file() -> Option<File> {
    let log_path = paths::log_file_path();
    if let Some(parent) = log_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Cannot create log directory {}: {e}", parent.display());
            return None;
        }
    }

    File::create(&log_path)
        .map_err(|e| eprintln!("Logging to console only, {} is not writable: {e}", log_path.display()))
        .ok()
}
