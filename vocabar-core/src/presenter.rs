//! Turns phrase notifications into timed render and speech steps.
//!
//! Checkup mode shows the term alone and reveals the translation after
//! `checkup_reveal_delay`. Other modes show the full pair at once and speak
//! the translation after `translation_speech_delay`. At most one delayed step
//! is pending; a new phrase replaces it.

use crate::events::PlaybackEvent;
use crate::playback::{Mode, PhraseChange};
use crate::settings::{Theme, TimingSettings};
use crate::time::sleep_until_deadline;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Rendering side of the display surface
pub trait DisplaySurface: Send {
    fn show_text(&mut self, text: &str);
    fn show_progress(&mut self, cursor: usize, total: usize);
    /// Fire-and-forget speech output
    fn speak(&mut self, text: &str, locale: &str);
    fn set_theme(&mut self, theme: Theme);
}

/// One thing the display surface should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentStep {
    Show(String),
    Progress { cursor: usize, total: usize },
    Speak { text: String, locale: String },
}

impl PresentStep {
    fn apply<S: DisplaySurface + ?Sized>(&self, surface: &mut S) {
        match self {
            Self::Show(text) => surface.show_text(text),
            Self::Progress { cursor, total } => surface.show_progress(*cursor, *total),
            Self::Speak { text, locale } => surface.speak(text, locale),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTiming {
    pub checkup_reveal_delay: Duration,
    pub translation_speech_delay: Duration,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self::from(&TimingSettings::default())
    }
}

impl From<&TimingSettings> for RevealTiming {
    fn from(settings: &TimingSettings) -> Self {
        Self {
            checkup_reveal_delay: settings.checkup_reveal_delay(),
            translation_speech_delay: settings.translation_speech_delay(),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingStep {
    deadline: Instant,
    steps: Vec<PresentStep>,
}

#[derive(Debug, Clone)]
pub struct Presenter {
    timing: RevealTiming,
    sound_enabled: bool,
    term_locale: String,
    translation_locale: String,
    pending: Option<PendingStep>,
}

impl Presenter {
    #[must_use]
    pub fn new(timing: RevealTiming) -> Self {
        Self {
            timing,
            sound_enabled: false,
            term_locale: "en-US".to_string(),
            translation_locale: "de-DE".to_string(),
            pending: None,
        }
    }

    pub fn set_sound(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    pub fn set_locales(&mut self, term_locale: impl Into<String>, translation_locale: impl Into<String>) {
        self.term_locale = term_locale.into();
        self.translation_locale = translation_locale.into();
    }

    /// Steps to run immediately for a new phrase. Replaces any pending step.
    pub fn phrase_changed(&mut self, change: &PhraseChange, now: Instant) -> Vec<PresentStep> {
        self.pending = None;

        let progress = PresentStep::Progress {
            cursor: change.cursor,
            total: change.total,
        };
        let speak_term = self.speak(&change.entry.term, &self.term_locale);
        let speak_translation = self.speak(&change.entry.translation, &self.translation_locale);

        if change.mode == Mode::Checkup {
            self.pending = Some(PendingStep {
                deadline: now + self.timing.checkup_reveal_delay,
                steps: [Some(PresentStep::Show(change.phrase())), speak_translation]
                    .into_iter()
                    .flatten()
                    .collect(),
            });
            [Some(PresentStep::Show(change.prompt())), Some(progress), speak_term]
                .into_iter()
                .flatten()
                .collect()
        } else {
            if let Some(speak_translation) = speak_translation {
                self.pending = Some(PendingStep {
                    deadline: now + self.timing.translation_speech_delay,
                    steps: vec![speak_translation],
                });
            }
            [Some(PresentStep::Show(change.phrase())), Some(progress), speak_term]
                .into_iter()
                .flatten()
                .collect()
        }
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Take the pending steps if their deadline has passed
    pub fn fire_due(&mut self, now: Instant) -> Vec<PresentStep> {
        match self.pending.take() {
            Some(pending) if pending.deadline <= now => pending.steps,
            not_due => {
                self.pending = not_due;
                Vec::new()
            }
        }
    }

    /// Drop any pending step
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Steps that blank the surface when a set has nothing to show
    pub fn set_emptied(&mut self) -> Vec<PresentStep> {
        self.pending = None;
        vec![
            PresentStep::Show(String::new()),
            PresentStep::Progress {
                cursor: 0,
                total: 0,
            },
        ]
    }

    fn speak(&self, text: &str, locale: &str) -> Option<PresentStep> {
        self.sound_enabled.then(|| PresentStep::Speak {
            text: text.to_string(),
            locale: locale.to_string(),
        })
    }
}

/// Drive a display surface from broadcast notifications until cancelled
pub async fn run_presenter<S: DisplaySurface>(
    mut rx: broadcast::Receiver<PlaybackEvent>,
    mut surface: S,
    mut presenter: Presenter,
    cancel_token: CancellationToken,
) {
    info!("Presenter started");

    loop {
        let deadline = presenter.next_deadline();
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!("Presenter shutting down");
                break;
            }
            () = sleep_until_deadline(deadline) => {
                for step in presenter.fire_due(Instant::now()) {
                    step.apply(&mut surface);
                }
            }
            event = rx.recv() => {
                match event {
                    Ok(event) => handle_event(&mut presenter, &mut surface, event),
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Playback event channel closed");
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Missed {} playback events", n);
                    }
                }
            }
        }
    }
}

fn handle_event<S: DisplaySurface>(presenter: &mut Presenter, surface: &mut S, event: PlaybackEvent) {
    match event {
        PlaybackEvent::PhraseChanged(change) => {
            debug!("Presenting entry {}/{}", change.cursor + 1, change.total);
            for step in presenter.phrase_changed(&change, Instant::now()) {
                step.apply(surface);
            }
        }
        PlaybackEvent::BackgroundChanged { theme } => surface.set_theme(theme),
        PlaybackEvent::SoundModeChanged { enabled } => presenter.set_sound(enabled),
        PlaybackEvent::LanguagesChanged {
            term_locale,
            translation_locale,
        } => presenter.set_locales(term_locale, translation_locale),
        PlaybackEvent::TimersCleared => presenter.clear(),
        PlaybackEvent::SetEmptied => {
            for step in presenter.set_emptied() {
                step.apply(surface);
            }
        }
        PlaybackEvent::Error { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::VocabularyEntry;
    use std::sync::{Arc, Mutex};

    fn change(mode: Mode, cursor: usize) -> PhraseChange {
        PhraseChange {
            entry: VocabularyEntry::new(format!("dog{cursor}"), format!("Hund{cursor}")),
            cursor,
            total: 10,
            mode,
            numbered: false,
        }
    }

    fn presenter(sound: bool) -> Presenter {
        let mut presenter = Presenter::new(RevealTiming::default());
        presenter.set_sound(sound);
        presenter.set_locales("en-US", "de-DE");
        presenter
    }

    #[test]
    fn test_checkup_shows_term_then_reveals() {
        let mut presenter = presenter(false);
        let start = Instant::now();

        let now_steps = presenter.phrase_changed(&change(Mode::Checkup, 0), start);
        assert_eq!(
            now_steps,
            vec![
                PresentStep::Show("dog0".into()),
                PresentStep::Progress { cursor: 0, total: 10 }
            ]
        );
        assert_eq!(presenter.next_deadline(), Some(start + Duration::from_secs(3)));

        assert!(presenter.fire_due(start + Duration::from_millis(2999)).is_empty());
        assert_eq!(
            presenter.fire_due(start + Duration::from_secs(3)),
            vec![PresentStep::Show("dog0 - Hund0".into())]
        );
        assert!(presenter.next_deadline().is_none());
    }

    #[test]
    fn test_checkup_speaks_term_then_translation() {
        let mut presenter = presenter(true);
        let start = Instant::now();

        let now_steps = presenter.phrase_changed(&change(Mode::Checkup, 1), start);
        assert!(now_steps.contains(&PresentStep::Speak {
            text: "dog1".into(),
            locale: "en-US".into()
        }));

        let revealed = presenter.fire_due(start + Duration::from_secs(3));
        assert_eq!(
            revealed,
            vec![
                PresentStep::Show("dog1 - Hund1".into()),
                PresentStep::Speak {
                    text: "Hund1".into(),
                    locale: "de-DE".into()
                }
            ]
        );
    }

    #[test]
    fn test_new_phrase_cancels_pending_reveal() {
        let mut presenter = presenter(false);
        let start = Instant::now();

        presenter.phrase_changed(&change(Mode::Checkup, 0), start);
        let second = start + Duration::from_secs(1);
        presenter.phrase_changed(&change(Mode::Checkup, 1), second);

        // The first reveal would have been due here
        assert!(presenter.fire_due(start + Duration::from_secs(3)).is_empty());
        assert_eq!(
            presenter.fire_due(second + Duration::from_secs(3)),
            vec![PresentStep::Show("dog1 - Hund1".into())]
        );
    }

    #[test]
    fn test_empty_set_blanks_display_and_drops_reveal() {
        let mut presenter = presenter(false);
        let start = Instant::now();
        presenter.phrase_changed(&change(Mode::Checkup, 0), start);

        assert_eq!(
            presenter.set_emptied(),
            vec![
                PresentStep::Show(String::new()),
                PresentStep::Progress { cursor: 0, total: 0 }
            ]
        );
        assert!(presenter.next_deadline().is_none());
        assert!(presenter.fire_due(start + Duration::from_secs(3)).is_empty());
    }

    #[test]
    fn test_window_mode_shows_full_pair_immediately() {
        let mut presenter = presenter(true);
        let start = Instant::now();

        let now_steps = presenter.phrase_changed(&change(Mode::Window, 2), start);
        assert_eq!(now_steps[0], PresentStep::Show("dog2 - Hund2".into()));
        assert_eq!(presenter.next_deadline(), Some(start + Duration::from_secs(2)));
        assert_eq!(
            presenter.fire_due(start + Duration::from_secs(2)),
            vec![PresentStep::Speak {
                text: "Hund2".into(),
                locale: "de-DE".into()
            }]
        );
    }

    #[test]
    fn test_window_mode_without_sound_schedules_nothing() {
        let mut presenter = presenter(false);
        let now_steps = presenter.phrase_changed(&change(Mode::Window, 0), Instant::now());
        assert_eq!(now_steps.len(), 2);
        assert!(presenter.next_deadline().is_none());
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut presenter = presenter(false);
        let start = Instant::now();
        presenter.phrase_changed(&change(Mode::Checkup, 0), start);
        presenter.clear();
        assert!(presenter.fire_due(start + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_numbered_prompt() {
        let mut presenter = presenter(false);
        let mut numbered = change(Mode::Checkup, 4);
        numbered.numbered = true;
        let steps = presenter.phrase_changed(&numbered, Instant::now());
        assert_eq!(steps[0], PresentStep::Show("5. dog4".into()));
    }

    #[derive(Clone, Default)]
    struct RecordingSurface {
        shown: Arc<Mutex<Vec<(Duration, String)>>>,
        started: Option<Instant>,
    }

    impl DisplaySurface for RecordingSurface {
        fn show_text(&mut self, text: &str) {
            let elapsed = self.started.map_or(Duration::ZERO, |s| s.elapsed());
            self.shown.lock().unwrap().push((elapsed, text.to_string()));
        }
        fn show_progress(&mut self, _cursor: usize, _total: usize) {}
        fn speak(&mut self, _text: &str, _locale: &str) {}
        fn set_theme(&mut self, _theme: Theme) {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_presenter_reveals_after_delay() {
        let (tx, rx) = broadcast::channel(16);
        let surface = RecordingSurface {
            started: Some(Instant::now()),
            ..RecordingSurface::default()
        };
        let shown = surface.shown.clone();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_presenter(rx, surface, presenter(false), cancel.clone()));

        tx.send(PlaybackEvent::PhraseChanged(change(Mode::Checkup, 0))).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(PlaybackEvent::PhraseChanged(change(Mode::Checkup, 1))).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        cancel.cancel();
        task.await.unwrap();

        let shown = shown.lock().unwrap().clone();
        let texts: Vec<_> = shown.iter().map(|(_, text)| text.as_str()).collect();
        assert_eq!(texts, vec!["dog0", "dog1", "dog1 - Hund1"]);
        assert!(shown[2].0 >= Duration::from_secs(4));
        assert!(shown[2].0 < Duration::from_secs(5));
    }
}
