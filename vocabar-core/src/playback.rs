use crate::vocabulary::{format_phrase, DictionaryDescriptor, Level, PhraseSet, VocabularyEntry};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default word change interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

/// How phrases are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Floating window showing the full pair
    #[default]
    Window,
    /// Phrase shown as the tray/menu bar title
    MenuBar,
    /// Quiz: term first, translation revealed after a delay
    Checkup,
}

impl Mode {
    pub const ALL: [Self; 3] = [Self::Window, Self::MenuBar, Self::Checkup];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Window => "Window",
            Self::MenuBar => "Menu Bar",
            Self::Checkup => "Checkup",
        }
    }

    /// Whether the mode needs a persistent tray/menu bar
    #[must_use]
    pub const fn requires_tray(self) -> bool {
        matches!(self, Self::MenuBar | Self::Checkup)
    }
}

/// Manual navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// What happens to the cursor when a set finishes loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPolicy {
    /// Keep the cursor, clamped to the new length (reloading the same set)
    Preserve,
    /// Start from the first entry (deliberate language/level switch)
    Reset,
}

/// Durable and runtime playback fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    pub cursor: usize,
    pub language_to: String,
    pub language_from: String,
    pub level: Level,
    pub mode: Mode,
    pub interval: Duration,
    pub sound_enabled: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            cursor: 0,
            language_to: "de".to_string(),
            language_from: "en".to_string(),
            level: Level::A1,
            mode: Mode::Window,
            interval: DEFAULT_INTERVAL,
            sound_enabled: false,
        }
    }
}

impl PlaybackState {
    /// Dictionary currently selected
    #[must_use]
    pub fn descriptor(&self) -> DictionaryDescriptor {
        DictionaryDescriptor::new(&self.language_to, &self.language_from, self.level.clone())
    }

    /// Whether `descriptor` is the current selection
    #[must_use]
    pub fn is_selected(&self, descriptor: &DictionaryDescriptor) -> bool {
        self.language_to == descriptor.language_to
            && self.language_from == descriptor.language_from
            && self.level == descriptor.level
    }
}

/// Pending dictionary load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub id: u64,
    pub descriptor: DictionaryDescriptor,
    pub policy: CursorPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request was issued after this one
    Stale,
}

/// Payload of a phrase change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseChange {
    pub entry: VocabularyEntry,
    pub cursor: usize,
    pub total: usize,
    pub mode: Mode,
    /// Prefix rendered text with the 1-based position
    pub numbered: bool,
}

impl PhraseChange {
    fn position(&self) -> Option<usize> {
        self.numbered.then_some(self.cursor + 1)
    }

    /// Full `term - translation` text
    #[must_use]
    pub fn phrase(&self) -> String {
        format_phrase(&self.entry, self.position())
    }

    /// Term-only text shown before a checkup reveal
    #[must_use]
    pub fn prompt(&self) -> String {
        match self.position() {
            Some(n) => format!("{n}. {}", self.entry.term),
            None => self.entry.term.clone(),
        }
    }
}

/// Phrase cycling state machine.
///
/// `Idle` until the first set loads, `Ready` afterwards. Timers live with the
/// caller; this type only owns the data and its invariants.
#[derive(Debug, Clone)]
pub struct Playback {
    state: PlaybackState,
    phrases: Option<PhraseSet>,
    latest_request: u64,
    /// Latest request while it is in flight
    pending: Option<LoadRequest>,
}

impl Playback {
    #[must_use]
    pub const fn new(state: PlaybackState) -> Self {
        Self {
            state,
            phrases: None,
            latest_request: 0,
            pending: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PlaybackState {
        &self.state
    }

    #[must_use]
    pub const fn phrases(&self) -> Option<&PhraseSet> {
        self.phrases.as_ref()
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.phrases.is_some()
    }

    /// True when there is something to cycle through
    #[must_use]
    pub fn has_entries(&self) -> bool {
        self.phrases.as_ref().is_some_and(|set| !set.is_empty())
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.phrases.as_ref().map_or(0, PhraseSet::len)
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<&VocabularyEntry> {
        self.phrases.as_ref()?.get(self.state.cursor)
    }

    /// Notification payload for the current entry, `None` when nothing is loaded
    #[must_use]
    pub fn phrase_change(&self, numbered: bool) -> Option<PhraseChange> {
        let entry = self.current_entry()?.clone();
        Some(PhraseChange {
            entry,
            cursor: self.state.cursor,
            total: self.total(),
            mode: self.state.mode,
            numbered,
        })
    }

    /// Start a load. Only the most recent request can complete.
    pub fn begin_load(&mut self, descriptor: DictionaryDescriptor, policy: CursorPolicy) -> LoadRequest {
        self.latest_request += 1;
        let request = LoadRequest {
            id: self.latest_request,
            descriptor,
            policy,
        };
        self.pending = Some(request.clone());
        request
    }

    #[must_use]
    pub const fn pending(&self) -> Option<&LoadRequest> {
        self.pending.as_ref()
    }

    /// Selection once the in-flight load lands, the applied one otherwise
    #[must_use]
    pub fn target(&self) -> DictionaryDescriptor {
        self.pending
            .as_ref()
            .map_or_else(|| self.state.descriptor(), |request| request.descriptor.clone())
    }

    /// Whether `descriptor` is what the latest selection points at
    #[must_use]
    pub fn is_targeted(&self, descriptor: &DictionaryDescriptor) -> bool {
        match &self.pending {
            Some(request) => request.descriptor == *descriptor,
            None => self.state.is_selected(descriptor),
        }
    }

    /// The latest request failed; the applied selection stays
    pub fn fail_load(&mut self, request: &LoadRequest) {
        if self.is_current(request) {
            self.pending = None;
        }
    }

    /// Whether `request` is still the latest one
    #[must_use]
    pub const fn is_current(&self, request: &LoadRequest) -> bool {
        request.id == self.latest_request
    }

    /// Install a loaded set. The selection only changes here, so a failed
    /// load leaves the previous set and cursor untouched.
    pub fn complete_load(&mut self, request: &LoadRequest, phrases: PhraseSet) -> LoadOutcome {
        if !self.is_current(request) {
            return LoadOutcome::Stale;
        }

        let descriptor = &request.descriptor;
        self.state.language_to.clone_from(&descriptor.language_to);
        self.state.language_from.clone_from(&descriptor.language_from);
        self.state.level = descriptor.level.clone();
        self.state.cursor = match request.policy {
            CursorPolicy::Reset => 0,
            CursorPolicy::Preserve => self.state.cursor.min(phrases.len().saturating_sub(1)),
        };
        self.phrases = Some(phrases);
        self.pending = None;
        LoadOutcome::Applied
    }

    /// Point the selection at another level without loading it yet
    pub fn fall_back_to(&mut self, level: Level) {
        self.state.level = level;
        self.state.cursor = 0;
    }

    /// Move one entry, wrapping at both ends. Returns false when nothing is loaded.
    pub fn advance(&mut self, direction: Direction) -> bool {
        let len = self.total();
        if len == 0 {
            return false;
        }
        let cursor = self.state.cursor % len;
        self.state.cursor = match direction {
            Direction::Forward => (cursor + 1) % len,
            Direction::Backward => (cursor + len - 1) % len,
        };
        true
    }

    /// Timer tick
    pub fn tick(&mut self) -> bool {
        self.advance(Direction::Forward)
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.state.mode = mode;
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.state.interval = interval;
    }

    pub fn set_sound(&mut self, enabled: bool) {
        self.state.sound_enabled = enabled;
    }
}
