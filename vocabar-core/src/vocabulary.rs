//! Vocabulary entries, phrase sets, levels and dictionary descriptors.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Prefix marking a user-imported level (`custom:<name>`)
pub const CUSTOM_LEVEL_PREFIX: &str = "custom:";

/// A single word pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Source term, shown first
    #[serde(rename = "word_1")]
    pub term: String,
    /// Translation, revealed second
    #[serde(rename = "word_2")]
    pub translation: String,
}

impl VocabularyEntry {
    #[must_use]
    pub fn new(term: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            translation: translation.into(),
        }
    }

    /// Parse one `term-translation` import line.
    ///
    /// The first `-` is the delimiter. Lines without a delimiter or with an
    /// empty side are rejected.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let (term, translation) = line.split_once('-')?;
        let term = term.trim();
        let translation = translation.trim();
        if term.is_empty() || translation.is_empty() {
            return None;
        }
        Some(Self::new(term, translation))
    }
}

/// Ordered word pairs loaded from one dictionary file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhraseSet {
    entries: Vec<VocabularyEntry>,
}

impl PhraseSet {
    #[must_use]
    pub const fn new(entries: Vec<VocabularyEntry>) -> Self {
        Self { entries }
    }

    /// Parse newline-delimited `term-translation` text.
    ///
    /// Blank and malformed lines are skipped and exact duplicates collapse to
    /// their first occurrence.
    #[must_use]
    pub fn parse_pairs(raw: &str) -> Self {
        let entries = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(VocabularyEntry::parse_line)
            .collect();
        Self::new(entries).without_duplicates()
    }

    /// Parse the JSON dictionary format (array of `{word_1, word_2}`)
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a well-formed dictionary array.
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }

    /// Serialize to the JSON dictionary format
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Drop repeated pairs, keeping the first occurrence
    #[must_use]
    pub fn without_duplicates(self) -> Self {
        let mut seen = HashSet::new();
        let entries = self
            .entries
            .into_iter()
            .filter(|entry| seen.insert(entry.clone()))
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&VocabularyEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }
}

impl From<Vec<VocabularyEntry>> for PhraseSet {
    fn from(entries: Vec<VocabularyEntry>) -> Self {
        Self::new(entries)
    }
}

#[derive(Debug, Error)]
#[error("Unknown level: {0}")]
pub struct ParseLevelError(String);

/// Difficulty bucket or user-imported set
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    #[default]
    A1,
    A2,
    B1,
    B2,
    C1,
    Custom(String),
}

impl Level {
    /// Levels backed by bundled dictionaries, in menu order
    pub const STANDARD: [Self; 5] = [Self::A1, Self::A2, Self::B1, Self::B2, Self::C1];

    /// Parse `A1`..`C1` or `custom:<name>`
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "A1" => Some(Self::A1),
            "A2" => Some(Self::A2),
            "B1" => Some(Self::B1),
            "B2" => Some(Self::B2),
            "C1" => Some(Self::C1),
            other => other
                .strip_prefix(CUSTOM_LEVEL_PREFIX)
                .filter(|name| !name.is_empty())
                .map(|name| Self::Custom(name.to_string())),
        }
    }

    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    #[must_use]
    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    #[must_use]
    pub fn custom_name(&self) -> Option<&str> {
        match self {
            Self::Custom(name) => Some(name),
            _ => None,
        }
    }

    /// Menu label (the code for standard levels, the bare name for custom ones)
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(name) => write!(f, "{CUSTOM_LEVEL_PREFIX}{name}"),
            standard => f.write_str(standard.label()),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(ParseLevelError(value))
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.to_string()
    }
}

/// Identifies one loadable vocabulary file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DictionaryDescriptor {
    /// Language being learned (translation side)
    pub language_to: String,
    /// Language the terms are written in
    pub language_from: String,
    pub level: Level,
}

impl DictionaryDescriptor {
    #[must_use]
    pub fn new(language_to: impl Into<String>, language_from: impl Into<String>, level: Level) -> Self {
        Self {
            language_to: language_to.into(),
            language_from: language_from.into(),
            level,
        }
    }

    /// Same language pair, different level
    #[must_use]
    pub fn with_level(&self, level: Level) -> Self {
        Self {
            language_to: self.language_to.clone(),
            language_from: self.language_from.clone(),
            level,
        }
    }

    /// Filename prefix shared by all custom dictionaries of this pair
    #[must_use]
    pub fn custom_prefix(language_to: &str, language_from: &str) -> String {
        format!("{language_to}_{language_from}_")
    }
}

impl fmt::Display for DictionaryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.language_to, self.language_from, self.level)
    }
}

/// Format a phrase, optionally prefixed with its 1-based position
#[must_use]
pub fn format_phrase(entry: &VocabularyEntry, position: Option<usize>) -> String {
    match position {
        Some(n) => format!("{n}. {} - {}", entry.term, entry.translation),
        None => format!("{} - {}", entry.term, entry.translation),
    }
}

/// Speech synthesis locale for a language code
#[must_use]
pub fn speech_locale(code: &str) -> &str {
    match code {
        "de" => "de-DE",
        "en" => "en-US",
        "es" => "es-ES",
        "fr" => "fr-FR",
        "it" => "it-IT",
        "ru" => "ru-RU",
        "uk" => "uk-UA",
        "pl" => "pl-PL",
        other => other,
    }
}

/// Display name for a language code
#[must_use]
pub fn language_name(code: &str) -> &str {
    match code {
        "de" => "German",
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "it" => "Italian",
        "ru" => "Russian",
        "uk" => "Ukrainian",
        "pl" => "Polish",
        other => other,
    }
}
