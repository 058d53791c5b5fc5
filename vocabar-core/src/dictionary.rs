//! Dictionary files: bundled read-only levels and user-imported custom sets.

use crate::error::{CoreError, Result};
use crate::settings::DictionarySettings;
use crate::vocabulary::{DictionaryDescriptor, Level, PhraseSet};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const DICTIONARY_EXTENSION: &str = "json";

/// Reads, imports, lists and deletes vocabulary files.
///
/// Standard levels live at `<bundled>/<to>/<from>/<LEVEL>.json`. Custom sets
/// live at `<custom>/<to>_<from>_<name>.json`.
#[derive(Debug, Clone)]
pub struct DictionaryStore {
    bundled_root: PathBuf,
    custom_root: PathBuf,
}

impl DictionaryStore {
    #[must_use]
    pub fn new(bundled_root: impl Into<PathBuf>, custom_root: impl Into<PathBuf>) -> Self {
        Self {
            bundled_root: bundled_root.into(),
            custom_root: custom_root.into(),
        }
    }

    /// Store rooted at the configured bundled dir and the per-user custom dir
    #[must_use]
    pub fn from_settings(settings: &DictionarySettings) -> Self {
        Self::new(settings.bundled_dir(), crate::paths::custom_dictionaries_dir())
    }

    #[must_use]
    pub fn custom_root(&self) -> &Path {
        &self.custom_root
    }

    #[must_use]
    pub fn resolve_path(&self, language_to: &str, language_from: &str, level: &Level) -> PathBuf {
        match level {
            Level::Custom(name) => self.custom_root.join(format!(
                "{}{name}.{DICTIONARY_EXTENSION}",
                DictionaryDescriptor::custom_prefix(language_to, language_from)
            )),
            standard => self
                .bundled_root
                .join(language_to)
                .join(language_from)
                .join(format!("{}.{DICTIONARY_EXTENSION}", standard.label())),
        }
    }

    #[must_use]
    pub fn path_for(&self, descriptor: &DictionaryDescriptor) -> PathBuf {
        self.resolve_path(
            &descriptor.language_to,
            &descriptor.language_from,
            &descriptor.level,
        )
    }

    /// Load a dictionary file
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the file is missing and
    /// [`CoreError::ParseError`] if its content is not a dictionary array.
    pub async fn load(&self, path: &Path) -> Result<PhraseSet> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| CoreError::from_io(path.to_path_buf(), e))?;

        let phrases = PhraseSet::from_json(&content).map_err(|e| CoreError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("Loaded {} entries from {:?}", phrases.len(), path);
        Ok(phrases)
    }

    /// Load the dictionary a descriptor points at
    ///
    /// # Errors
    ///
    /// See [`DictionaryStore::load`].
    pub async fn load_descriptor(&self, descriptor: &DictionaryDescriptor) -> Result<PhraseSet> {
        self.load(&self.path_for(descriptor)).await
    }

    /// Parse `term-translation` lines and store them as a custom dictionary.
    ///
    /// An existing dictionary with the same name is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ValidationError`] for an invalid name or when no
    /// pair could be parsed, and [`CoreError::IoError`] if writing fails.
    pub async fn import(
        &self,
        raw_text: &str,
        name: &str,
        language_to: &str,
        language_from: &str,
    ) -> Result<DictionaryDescriptor> {
        let name = validate_name(name)?;
        let phrases = PhraseSet::parse_pairs(raw_text);
        if phrases.is_empty() {
            return Err(CoreError::ValidationError {
                reason: format!("no `term-translation` pairs found for \"{name}\""),
            });
        }

        let descriptor =
            DictionaryDescriptor::new(language_to, language_from, Level::custom(name));
        let path = self.path_for(&descriptor);

        fs::create_dir_all(&self.custom_root).await?;
        fs::write(&path, phrases.to_json()?).await?;

        info!(
            "Imported {} entries into custom dictionary {} at {:?}",
            phrases.len(),
            descriptor,
            path
        );
        Ok(descriptor)
    }

    /// Delete a custom dictionary
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the file does not exist and
    /// [`CoreError::ValidationError`] for bundled levels or invalid names.
    pub async fn delete(&self, descriptor: &DictionaryDescriptor) -> Result<()> {
        let Some(name) = descriptor.level.custom_name() else {
            return Err(CoreError::ValidationError {
                reason: format!("bundled dictionary {descriptor} is read-only"),
            });
        };
        if validate_name(name)? != name {
            return Err(CoreError::ValidationError {
                reason: format!("invalid dictionary name \"{name}\""),
            });
        }

        let path = self.path_for(descriptor);
        fs::remove_file(&path)
            .await
            .map_err(|e| CoreError::from_io(path.clone(), e))?;

        info!("Deleted custom dictionary {} at {:?}", descriptor, path);
        Ok(())
    }

    /// Names of the custom dictionaries for a language pair, sorted
    ///
    /// # Errors
    ///
    /// Returns an error if the custom directory exists but cannot be read.
    pub async fn list_custom(&self, language_to: &str, language_from: &str) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.custom_root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let prefix = DictionaryDescriptor::custom_prefix(language_to, language_from);
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DICTIONARY_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if let Some(name) = stem.strip_prefix(&prefix) {
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Custom names become filename fields, so separators are rejected
pub(crate) fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '_']);
    if invalid {
        return Err(CoreError::ValidationError {
            reason: format!("invalid dictionary name \"{name}\""),
        });
    }
    Ok(name)
}
