//! Preference Store
//!
//! The only persisted state is the theme, stored under the `"theme"` key of
//! a durable key-value store. Reads default to light; storage failures are
//! logged and otherwise ignored so a broken store never breaks the page.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// Storage key holding the theme
pub const THEME_KEY: &str = "theme";

/// Colour scheme of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything other than `"dark"` reads as light
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a preference backend
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Storage is missing or disabled
    #[error("Preference storage unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing failed
    #[error("Preference storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be decoded or encoded
    #[error("Preference serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PreferenceError {
    fn from(err: serde_json::Error) -> Self {
        PreferenceError::Serialization(err.to_string())
    }
}

/// Durable string key-value storage
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        (**self).set(key, value)
    }
}

/// Typed, fail-soft access to the page preferences
#[derive(Clone)]
pub struct AppPreferences {
    store: Rc<dyn PreferenceStore>,
}

impl fmt::Debug for AppPreferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppPreferences").finish_non_exhaustive()
    }
}

impl AppPreferences {
    pub fn new(store: impl PreferenceStore + 'static) -> Self {
        Self {
            store: Rc::new(store),
        }
    }

    /// Preferences kept only in memory
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }

    /// Stored theme, light when absent, unreadable or unrecognised
    pub fn theme(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            Ok(Some(value)) => Theme::from_stored(&value),
            Ok(None) => Theme::Light,
            Err(e) => {
                tracing::warn!("Failed to read theme preference: {}", e);
                Theme::Light
            }
        }
    }

    /// Persist `theme`; a failing store leaves the page usable
    pub fn set_theme(&self, theme: Theme) {
        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()) {
            tracing::warn!("Failed to persist theme preference: {}", e);
        }
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON file of string pairs, rewritten on every `set`
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/jobboard/preferences.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("jobboard").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        tracing::debug!("Saved preference {} to {:?}", key, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PreferenceError> {
            Err(PreferenceError::Unavailable("disabled".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), PreferenceError> {
            Err(PreferenceError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_theme_defaults_to_light() {
        let prefs = AppPreferences::in_memory();
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn test_unrecognised_value_reads_as_light() {
        let prefs = AppPreferences::new(MemoryStore::with_value(THEME_KEY, "DARK!"));
        assert_eq!(prefs.theme(), Theme::Light);

        let prefs = AppPreferences::new(MemoryStore::with_value(THEME_KEY, "dark"));
        assert_eq!(prefs.theme(), Theme::Dark);
    }

    #[test]
    fn test_set_theme_round_trip() {
        let prefs = AppPreferences::in_memory();
        prefs.set_theme(Theme::Dark);
        assert_eq!(prefs.theme(), Theme::Dark);
        prefs.set_theme(Theme::Dark.toggled());
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn test_broken_store_is_fail_soft() {
        let prefs = AppPreferences::new(BrokenStore);
        prefs.set_theme(Theme::Dark);
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let first = AppPreferences::new(FileStore::new(&path));
        assert_eq!(first.theme(), Theme::Light);
        first.set_theme(Theme::Dark);

        let second = AppPreferences::new(FileStore::new(&path));
        assert_eq!(second.theme(), Theme::Dark);
    }

    #[test]
    fn test_file_store_reports_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get(THEME_KEY),
            Err(PreferenceError::Serialization(_))
        ));
        assert_eq!(AppPreferences::new(store).theme(), Theme::Light);
    }
}
