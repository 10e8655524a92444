use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sspoe_core::preferences::{PreferenceError, PreferenceStore};

const PREFERENCES_FILE: &str = "preferences.json";

/// Preferences persisted as a flat JSON object in the data directory.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Loads existing preferences. A missing or unreadable file starts empty.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(PREFERENCES_FILE);
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "ignoring corrupt preferences file");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "preferences unreadable");
                BTreeMap::new()
            }
        };

        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), PreferenceError> {
        let io_error = |source| PreferenceError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, raw).map_err(io_error)
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sspoe_core::LANGUAGE_PREFERENCE_KEY;

    #[test]
    fn test_preferences_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FilePreferences::open(dir.path().join("nested"));
        assert_eq!(store.get(LANGUAGE_PREFERENCE_KEY), None);

        store.set(LANGUAGE_PREFERENCE_KEY, "ar").unwrap();

        let reopened = FilePreferences::open(dir.path().join("nested"));
        assert_eq!(reopened.get(LANGUAGE_PREFERENCE_KEY).as_deref(), Some("ar"));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PREFERENCES_FILE), "{not json").unwrap();

        let store = FilePreferences::open(dir.path());
        assert_eq!(store.get(LANGUAGE_PREFERENCE_KEY), None);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let mut store = FilePreferences::open(&blocker);
        let err = store.set(LANGUAGE_PREFERENCE_KEY, "fr").unwrap_err();
        assert!(matches!(err, PreferenceError::Io { .. }));
        assert_eq!(store.get(LANGUAGE_PREFERENCE_KEY).as_deref(), Some("fr"));
    }
}
