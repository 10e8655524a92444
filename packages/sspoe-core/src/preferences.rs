//! Durable string preferences (currently only the interface language).

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{Language, LANGUAGE_PREFERENCE_KEY};

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to write preferences to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Non-durable store, used in tests and when no storage is configured.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(language: Language) -> Self {
        let mut store = Self::new();
        store
            .values
            .insert(LANGUAGE_PREFERENCE_KEY.to_string(), language.as_str().to_string());
        store
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stored language, defaulting to French for missing or unknown values.
pub fn stored_language(store: &impl PreferenceStore) -> Language {
    store
        .get(LANGUAGE_PREFERENCE_KEY)
        .and_then(|value| Language::parse(&value))
        .unwrap_or_default()
}
