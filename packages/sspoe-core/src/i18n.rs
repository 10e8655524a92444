//! Localization resolver
//!
//! Every user-facing string in the catalog is a [`LocalizedText`]. French is
//! the fallback anchor and is always present; Arabic may be missing.

use serde::{Deserialize, Serialize};

use crate::types::Language;

/// Bilingual text with a mandatory French entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalizedText {
    pub fr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar: Option<String>,
}

impl LocalizedText {
    pub fn new(fr: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            fr: fr.into(),
            ar: Some(ar.into()),
        }
    }

    pub fn french_only(fr: impl Into<String>) -> Self {
        Self {
            fr: fr.into(),
            ar: None,
        }
    }

    pub fn get(&self, lang: Language) -> Option<&str> {
        match lang {
            Language::Fr => Some(self.fr.as_str()),
            Language::Ar => self.ar.as_deref(),
        }
    }

    pub fn resolve(&self, lang: Language) -> String {
        resolve(self, lang)
    }
}

/// `text[lang]` when present and non-empty, else `text.fr`, else empty.
pub fn resolve(text: &LocalizedText, lang: Language) -> String {
    match text.get(lang) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => text.fr.clone(),
    }
}

/// Literal shown for the true/false prediction buttons and recap.
pub fn truth_label(value: bool) -> LocalizedText {
    if value {
        LocalizedText::new("Vrai", "صحيح")
    } else {
        LocalizedText::new("Faux", "خطأ")
    }
}
