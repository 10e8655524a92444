//! Common Types and Constants
//!
//! Shared enums used by the catalog, the session and the view descriptor.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Preference key under which the active language is persisted
pub const LANGUAGE_PREFERENCE_KEY: &str = "sspoe-lang";

/// Number of steps in the Prediction/Observation/Explanation cycle
pub const STEP_COUNT: usize = 3;

// ==================== Language ====================

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    Ar,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Fr, Language::Ar];

    pub const fn as_str(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::Ar => "ar",
        }
    }

    /// Parses a stored preference; anything unknown yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fr" => Some(Language::Fr),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }

    /// The language shown in secondary "other language" lines.
    pub const fn alternate(self) -> Self {
        match self {
            Language::Fr => Language::Ar,
            Language::Ar => Language::Fr,
        }
    }

    pub const fn direction(self) -> TextDirection {
        match self {
            Language::Ar => TextDirection::Rtl,
            Language::Fr => TextDirection::Ltr,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document-level text direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

// ==================== Steps ====================

/// Position in the pedagogical cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Prediction,
    Observation,
    Explanation,
}

impl Step {
    pub const ALL: [Step; STEP_COUNT] = [Step::Prediction, Step::Observation, Step::Explanation];

    pub const fn index(self) -> usize {
        match self {
            Step::Prediction => 0,
            Step::Observation => 1,
            Step::Explanation => 2,
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Step::Prediction => "🤔",
            Step::Observation => "🔍",
            Step::Explanation => "💡",
        }
    }
}

/// Progress indicator state of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

impl StepStatus {
    pub fn of(step: Step, current: Step) -> Self {
        match step.index().cmp(&current.index()) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Active,
            std::cmp::Ordering::Greater => StepStatus::Pending,
        }
    }
}

/// Which screen the session is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    Home,
    CourseList,
    Player,
}

/// Outcome of a state mutation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

impl Transition {
    pub fn applied(self) -> bool {
        matches!(self, Transition::Applied)
    }

    pub(crate) fn from_bool(applied: bool) -> Self {
        if applied {
            Transition::Applied
        } else {
            Transition::Ignored
        }
    }
}
