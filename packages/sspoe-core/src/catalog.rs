//! Content catalog
//!
//! Read-only hierarchy Level → Course → Activity, plus the application texts
//! and interface labels. Loaded once from a JSON document and validated so
//! the rest of the crate can rely on its referential invariants.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::i18n::LocalizedText;
use crate::types::Language;

/// Catalog shipped with the crate
pub const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },
    #[error("activity `{activity}` has a multiple-choice prediction without choices")]
    NoChoices { activity: String },
    #[error("activity `{activity}` expects choice `{answer}` which does not exist")]
    UnknownCorrectChoice { activity: String, answer: String },
    #[error("missing {lang} text at {path}")]
    MissingText { path: String, lang: Language },
}

// ==================== Entities ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub app: AppTexts,
    pub ui: UiLabels,
    pub levels: Vec<Level>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppTexts {
    pub title: LocalizedText,
    pub subtitle: LocalizedText,
    pub welcome: LocalizedText,
    pub footer: LocalizedText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiLabels {
    pub courses: LocalizedText,
    pub back: LocalizedText,
    pub validate: LocalizedText,
    pub fullscreen: LocalizedText,
    pub exit_fullscreen: LocalizedText,
    pub show_explanation: LocalizedText,
    pub back_to_courses: LocalizedText,
    pub select_answer: LocalizedText,
    pub your_prediction: LocalizedText,
    pub correct_answer: LocalizedText,
    pub step_prediction: LocalizedText,
    pub step_observation: LocalizedText,
    pub step_explanation: LocalizedText,
    pub no_courses: LocalizedText,
    pub write_answer: LocalizedText,
    pub install_app: LocalizedText,
    /// Label of the language toggle: names the language it switches to.
    pub language: LocalizedText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: String,
    pub name: LocalizedText,
    pub short_name: LocalizedText,
    pub icon: String,
    pub color: String,
    #[serde(default)]
    pub gradient: String,
    #[serde(default)]
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub icon: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub title: LocalizedText,
    pub prediction: PredictionSpec,
    pub simulation: ObservationSpec,
    pub explanation: ExplanationSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionSpec {
    pub question: LocalizedText,
    #[serde(flatten)]
    pub kind: PredictionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PredictionKind {
    Mcq {
        choices: Vec<Choice>,
        #[serde(rename = "correctAnswer")]
        correct_answer: String,
    },
    TrueFalse {
        #[serde(rename = "correctAnswer", deserialize_with = "bool_or_string")]
        correct_answer: bool,
    },
    Open,
}

impl PredictionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionKind::Mcq { .. } => "mcq",
            PredictionKind::TrueFalse { .. } => "truefalse",
            PredictionKind::Open => "open",
        }
    }

    pub fn choice(&self, id: &str) -> Option<&Choice> {
        match self {
            PredictionKind::Mcq { choices, .. } => choices.iter().find(|c| c.id == id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: LocalizedText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationSpec {
    /// Simulation page, relative to the application root.
    pub file: String,
    pub instructions: LocalizedText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationSpec {
    pub summary: LocalizedText,
    pub feedback: Feedback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub correct: LocalizedText,
    pub incorrect: LocalizedText,
}

fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Bool(value) => Ok(value),
        Raw::Text(text) => match text.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected \"true\" or \"false\", got \"{other}\""
            ))),
        },
    }
}

// ==================== Loading ====================

impl Catalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    // ==================== Lookup ====================

    pub fn lookup_level(&self, id: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == id)
    }

    /// Resolves a full selection path, checking containment at each step.
    pub fn lookup_path(
        &self,
        level_id: &str,
        course_id: &str,
        activity_id: &str,
    ) -> Option<(&Level, &Course, &Activity)> {
        let level = self.lookup_level(level_id)?;
        let course = level.lookup_course(course_id)?;
        let activity = course.lookup_activity(activity_id)?;
        Some((level, course, activity))
    }

    // ==================== Validation ====================

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut level_ids = HashSet::new();
        let mut course_ids = HashSet::new();
        let mut activity_ids = HashSet::new();

        check_text(&self.app.title, "app.title")?;
        check_text(&self.app.subtitle, "app.subtitle")?;
        check_text(&self.app.welcome, "app.welcome")?;
        check_text(&self.app.footer, "app.footer")?;
        for (name, label) in self.ui.entries() {
            check_text(label, &format!("ui.{name}"))?;
        }

        for level in &self.levels {
            unique(&mut level_ids, "level", &level.id)?;
            check_text(&level.name, &format!("{}.name", level.id))?;
            check_text(&level.short_name, &format!("{}.shortName", level.id))?;

            for course in &level.courses {
                unique(&mut course_ids, "course", &course.id)?;
                check_text(&course.title, &format!("{}.title", course.id))?;
                check_text(&course.description, &format!("{}.description", course.id))?;

                for activity in &course.activities {
                    unique(&mut activity_ids, "activity", &activity.id)?;
                    validate_activity(activity)?;
                }
            }
        }

        Ok(())
    }
}

impl UiLabels {
    fn entries(&self) -> [(&'static str, &LocalizedText); 17] {
        [
            ("courses", &self.courses),
            ("back", &self.back),
            ("validate", &self.validate),
            ("fullscreen", &self.fullscreen),
            ("exitFullscreen", &self.exit_fullscreen),
            ("showExplanation", &self.show_explanation),
            ("backToCourses", &self.back_to_courses),
            ("selectAnswer", &self.select_answer),
            ("yourPrediction", &self.your_prediction),
            ("correctAnswer", &self.correct_answer),
            ("stepPrediction", &self.step_prediction),
            ("stepObservation", &self.step_observation),
            ("stepExplanation", &self.step_explanation),
            ("noCourses", &self.no_courses),
            ("writeAnswer", &self.write_answer),
            ("installApp", &self.install_app),
            ("language", &self.language),
        ]
    }
}

impl Level {
    pub fn lookup_course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == id)
    }
}

impl Course {
    pub fn lookup_activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|activity| activity.id == id)
    }
}

fn validate_activity(activity: &Activity) -> Result<(), CatalogError> {
    let id = activity.id.as_str();
    check_text(&activity.title, &format!("{id}.title"))?;
    check_text(&activity.prediction.question, &format!("{id}.prediction.question"))?;
    check_text(
        &activity.simulation.instructions,
        &format!("{id}.simulation.instructions"),
    )?;
    check_text(&activity.explanation.summary, &format!("{id}.explanation.summary"))?;
    check_text(
        &activity.explanation.feedback.correct,
        &format!("{id}.explanation.feedback.correct"),
    )?;
    check_text(
        &activity.explanation.feedback.incorrect,
        &format!("{id}.explanation.feedback.incorrect"),
    )?;

    if let PredictionKind::Mcq {
        choices,
        correct_answer,
    } = &activity.prediction.kind
    {
        if choices.is_empty() {
            return Err(CatalogError::NoChoices {
                activity: id.to_string(),
            });
        }

        let mut choice_ids = HashSet::new();
        for choice in choices {
            unique(&mut choice_ids, "choice", &choice.id)?;
            check_text(&choice.text, &format!("{id}.prediction.choices.{}", choice.id))?;
        }

        if !choice_ids.contains(correct_answer.as_str()) {
            return Err(CatalogError::UnknownCorrectChoice {
                activity: id.to_string(),
                answer: correct_answer.clone(),
            });
        }
    }

    Ok(())
}

fn unique<'a>(
    seen: &mut HashSet<&'a str>,
    kind: &'static str,
    id: &'a str,
) -> Result<(), CatalogError> {
    if seen.insert(id) {
        Ok(())
    } else {
        Err(CatalogError::DuplicateId {
            kind,
            id: id.to_string(),
        })
    }
}

fn check_text(text: &LocalizedText, path: &str) -> Result<(), CatalogError> {
    if text.fr.trim().is_empty() {
        return Err(CatalogError::MissingText {
            path: path.to_string(),
            lang: Language::Fr,
        });
    }
    if text.ar.as_deref().map_or(true, |ar| ar.trim().is_empty()) {
        return Err(CatalogError::MissingText {
            path: path.to_string(),
            lang: Language::Ar,
        });
    }
    Ok(())
}
