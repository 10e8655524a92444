//! SSPOE step engine
//!
//! Owns the position inside an activity (Prediction → Observation →
//! Explanation), the learner's captured prediction and its evaluation.
//! Fullscreen is part of the Observation stage itself, so it cannot be
//! active on any other step.

use serde::{Deserialize, Serialize};

use crate::catalog::{PredictionKind, PredictionSpec};
use crate::i18n::{truth_label, LocalizedText};
use crate::types::{Language, Step};

/// The learner's prediction, typed by the kind of question it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum CapturedAnswer {
    Choice(String),
    Truth(bool),
    Text(String),
}

/// Raw value submitted by the presentation layer for `selectAnswer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerInput {
    Bool(bool),
    Text(String),
}

impl From<bool> for AnswerInput {
    fn from(value: bool) -> Self {
        AnswerInput::Bool(value)
    }
}

impl From<&str> for AnswerInput {
    fn from(value: &str) -> Self {
        AnswerInput::Text(value.to_string())
    }
}

impl From<String> for AnswerInput {
    fn from(value: String) -> Self {
        AnswerInput::Text(value)
    }
}

/// Result of interpreting an input against a prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// Store this answer.
    Answer(CapturedAnswer),
    /// Open question with blank text: nothing is captured.
    Cleared,
    /// Input does not fit the prediction kind.
    Rejected,
}

/// Interprets a raw input for the given prediction.
pub fn capture(prediction: &PredictionSpec, input: &AnswerInput) -> Capture {
    match (&prediction.kind, input) {
        (PredictionKind::Mcq { .. }, AnswerInput::Text(id)) => {
            if prediction.kind.choice(id).is_some() {
                Capture::Answer(CapturedAnswer::Choice(id.clone()))
            } else {
                Capture::Rejected
            }
        }
        (PredictionKind::TrueFalse { .. }, AnswerInput::Bool(value)) => {
            Capture::Answer(CapturedAnswer::Truth(*value))
        }
        (PredictionKind::TrueFalse { .. }, AnswerInput::Text(text)) => match text.trim() {
            "true" => Capture::Answer(CapturedAnswer::Truth(true)),
            "false" => Capture::Answer(CapturedAnswer::Truth(false)),
            _ => Capture::Rejected,
        },
        // Kept verbatim: the text box is repainted from the captured value.
        (PredictionKind::Open, AnswerInput::Text(text)) => {
            if text.trim().is_empty() {
                Capture::Cleared
            } else {
                Capture::Answer(CapturedAnswer::Text(text.clone()))
            }
        }
        _ => Capture::Rejected,
    }
}

// ==================== Stage ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Stage {
    Prediction,
    Observation { fullscreen: bool },
    Explanation,
}

impl Stage {
    pub fn step(self) -> Step {
        match self {
            Stage::Prediction => Step::Prediction,
            Stage::Observation { .. } => Step::Observation,
            Stage::Explanation => Step::Explanation,
        }
    }

    pub fn index(self) -> usize {
        self.step().index()
    }

    pub fn fullscreen(self) -> bool {
        matches!(self, Stage::Observation { fullscreen: true })
    }

    /// The previous stage, or `None` at Prediction. Never fullscreen.
    pub fn previous(self) -> Option<Stage> {
        match self {
            Stage::Prediction => None,
            Stage::Observation { .. } => Some(Stage::Prediction),
            Stage::Explanation => Some(Stage::Observation { fullscreen: false }),
        }
    }
}

/// Per-activity step state held by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    pub stage: Stage,
    pub answer: Option<CapturedAnswer>,
}

impl Default for StepState {
    fn default() -> Self {
        Self {
            stage: Stage::Prediction,
            answer: None,
        }
    }
}

impl StepState {
    /// `selectAnswer`: only on the Prediction step.
    pub fn select_answer(&mut self, prediction: &PredictionSpec, input: &AnswerInput) -> bool {
        if self.stage != Stage::Prediction {
            return false;
        }
        match capture(prediction, input) {
            Capture::Answer(answer) => {
                self.answer = Some(answer);
                true
            }
            Capture::Cleared => {
                self.answer = None;
                true
            }
            Capture::Rejected => false,
        }
    }

    pub fn can_validate(&self) -> bool {
        self.stage == Stage::Prediction && self.answer.is_some()
    }

    pub fn validate(&mut self) -> bool {
        if !self.can_validate() {
            return false;
        }
        self.stage = Stage::Observation { fullscreen: false };
        true
    }

    pub fn enter_fullscreen(&mut self) -> bool {
        match self.stage {
            Stage::Observation { fullscreen: false } => {
                self.stage = Stage::Observation { fullscreen: true };
                true
            }
            _ => false,
        }
    }

    /// Idempotent: returns whether fullscreen was actually active.
    pub fn exit_fullscreen(&mut self) -> bool {
        match self.stage {
            Stage::Observation { fullscreen: true } => {
                self.stage = Stage::Observation { fullscreen: false };
                true
            }
            _ => false,
        }
    }

    pub fn advance_to_explanation(&mut self) -> bool {
        if self.stage.step() != Step::Observation {
            return false;
        }
        self.exit_fullscreen();
        self.stage = Stage::Explanation;
        true
    }

    /// Steps back within the activity. Returns `false` at Prediction, where
    /// the navigation back rule takes over.
    pub fn step_back(&mut self) -> bool {
        match self.stage.previous() {
            Some(previous) => {
                self.stage = previous;
                if previous == Stage::Prediction {
                    self.answer = None;
                }
                true
            }
            None => false,
        }
    }
}

// ==================== Evaluation ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
    /// Open answers are not graded.
    Acknowledged,
}

impl Verdict {
    /// Acknowledged answers receive the "correct" feedback text.
    pub fn uses_correct_feedback(self) -> bool {
        !matches!(self, Verdict::Incorrect)
    }
}

pub fn evaluate_correctness(answer: Option<&CapturedAnswer>, prediction: &PredictionSpec) -> Verdict {
    match (&prediction.kind, answer) {
        (PredictionKind::Open, _) => Verdict::Acknowledged,
        (PredictionKind::Mcq { correct_answer, .. }, Some(CapturedAnswer::Choice(id)))
            if id == correct_answer =>
        {
            Verdict::Correct
        }
        (PredictionKind::TrueFalse { correct_answer }, Some(CapturedAnswer::Truth(value)))
            if value == correct_answer =>
        {
            Verdict::Correct
        }
        _ => Verdict::Incorrect,
    }
}

// ==================== Recap ====================

/// Human-readable forms of the learner's answer and of the expected one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecap {
    pub learner_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

pub fn recap(answer: Option<&CapturedAnswer>, prediction: &PredictionSpec, lang: Language) -> AnswerRecap {
    let learner_answer = match answer {
        Some(CapturedAnswer::Choice(id)) => prediction
            .kind
            .choice(id)
            .map(|choice| choice.text.resolve(lang))
            .unwrap_or_else(|| id.clone()),
        Some(CapturedAnswer::Truth(value)) => truth_label(*value).resolve(lang),
        Some(CapturedAnswer::Text(text)) => text.trim().to_string(),
        None => String::new(),
    };

    let correct_answer = match &prediction.kind {
        PredictionKind::Mcq { correct_answer, .. } => prediction
            .kind
            .choice(correct_answer)
            .map(|choice| choice.text.resolve(lang))
            .filter(|text| !text.is_empty()),
        PredictionKind::TrueFalse { correct_answer } => {
            Some(truth_label(*correct_answer).resolve(lang))
        }
        PredictionKind::Open => None,
    };

    AnswerRecap {
        learner_answer,
        correct_answer,
    }
}

/// A selectable answer on the Prediction step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferedChoice {
    /// Value sent back through `selectAnswer`.
    pub value: String,
    pub marker: String,
    pub text: LocalizedText,
}

/// Choices offered on the Prediction step, synthesized for true/false.
pub fn offered_choices(prediction: &PredictionSpec) -> Vec<OfferedChoice> {
    match &prediction.kind {
        PredictionKind::Mcq { choices, .. } => choices
            .iter()
            .map(|c| OfferedChoice {
                value: c.id.clone(),
                marker: c.id.to_uppercase(),
                text: c.text.clone(),
            })
            .collect(),
        PredictionKind::TrueFalse { .. } => [(true, "✓"), (false, "✗")]
            .into_iter()
            .map(|(value, marker)| OfferedChoice {
                value: value.to_string(),
                marker: marker.to_string(),
                text: truth_label(value),
            })
            .collect(),
        PredictionKind::Open => Vec::new(),
    }
}
