//! Navigation state machine
//!
//! Navigation is strictly hierarchical: home → level → activity → step.
//! There is no history stack; `back` inspects the current position and
//! chooses the parent. The selection is held as catalog ids, and each
//! variant of [`Navigation`] carries exactly the ids it needs, so a course
//! is never selected without its level and the player always has an
//! activity.

use serde::{Deserialize, Serialize};

use crate::catalog::{Activity, Catalog, Course, Level};
use crate::step::{AnswerInput, CapturedAnswer, StepState};
use crate::types::{Language, Step, Transition, ViewKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub level: String,
    pub course: String,
    pub activity: String,
    #[serde(flatten)]
    pub steps: StepState,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum Navigation {
    #[default]
    Home,
    CourseList {
        level: String,
    },
    Player(PlayerState),
}

/// The single mutable state of a learner session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    language: Language,
    navigation: Navigation,
}

impl Session {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            navigation: Navigation::Home,
        }
    }

    // ==================== Accessors ====================

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn view(&self) -> ViewKind {
        match self.navigation {
            Navigation::Home => ViewKind::Home,
            Navigation::CourseList { .. } => ViewKind::CourseList,
            Navigation::Player(_) => ViewKind::Player,
        }
    }

    pub fn player(&self) -> Option<&PlayerState> {
        match &self.navigation {
            Navigation::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn selected_level(&self) -> Option<&str> {
        match &self.navigation {
            Navigation::Home => None,
            Navigation::CourseList { level } => Some(level),
            Navigation::Player(player) => Some(&player.level),
        }
    }

    pub fn selected_course(&self) -> Option<&str> {
        self.player().map(|p| p.course.as_str())
    }

    pub fn selected_activity(&self) -> Option<&str> {
        self.player().map(|p| p.activity.as_str())
    }

    pub fn step(&self) -> Option<Step> {
        self.player().map(|p| p.steps.stage.step())
    }

    pub fn step_index(&self) -> Option<usize> {
        self.step().map(Step::index)
    }

    pub fn captured_answer(&self) -> Option<&CapturedAnswer> {
        self.player().and_then(|p| p.steps.answer.as_ref())
    }

    pub fn observation_fullscreen(&self) -> bool {
        self.player().is_some_and(|p| p.steps.stage.fullscreen())
    }

    pub fn can_validate(&self) -> bool {
        self.player().is_some_and(|p| p.steps.can_validate())
    }

    /// Catalog entities behind the current player selection.
    pub fn active<'c>(&self, catalog: &'c Catalog) -> Option<(&'c Level, &'c Course, &'c Activity)> {
        let player = self.player()?;
        catalog.lookup_path(&player.level, &player.course, &player.activity)
    }

    // ==================== Language ====================

    pub fn set_language(&mut self, language: Language) -> Transition {
        if self.language == language {
            return Transition::Ignored;
        }
        self.language = language;
        tracing::debug!(language = %language, "language changed");
        Transition::Applied
    }

    // ==================== Navigation ====================

    /// `Home --selectLevel--> CourseList(level)`
    pub fn select_level(&mut self, catalog: &Catalog, level_id: &str) -> Transition {
        if !matches!(self.navigation, Navigation::Home) {
            return Transition::Ignored;
        }
        if catalog.lookup_level(level_id).is_none() {
            tracing::error!(level = level_id, "selected level is not in the catalog");
            return Transition::Ignored;
        }

        self.navigation = Navigation::CourseList {
            level: level_id.to_string(),
        };
        tracing::debug!(level = level_id, "level selected");
        Transition::Applied
    }

    /// `CourseList(level) --selectActivity--> Player`, with fresh step state.
    pub fn select_activity(
        &mut self,
        catalog: &Catalog,
        course_id: &str,
        activity_id: &str,
    ) -> Transition {
        let Navigation::CourseList { level } = &self.navigation else {
            return Transition::Ignored;
        };
        if catalog.lookup_path(level, course_id, activity_id).is_none() {
            tracing::error!(
                level = %level,
                course = course_id,
                activity = activity_id,
                "selected activity is not in the catalog"
            );
            return Transition::Ignored;
        }

        self.navigation = Navigation::Player(PlayerState {
            level: level.clone(),
            course: course_id.to_string(),
            activity: activity_id.to_string(),
            steps: StepState::default(),
        });
        tracing::debug!(course = course_id, activity = activity_id, "activity entered");
        Transition::Applied
    }

    /// Universal back: previous step, then course list, then home.
    pub fn back(&mut self) -> Transition {
        let next = match &mut self.navigation {
            Navigation::Home => return Transition::Ignored,
            Navigation::CourseList { .. } => Navigation::Home,
            Navigation::Player(player) => {
                if player.steps.step_back() {
                    tracing::debug!(step = player.steps.stage.index(), "stepped back");
                    return Transition::Applied;
                }
                Navigation::CourseList {
                    level: player.level.clone(),
                }
            }
        };

        tracing::debug!(view = ?next, "navigated back");
        self.navigation = next;
        Transition::Applied
    }

    /// "Back to courses" from the Explanation step.
    pub fn back_to_courses(&mut self) -> Transition {
        let level = match &self.navigation {
            Navigation::Player(player) if player.steps.stage.step() == Step::Explanation => {
                player.level.clone()
            }
            _ => return Transition::Ignored,
        };

        self.navigation = Navigation::CourseList { level };
        tracing::debug!("returned to course list");
        Transition::Applied
    }

    // ==================== Step engine ====================

    pub fn select_answer(&mut self, catalog: &Catalog, input: &AnswerInput) -> Transition {
        let Navigation::Player(player) = &mut self.navigation else {
            return Transition::Ignored;
        };
        let Some((_, _, activity)) =
            catalog.lookup_path(&player.level, &player.course, &player.activity)
        else {
            tracing::error!(activity = %player.activity, "active activity is not in the catalog");
            return Transition::Ignored;
        };

        Transition::from_bool(player.steps.select_answer(&activity.prediction, input))
    }

    pub fn validate(&mut self) -> Transition {
        self.with_steps(StepState::validate, "prediction validated")
    }

    pub fn enter_fullscreen(&mut self) -> Transition {
        self.with_steps(StepState::enter_fullscreen, "observation fullscreen entered")
    }

    pub fn exit_fullscreen(&mut self) -> Transition {
        self.with_steps(StepState::exit_fullscreen, "observation fullscreen exited")
    }

    pub fn advance_to_explanation(&mut self) -> Transition {
        self.with_steps(StepState::advance_to_explanation, "explanation shown")
    }

    fn with_steps(&mut self, op: fn(&mut StepState) -> bool, message: &'static str) -> Transition {
        let Navigation::Player(player) = &mut self.navigation else {
            return Transition::Ignored;
        };
        let applied = op(&mut player.steps);
        if applied {
            tracing::debug!(step = player.steps.stage.index(), "{message}");
        }
        Transition::from_bool(applied)
    }
}
