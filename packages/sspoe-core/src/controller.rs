//! Session controller
//!
//! Single owner of the session, the catalog, the preference store and the
//! host. Each callback validates and applies one transition, performs the
//! host side effects it implies and asks the host to render the fresh view.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::install::{InstallFlow, InstallOutcome};
use crate::preferences::{stored_language, PreferenceStore};
use crate::session::Session;
use crate::step::AnswerInput;
use crate::types::{Language, TextDirection, Transition, LANGUAGE_PREFERENCE_KEY};
use crate::view::{render, ViewDescriptor};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("fullscreen request rejected: {0}")]
    FullscreenRejected(String),
}

/// The environment the player runs in: paints views and owns the
/// document-level and fullscreen state.
pub trait Host {
    /// Deferred native install prompt handed over by the environment.
    type InstallPrompt;

    fn render(&mut self, view: &ViewDescriptor);
    fn set_document_language(&mut self, lang: Language, dir: TextDirection);
    fn request_fullscreen(&mut self) -> Result<(), HostError>;
    fn exit_fullscreen(&mut self);
    fn show_install_prompt(&mut self, prompt: Self::InstallPrompt);
}

/// Serializable form of every callback, for hosts that forward events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    SelectLevel {
        #[serde(rename = "levelId")]
        level_id: String,
    },
    SelectActivity {
        #[serde(rename = "courseId")]
        course_id: String,
        #[serde(rename = "activityId")]
        activity_id: String,
    },
    SelectAnswer {
        value: AnswerInput,
    },
    Validate,
    EnterFullscreen,
    ExitFullscreen,
    FullscreenExited,
    EscapeKey,
    AdvanceToExplanation,
    Back,
    BackToCourses,
    ToggleLanguage,
    InstallAvailable,
    InstallRequested,
    InstallOutcome {
        outcome: InstallOutcome,
    },
    AppInstalled,
}

pub struct Controller<S, H: Host> {
    catalog: Catalog,
    session: Session,
    store: S,
    host: H,
    install: InstallFlow<H::InstallPrompt>,
}

impl<S, H> Controller<S, H>
where
    S: PreferenceStore,
    H: Host,
{
    /// Starts a session in the stored language and paints the home screen.
    pub fn new(catalog: Catalog, store: S, host: H) -> Self {
        let language = stored_language(&store);
        let mut controller = Self {
            catalog,
            session: Session::new(language),
            store,
            host,
            install: InstallFlow::new(),
        };

        controller
            .host
            .set_document_language(language, language.direction());
        controller.rerender();
        tracing::debug!(language = %language, "player session started");
        controller
    }

    pub fn view(&self) -> ViewDescriptor {
        render(&self.session, &self.catalog, self.install.banner_visible())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn install(&self) -> &InstallFlow<H::InstallPrompt> {
        &self.install
    }

    fn rerender(&mut self) {
        let view = self.view();
        self.host.render(&view);
    }

    /// Runs one session transition. Leaving fullscreen by any route also
    /// leaves native fullscreen.
    fn apply(&mut self, op: impl FnOnce(&mut Session, &Catalog) -> Transition) -> Transition {
        let was_fullscreen = self.session.observation_fullscreen();
        let transition = op(&mut self.session, &self.catalog);

        if was_fullscreen && !self.session.observation_fullscreen() {
            self.host.exit_fullscreen();
        }
        if transition.applied() {
            self.rerender();
        }
        transition
    }

    // ==================== Navigation ====================

    pub fn on_select_level(&mut self, level_id: &str) -> Transition {
        self.apply(|session, catalog| session.select_level(catalog, level_id))
    }

    pub fn on_select_activity(&mut self, course_id: &str, activity_id: &str) -> Transition {
        self.apply(|session, catalog| session.select_activity(catalog, course_id, activity_id))
    }

    pub fn on_back(&mut self) -> Transition {
        self.apply(|session, _| session.back())
    }

    pub fn on_back_to_courses(&mut self) -> Transition {
        self.apply(|session, _| session.back_to_courses())
    }

    // ==================== Steps ====================

    pub fn on_select_answer(&mut self, value: impl Into<AnswerInput>) -> Transition {
        let value = value.into();
        self.apply(|session, catalog| session.select_answer(catalog, &value))
    }

    pub fn on_validate(&mut self) -> Transition {
        self.apply(|session, _| session.validate())
    }

    pub fn on_enter_fullscreen(&mut self) -> Transition {
        let transition = self.apply(|session, _| session.enter_fullscreen());
        if transition.applied() {
            if let Err(err) = self.host.request_fullscreen() {
                tracing::warn!(error = %err, "native fullscreen unavailable, keeping in-page overlay");
            }
        }
        transition
    }

    pub fn on_exit_fullscreen(&mut self) -> Transition {
        self.apply(|session, _| session.exit_fullscreen())
    }

    /// The host left native fullscreen on its own (platform gesture).
    pub fn on_fullscreen_exited(&mut self) -> Transition {
        let transition = self.session.exit_fullscreen();
        if transition.applied() {
            self.rerender();
        }
        transition
    }

    pub fn on_escape_key(&mut self) -> Transition {
        self.on_exit_fullscreen()
    }

    pub fn on_advance_to_explanation(&mut self) -> Transition {
        self.apply(|session, _| session.advance_to_explanation())
    }

    // ==================== Language ====================

    pub fn on_toggle_language(&mut self) -> Transition {
        let next = self.session.language().alternate();
        self.set_language(next)
    }

    pub fn set_language(&mut self, language: Language) -> Transition {
        let transition = self.session.set_language(language);
        if !transition.applied() {
            return transition;
        }

        if let Err(err) = self.store.set(LANGUAGE_PREFERENCE_KEY, language.as_str()) {
            tracing::warn!(error = %err, language = %language, "failed to persist language");
        }
        self.host
            .set_document_language(language, language.direction());
        self.rerender();
        transition
    }

    // ==================== Install prompt ====================

    pub fn on_install_available(&mut self, prompt: H::InstallPrompt) -> Transition {
        let transition = Transition::from_bool(self.install.on_prompt_available(prompt));
        if transition.applied() {
            self.rerender();
        }
        transition
    }

    pub fn on_install_requested(&mut self) -> Transition {
        match self.install.take_prompt() {
            Some(prompt) => {
                self.host.show_install_prompt(prompt);
                Transition::Applied
            }
            None => Transition::Ignored,
        }
    }

    pub fn on_install_outcome(&mut self, outcome: InstallOutcome) -> Transition {
        tracing::info!(?outcome, "install prompt answered");
        let transition = Transition::from_bool(self.install.on_outcome(outcome));
        if transition.applied() {
            self.rerender();
        }
        transition
    }

    pub fn on_app_installed(&mut self) -> Transition {
        let transition = Transition::from_bool(self.install.on_installed());
        if transition.applied() {
            self.rerender();
        }
        transition
    }
}

impl<S, H> Controller<S, H>
where
    S: PreferenceStore,
    H: Host,
    H::InstallPrompt: Default,
{
    /// Routes a forwarded action to its callback.
    pub fn dispatch(&mut self, action: Action) -> Transition {
        match action {
            Action::SelectLevel { level_id } => self.on_select_level(&level_id),
            Action::SelectActivity {
                course_id,
                activity_id,
            } => self.on_select_activity(&course_id, &activity_id),
            Action::SelectAnswer { value } => self.on_select_answer(value),
            Action::Validate => self.on_validate(),
            Action::EnterFullscreen => self.on_enter_fullscreen(),
            Action::ExitFullscreen => self.on_exit_fullscreen(),
            Action::FullscreenExited => self.on_fullscreen_exited(),
            Action::EscapeKey => self.on_escape_key(),
            Action::AdvanceToExplanation => self.on_advance_to_explanation(),
            Action::Back => self.on_back(),
            Action::BackToCourses => self.on_back_to_courses(),
            Action::ToggleLanguage => self.on_toggle_language(),
            Action::InstallAvailable => self.on_install_available(H::InstallPrompt::default()),
            Action::InstallRequested => self.on_install_requested(),
            Action::InstallOutcome { outcome } => self.on_install_outcome(outcome),
            Action::AppInstalled => self.on_app_installed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferences;
    use crate::types::ViewKind;

    #[derive(Default)]
    struct TestHost {
        renders: Vec<ViewKind>,
        documents: Vec<(Language, TextDirection)>,
        fullscreen_requests: usize,
        fullscreen_exits: usize,
        prompts_shown: usize,
        reject_fullscreen: bool,
    }

    impl Host for TestHost {
        type InstallPrompt = ();

        fn render(&mut self, view: &ViewDescriptor) {
            self.renders.push(view.kind());
        }

        fn set_document_language(&mut self, lang: Language, dir: TextDirection) {
            self.documents.push((lang, dir));
        }

        fn request_fullscreen(&mut self) -> Result<(), HostError> {
            self.fullscreen_requests += 1;
            if self.reject_fullscreen {
                Err(HostError::FullscreenRejected("not allowed".into()))
            } else {
                Ok(())
            }
        }

        fn exit_fullscreen(&mut self) {
            self.fullscreen_exits += 1;
        }

        fn show_install_prompt(&mut self, _prompt: ()) {
            self.prompts_shown += 1;
        }
    }

    fn controller() -> Controller<MemoryPreferences, TestHost> {
        Controller::new(
            Catalog::builtin().unwrap(),
            MemoryPreferences::new(),
            TestHost::default(),
        )
    }

    fn observing() -> Controller<MemoryPreferences, TestHost> {
        let mut c = controller();
        c.on_select_level("1ac");
        c.on_select_activity("1ac_pression", "1ac_pression_act1");
        c.on_select_answer("b");
        c.on_validate();
        c
    }

    #[test]
    fn test_start_renders_home_in_stored_language() {
        let c = Controller::new(
            Catalog::builtin().unwrap(),
            MemoryPreferences::with_language(Language::Ar),
            TestHost::default(),
        );
        assert_eq!(c.session().language(), Language::Ar);
        assert_eq!(c.host().documents, vec![(Language::Ar, TextDirection::Rtl)]);
        assert_eq!(c.host().renders, vec![ViewKind::Home]);
    }

    #[test]
    fn test_ignored_transition_does_not_render() {
        let mut c = controller();
        assert_eq!(c.on_back(), Transition::Ignored);
        assert_eq!(c.on_validate(), Transition::Ignored);
        assert_eq!(c.host().renders.len(), 1);

        c.on_select_level("1ac");
        assert_eq!(c.host().renders, vec![ViewKind::Home, ViewKind::CourseList]);
    }

    #[test]
    fn test_fullscreen_round_trip_with_host() {
        let mut c = observing();
        assert!(c.on_enter_fullscreen().applied());
        assert_eq!(c.host().fullscreen_requests, 1);
        assert!(c.session().observation_fullscreen());

        assert!(c.on_escape_key().applied());
        assert_eq!(c.host().fullscreen_exits, 1);
        assert!(!c.session().observation_fullscreen());

        assert_eq!(c.on_escape_key(), Transition::Ignored);
        assert_eq!(c.on_fullscreen_exited(), Transition::Ignored);
        assert_eq!(c.host().fullscreen_exits, 1);
    }

    #[test]
    fn test_rejected_fullscreen_keeps_overlay() {
        let mut c = observing();
        c.host_mut().reject_fullscreen = true;
        assert!(c.on_enter_fullscreen().applied());
        assert!(c.session().observation_fullscreen());
    }

    #[test]
    fn test_external_exit_does_not_call_host() {
        let mut c = observing();
        c.on_enter_fullscreen();
        assert!(c.on_fullscreen_exited().applied());
        assert!(!c.session().observation_fullscreen());
        assert_eq!(c.host().fullscreen_exits, 0);
    }

    #[test]
    fn test_advance_and_back_leave_native_fullscreen() {
        let mut c = observing();
        c.on_enter_fullscreen();
        c.on_advance_to_explanation();
        assert_eq!(c.session().step_index(), Some(2));
        assert_eq!(c.host().fullscreen_exits, 1);

        c.on_back();
        c.on_enter_fullscreen();
        c.on_back();
        assert_eq!(c.session().step_index(), Some(0));
        assert_eq!(c.host().fullscreen_exits, 2);
    }

    #[test]
    fn test_toggle_language_persists() {
        let mut c = controller();
        assert!(c.on_toggle_language().applied());
        assert_eq!(c.session().language(), Language::Ar);
        assert_eq!(
            c.store().get(LANGUAGE_PREFERENCE_KEY).as_deref(),
            Some("ar")
        );
        assert_eq!(
            c.host().documents.last(),
            Some(&(Language::Ar, TextDirection::Rtl))
        );
        assert_eq!(c.view().dir, TextDirection::Rtl);

        c.on_toggle_language();
        assert_eq!(c.session().language(), Language::Fr);
        assert_eq!(c.store().get(LANGUAGE_PREFERENCE_KEY).as_deref(), Some("fr"));
    }

    #[test]
    fn test_install_flow_through_controller() {
        let mut c = controller();
        assert!(!c.view().chrome.install_banner.visible);

        c.dispatch(Action::InstallAvailable);
        assert!(c.view().chrome.install_banner.visible);

        assert!(c.dispatch(Action::InstallRequested).applied());
        assert_eq!(c.host().prompts_shown, 1);
        assert_eq!(c.dispatch(Action::InstallRequested), Transition::Ignored);

        c.dispatch(Action::InstallOutcome {
            outcome: InstallOutcome::Dismissed,
        });
        assert!(c.view().chrome.install_banner.visible);

        c.dispatch(Action::AppInstalled);
        assert!(!c.view().chrome.install_banner.visible);
    }

    #[test]
    fn test_action_deserialization() {
        let action: Action =
            serde_json::from_str(r#"{"type":"selectActivity","courseId":"c","activityId":"a"}"#)
                .unwrap();
        assert_eq!(
            action,
            Action::SelectActivity {
                course_id: "c".into(),
                activity_id: "a".into()
            }
        );

        let action: Action = serde_json::from_str(r#"{"type":"selectAnswer","value":true}"#).unwrap();
        assert_eq!(
            action,
            Action::SelectAnswer {
                value: AnswerInput::Bool(true)
            }
        );

        let action: Action = serde_json::from_str(r#"{"type":"back"}"#).unwrap();
        assert_eq!(action, Action::Back);
    }
}
