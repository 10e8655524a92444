//! Render dispatcher
//!
//! [`render`] maps the session onto a presentation-ready [`ViewDescriptor`]:
//! every visible label is already resolved to the active language and every
//! action button carries its enablement. The descriptor is derived from
//! scratch on each call.

use serde::Serialize;

use crate::catalog::{Activity, Catalog, Level, PredictionKind};
use crate::i18n::LocalizedText;
use crate::session::{Navigation, PlayerState, Session};
use crate::step::{self, CapturedAnswer, Stage, Verdict};
use crate::types::{Language, Step, StepStatus, TextDirection, ViewKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDescriptor {
    pub lang: Language,
    pub dir: TextDirection,
    pub chrome: Chrome,
    #[serde(flatten)]
    pub screen: Screen,
}

impl ViewDescriptor {
    pub fn kind(&self) -> ViewKind {
        match self.screen {
            Screen::Home(_) => ViewKind::Home,
            Screen::CourseList(_) => ViewKind::CourseList,
            Screen::Player(_) => ViewKind::Player,
        }
    }
}

/// Navigation bar and banners around the screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chrome {
    pub nav_title: String,
    pub back_visible: bool,
    pub back_label: String,
    pub language_label: String,
    pub install_banner: InstallBanner,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallBanner {
    pub visible: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum Screen {
    Home(HomeScreen),
    CourseList(CourseListScreen),
    Player(PlayerScreen),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionButton {
    pub label: String,
    pub enabled: bool,
}

impl ActionButton {
    fn new(label: String, enabled: bool) -> Self {
        Self { label, enabled }
    }
}

// ==================== Home ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeScreen {
    pub title: String,
    pub subtitle: String,
    pub alt_subtitle: String,
    pub welcome: String,
    pub footer: String,
    pub levels: Vec<LevelItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelItem {
    pub id: String,
    pub name: String,
    pub alt_name: String,
    pub icon: String,
    pub color: String,
    pub gradient: String,
}

// ==================== Course list ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListScreen {
    pub level_id: String,
    pub title: String,
    pub subtitle: String,
    pub color: String,
    pub courses: Vec<CourseItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub activities: Vec<ActivityItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: String,
    pub course_id: String,
    /// 1-based position within the course.
    pub number: usize,
    pub title: String,
}

// ==================== Player ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScreen {
    pub activity_id: String,
    pub title: String,
    pub step_index: usize,
    pub progress: Vec<StepIndicator>,
    pub content: StepContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepIndicator {
    pub step: Step,
    pub label: String,
    pub icon: &'static str,
    pub status: StepStatus,
    /// State of the connector to the next step; `None` after the last one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum StepContent {
    Prediction(PredictionView),
    Observation(ObservationView),
    Explanation(ExplanationView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionView {
    pub heading: String,
    pub question: String,
    pub input: AnswerField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub validate: ActionButton,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnswerField {
    Choices { choices: Vec<ChoiceItem> },
    OpenText { placeholder: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceItem {
    pub value: String,
    pub marker: String,
    pub text: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationView {
    pub heading: String,
    pub instructions: String,
    pub simulation: SimulationFrame,
    pub fullscreen: bool,
    pub enter_fullscreen: ActionButton,
    pub exit_fullscreen: ActionButton,
    pub show_explanation: ActionButton,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationFrame {
    pub src: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationView {
    pub heading: String,
    pub feedback: FeedbackView,
    pub recap: RecapView,
    pub summary: Vec<RichLine>,
    pub back_to_courses: ActionButton,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    pub verdict: Verdict,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapView {
    pub your_prediction_label: String,
    pub your_prediction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<RecapLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapLine {
    pub label: String,
    pub text: String,
}

// ==================== Rich text ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

pub type RichLine = Vec<Span>;

/// Splits markdown-lite text into lines of spans: `**bold**` and newlines.
/// An unmatched `**` is kept literally.
pub fn parse_rich_text(text: &str) -> Vec<RichLine> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(parse_rich_line).collect()
}

fn parse_rich_line(line: &str) -> RichLine {
    let mut spans = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        if open > 0 {
            spans.push(Span {
                text: rest[..open].to_string(),
                bold: false,
            });
        }
        spans.push(Span {
            text: after_open[..close].to_string(),
            bold: true,
        });
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span {
            text: rest.to_string(),
            bold: false,
        });
    }
    spans
}

// ==================== Dispatch ====================

pub fn render(session: &Session, catalog: &Catalog, install_banner_visible: bool) -> ViewDescriptor {
    let lang = session.language();
    let t = |text: &LocalizedText| text.resolve(lang);

    let (nav_title, screen) = match session.navigation() {
        Navigation::Home => (t(&catalog.app.title), Screen::Home(home(catalog, lang))),
        Navigation::CourseList { level } => match catalog.lookup_level(level) {
            Some(level) => (
                format!("{} — {}", t(&level.short_name), t(&catalog.ui.courses)),
                Screen::CourseList(course_list(catalog, level, lang)),
            ),
            None => {
                tracing::error!(level = %level, "rendering unknown level");
                (t(&catalog.app.title), Screen::Home(home(catalog, lang)))
            }
        },
        Navigation::Player(player) => match session.active(catalog) {
            Some((_, _, activity)) => (
                t(&activity.title),
                Screen::Player(player_screen(catalog, activity, player, lang)),
            ),
            None => {
                tracing::error!(activity = %player.activity, "rendering unknown activity");
                (t(&catalog.app.title), Screen::Home(home(catalog, lang)))
            }
        },
    };

    ViewDescriptor {
        lang,
        dir: lang.direction(),
        chrome: Chrome {
            nav_title,
            back_visible: !matches!(screen, Screen::Home(_)),
            back_label: t(&catalog.ui.back),
            language_label: t(&catalog.ui.language),
            install_banner: InstallBanner {
                visible: install_banner_visible,
                text: t(&catalog.ui.install_app),
            },
        },
        screen,
    }
}

fn home(catalog: &Catalog, lang: Language) -> HomeScreen {
    let alt = lang.alternate();
    HomeScreen {
        title: catalog.app.title.resolve(lang),
        subtitle: catalog.app.subtitle.resolve(lang),
        alt_subtitle: catalog.app.subtitle.resolve(alt),
        welcome: catalog.app.welcome.resolve(lang),
        footer: catalog.app.footer.resolve(lang),
        levels: catalog
            .levels
            .iter()
            .map(|level| LevelItem {
                id: level.id.clone(),
                name: level.name.resolve(lang),
                alt_name: level.name.resolve(alt),
                icon: level.icon.clone(),
                color: level.color.clone(),
                gradient: level.gradient.clone(),
            })
            .collect(),
    }
}

fn course_list(catalog: &Catalog, level: &Level, lang: Language) -> CourseListScreen {
    let courses: Vec<CourseItem> = level
        .courses
        .iter()
        .map(|course| CourseItem {
            id: course.id.clone(),
            title: course.title.resolve(lang),
            description: course.description.resolve(lang),
            icon: course.icon.clone(),
            activities: course
                .activities
                .iter()
                .enumerate()
                .map(|(idx, activity)| ActivityItem {
                    id: activity.id.clone(),
                    course_id: course.id.clone(),
                    number: idx + 1,
                    title: activity.title.resolve(lang),
                })
                .collect(),
        })
        .collect();

    let empty_message = courses
        .is_empty()
        .then(|| catalog.ui.no_courses.resolve(lang));

    CourseListScreen {
        level_id: level.id.clone(),
        title: level.name.resolve(lang),
        subtitle: level.name.resolve(lang.alternate()),
        color: level.color.clone(),
        courses,
        empty_message,
    }
}

fn player_screen(
    catalog: &Catalog,
    activity: &Activity,
    player: &PlayerState,
    lang: Language,
) -> PlayerScreen {
    let current = player.steps.stage.step();
    let progress = Step::ALL
        .iter()
        .map(|&step| StepIndicator {
            step,
            label: step_label(catalog, step).resolve(lang),
            icon: step.icon(),
            status: StepStatus::of(step, current),
            line_completed: (step != Step::Explanation).then(|| step.index() < current.index()),
        })
        .collect();

    let content = match player.steps.stage {
        Stage::Prediction => StepContent::Prediction(prediction(catalog, activity, player, lang)),
        Stage::Observation { fullscreen } => {
            StepContent::Observation(observation(catalog, activity, fullscreen, lang))
        }
        Stage::Explanation => StepContent::Explanation(explanation(catalog, activity, player, lang)),
    };

    PlayerScreen {
        activity_id: activity.id.clone(),
        title: activity.title.resolve(lang),
        step_index: current.index(),
        progress,
        content,
    }
}

fn step_label(catalog: &Catalog, step: Step) -> &LocalizedText {
    match step {
        Step::Prediction => &catalog.ui.step_prediction,
        Step::Observation => &catalog.ui.step_observation,
        Step::Explanation => &catalog.ui.step_explanation,
    }
}

fn prediction(
    catalog: &Catalog,
    activity: &Activity,
    player: &PlayerState,
    lang: Language,
) -> PredictionView {
    let spec = &activity.prediction;
    let answer = player.steps.answer.as_ref();

    let input = match &spec.kind {
        PredictionKind::Open => AnswerField::OpenText {
            placeholder: catalog.ui.write_answer.resolve(lang),
            value: match answer {
                Some(CapturedAnswer::Text(text)) => text.clone(),
                _ => String::new(),
            },
        },
        _ => AnswerField::Choices {
            choices: step::offered_choices(spec)
                .into_iter()
                .map(|choice| ChoiceItem {
                    selected: is_selected(answer, &choice.value),
                    text: choice.text.resolve(lang),
                    marker: choice.marker,
                    value: choice.value,
                })
                .collect(),
        },
    };

    PredictionView {
        heading: catalog.ui.step_prediction.resolve(lang),
        question: spec.question.resolve(lang),
        input,
        hint: answer
            .is_none()
            .then(|| catalog.ui.select_answer.resolve(lang)),
        validate: ActionButton::new(
            catalog.ui.validate.resolve(lang),
            player.steps.can_validate(),
        ),
    }
}

fn is_selected(answer: Option<&CapturedAnswer>, value: &str) -> bool {
    match answer {
        Some(CapturedAnswer::Choice(id)) => id == value,
        Some(CapturedAnswer::Truth(truth)) => truth.to_string() == value,
        _ => false,
    }
}

fn observation(
    catalog: &Catalog,
    activity: &Activity,
    fullscreen: bool,
    lang: Language,
) -> ObservationView {
    ObservationView {
        heading: catalog.ui.step_observation.resolve(lang),
        instructions: activity.simulation.instructions.resolve(lang),
        simulation: SimulationFrame {
            src: activity.simulation.file.clone(),
            title: activity.title.resolve(lang),
        },
        fullscreen,
        enter_fullscreen: ActionButton::new(catalog.ui.fullscreen.resolve(lang), !fullscreen),
        exit_fullscreen: ActionButton::new(catalog.ui.exit_fullscreen.resolve(lang), fullscreen),
        show_explanation: ActionButton::new(catalog.ui.show_explanation.resolve(lang), true),
    }
}

fn explanation(
    catalog: &Catalog,
    activity: &Activity,
    player: &PlayerState,
    lang: Language,
) -> ExplanationView {
    let answer = player.steps.answer.as_ref();
    let verdict = step::evaluate_correctness(answer, &activity.prediction);
    let feedback = &activity.explanation.feedback;
    let feedback_text = if verdict.uses_correct_feedback() {
        feedback.correct.resolve(lang)
    } else {
        feedback.incorrect.resolve(lang)
    };

    let recap = step::recap(answer, &activity.prediction, lang);

    ExplanationView {
        heading: catalog.ui.step_explanation.resolve(lang),
        feedback: FeedbackView {
            verdict,
            text: feedback_text,
        },
        recap: RecapView {
            your_prediction_label: catalog.ui.your_prediction.resolve(lang),
            your_prediction: recap.learner_answer,
            correct_answer: recap.correct_answer.map(|text| RecapLine {
                label: catalog.ui.correct_answer.resolve(lang),
                text,
            }),
        },
        summary: parse_rich_text(&activity.explanation.summary.resolve(lang)),
        back_to_courses: ActionButton::new(catalog.ui.back_to_courses.resolve(lang), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    fn player_at(catalog: &Catalog, choice: Option<&str>, step: usize) -> Session {
        let mut session = Session::default();
        session.select_level(catalog, "1ac");
        session.select_activity(catalog, "1ac_pression", "1ac_pression_act1");
        if let Some(choice) = choice {
            session.select_answer(catalog, &choice.into());
        }
        if step >= 1 {
            session.validate();
        }
        if step >= 2 {
            session.advance_to_explanation();
        }
        session
    }

    #[test]
    fn test_parse_rich_text() {
        let lines = parse_rich_text("**Formule :**  P = F ÷ S\n\n• **P** = pression");
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            vec![
                Span { text: "Formule :".into(), bold: true },
                Span { text: "  P = F ÷ S".into(), bold: false },
            ]
        );
        assert!(lines[1].is_empty());
        assert_eq!(lines[2][1], Span { text: "P".into(), bold: true });
    }

    #[test]
    fn test_parse_rich_text_unmatched_marker() {
        let lines = parse_rich_text("a **b");
        assert_eq!(lines, vec![vec![Span { text: "a **b".into(), bold: false }]]);
        assert!(parse_rich_text("").is_empty());
    }

    #[test]
    fn test_render_home() {
        let catalog = catalog();
        let view = render(&Session::default(), &catalog, false);
        assert_eq!(view.kind(), ViewKind::Home);
        assert!(!view.chrome.back_visible);
        assert_eq!(view.chrome.nav_title, "Physique Interactive");
        assert_eq!(view.chrome.language_label, "العربية");

        let Screen::Home(home) = &view.screen else {
            panic!("expected home screen");
        };
        assert_eq!(home.levels.len(), 3);
        assert_eq!(home.levels[0].name, "1ère Année Collège");
        assert_eq!(home.levels[0].alt_name, "السنة الأولى إعدادي");
        assert_eq!(home.alt_subtitle, "التعلم عبر المحاكاة");
    }

    #[test]
    fn test_render_course_list() {
        let catalog = catalog();
        let mut session = Session::default();
        session.select_level(&catalog, "1ac");
        let view = render(&session, &catalog, false);
        assert!(view.chrome.back_visible);
        assert_eq!(view.chrome.nav_title, "1AC — Cours");

        let Screen::CourseList(list) = &view.screen else {
            panic!("expected course list");
        };
        assert_eq!(list.courses.len(), 1);
        assert_eq!(list.courses[0].activities[0].number, 1);
        assert_eq!(list.courses[0].activities[0].id, "1ac_pression_act1");
        assert_eq!(list.empty_message, None);
    }

    #[test]
    fn test_render_empty_level() {
        let catalog = catalog();
        let mut session = Session::new(Language::Ar);
        session.select_level(&catalog, "3ac");
        let view = render(&session, &catalog, false);
        let Screen::CourseList(list) = &view.screen else {
            panic!("expected course list");
        };
        assert!(list.courses.is_empty());
        assert_eq!(list.empty_message.as_deref(), Some("الدروس قيد التحضير…"));
    }

    #[test]
    fn test_render_prediction_enablement() {
        let catalog = catalog();
        let view = render(&player_at(&catalog, None, 0), &catalog, false);
        let Screen::Player(player) = &view.screen else {
            panic!("expected player");
        };
        let StepContent::Prediction(pred) = &player.content else {
            panic!("expected prediction");
        };
        assert!(!pred.validate.enabled);
        assert!(pred.hint.is_some());

        let view = render(&player_at(&catalog, Some("b"), 0), &catalog, false);
        let Screen::Player(player) = &view.screen else {
            panic!("expected player");
        };
        let StepContent::Prediction(pred) = &player.content else {
            panic!("expected prediction");
        };
        assert!(pred.validate.enabled);
        assert!(pred.hint.is_none());
        let AnswerField::Choices { choices } = &pred.input else {
            panic!("expected choices");
        };
        let selected: Vec<&str> = choices
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(selected, vec!["b"]);
        assert_eq!(choices[1].marker, "B");
    }

    #[test]
    fn test_open_answer_survives_repaint() {
        let mut catalog = catalog();
        catalog.levels[0].courses[0].activities[0].prediction.kind = PredictionKind::Open;
        let mut session = player_at(&catalog, None, 0);

        let mut textarea = String::new();
        for key in "le poids ".chars() {
            textarea.push(key);
            session.select_answer(&catalog, &textarea.clone().into());

            let view = render(&session, &catalog, false);
            let Screen::Player(player) = &view.screen else {
                panic!("expected player");
            };
            let StepContent::Prediction(pred) = &player.content else {
                panic!("expected prediction");
            };
            let AnswerField::OpenText { value, .. } = &pred.input else {
                panic!("expected open text");
            };
            textarea = value.clone();
        }

        assert_eq!(textarea, "le poids ");
        assert!(session.can_validate());
    }

    #[test]
    fn test_render_progress() {
        let catalog = catalog();
        let view = render(&player_at(&catalog, Some("b"), 1), &catalog, false);
        let Screen::Player(player) = &view.screen else {
            panic!("expected player");
        };
        let statuses: Vec<StepStatus> = player.progress.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![StepStatus::Completed, StepStatus::Active, StepStatus::Pending]
        );
        let lines: Vec<Option<bool>> = player.progress.iter().map(|p| p.line_completed).collect();
        assert_eq!(lines, vec![Some(true), Some(false), None]);

        let StepContent::Observation(obs) = &player.content else {
            panic!("expected observation");
        };
        assert_eq!(obs.simulation.src, "simulations/pression_sim.html");
        assert!(obs.enter_fullscreen.enabled);
        assert!(!obs.exit_fullscreen.enabled);
    }

    #[test]
    fn test_render_explanation_incorrect() {
        let catalog = catalog();
        let view = render(&player_at(&catalog, Some("a"), 2), &catalog, true);
        assert!(view.chrome.install_banner.visible);
        let Screen::Player(player) = &view.screen else {
            panic!("expected player");
        };
        let StepContent::Explanation(expl) = &player.content else {
            panic!("expected explanation");
        };
        assert_eq!(expl.feedback.verdict, Verdict::Incorrect);
        assert!(expl.feedback.text.starts_with("🤔 Pas tout à fait"));
        assert!(expl.recap.your_prediction.starts_with("La brique s'enfonce plus quand elle est à plat"));
        let correct = expl.recap.correct_answer.as_ref().unwrap();
        assert!(correct.text.contains("sur la tranche"));
        assert_eq!(correct.label, "Bonne réponse");
    }

    #[test]
    fn test_descriptor_serializes_screen_tag() {
        let catalog = catalog();
        let view = render(&player_at(&catalog, Some("b"), 2), &catalog, false);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["screen"], "player");
        assert_eq!(json["dir"], "ltr");
        assert_eq!(json["content"]["step"], "explanation");
        assert_eq!(json["content"]["feedback"]["verdict"], "correct");
    }
}
