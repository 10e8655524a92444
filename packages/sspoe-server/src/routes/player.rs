use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sspoe_core::controller::Action;
use sspoe_core::view::ViewDescriptor;
use sspoe_core::{Catalog, Session};

use crate::host::HostEffect;
use crate::response::{ok, AppError};
use crate::state::{AppState, Player};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<bool>,
    pub view: ViewDescriptor,
    pub effects: Vec<HostEffect>,
}

impl ViewEnvelope {
    pub fn capture(player: &mut Player, applied: Option<bool>) -> Self {
        Self {
            applied,
            view: player.view(),
            effects: player.host_mut().drain(),
        }
    }
}

pub async fn view(State(state): State<AppState>) -> Response {
    let mut player = state.player();
    ok(ViewEnvelope::capture(&mut player, None))
}

pub async fn dispatch(State(state): State<AppState>, Json(action): Json<Action>) -> Response {
    let mut player = state.player();
    if let Err(err) = check_ids(player.catalog(), player.session(), &action) {
        return err.into_response();
    }

    let transition = player.dispatch(action);
    ok(ViewEnvelope::capture(&mut player, Some(transition.applied())))
}

/// Catalog ids must exist before they reach the session. Activities are
/// resolved inside the selected level when there is one.
fn check_ids(catalog: &Catalog, session: &Session, action: &Action) -> Result<(), AppError> {
    match action {
        Action::SelectLevel { level_id } => catalog
            .lookup_level(level_id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Unknown level `{level_id}`"))),
        Action::SelectActivity {
            course_id,
            activity_id,
        } => {
            let known = match session.selected_level() {
                Some(level) => catalog.lookup_path(level, course_id, activity_id).is_some(),
                None => catalog.levels.iter().any(|level| {
                    level
                        .lookup_course(course_id)
                        .and_then(|course| course.lookup_activity(activity_id))
                        .is_some()
                }),
            };
            if known {
                Ok(())
            } else {
                Err(AppError::not_found(format!(
                    "Unknown activity `{course_id}/{activity_id}`"
                )))
            }
        }
        _ => Ok(()),
    }
}
