use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sspoe_core::{Language, TextDirection};

use super::player::ViewEnvelope;
use crate::response::{ok, AppError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct LanguageResponse {
    language: Language,
    dir: TextDirection,
}

#[derive(Debug, Deserialize)]
pub struct SetLanguageRequest {
    language: String,
}

pub async fn get_language(State(state): State<AppState>) -> Response {
    let language = state.player().session().language();
    ok(LanguageResponse {
        language,
        dir: language.direction(),
    })
}

pub async fn set_language(
    State(state): State<AppState>,
    Json(payload): Json<SetLanguageRequest>,
) -> Response {
    let Some(language) = Language::parse(&payload.language) else {
        return AppError::bad_request(format!("Unsupported language `{}`", payload.language))
            .into_response();
    };

    let mut player = state.player();
    let transition = player.set_language(language);
    ok(ViewEnvelope::capture(&mut player, Some(transition.applied())))
}
