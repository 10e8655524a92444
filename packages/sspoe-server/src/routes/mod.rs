mod health;
mod offline;
mod player;
mod preferences;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .route(
            "/api/view",
            get(player::view).fallback(fallback_handler),
        )
        .route(
            "/api/actions",
            post(player::dispatch).fallback(fallback_handler),
        )
        .route(
            "/api/preferences/language",
            get(preferences::get_language)
                .put(preferences::set_language)
                .fallback(fallback_handler),
        )
        .route(
            "/api/offline/manifest",
            get(offline::manifest).fallback(fallback_handler),
        )
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found").into_response()
}
