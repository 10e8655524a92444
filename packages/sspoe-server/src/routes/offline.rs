use axum::extract::State;
use axum::response::Response;

use crate::response::ok;
use crate::state::AppState;

/// Cache version and precache list for the client's service worker.
pub async fn manifest(State(state): State<AppState>) -> Response {
    ok(state.manifest())
}
