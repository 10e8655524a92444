pub mod config;
pub mod host;
pub mod logging;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::state::{AppState, StartupError};

pub fn create_app(config: &Config) -> Result<axum::Router, StartupError> {
    let state = AppState::from_config(config)?;

    Ok(routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}
