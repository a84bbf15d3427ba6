//! Assembles the Axum [`Router`] from the handler modules.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    handlers::{home, run, AppState},
    registry::TransformRegistry,
};

/// Build the application router over a finished registry.
pub fn build_router(registry: Arc<TransformRegistry>, config: ServerConfig) -> Router {
    let body_limit = config.max_body_bytes;
    let state = AppState { registry, config };

    Router::new()
        .route("/", get(home::home))
        .route("/run/{name}", get(run::info).post(run::run))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}
