//! HTTP request handlers for the transform server.
//!
//! Handlers are async functions that receive Axum extractors and return
//! `Result<impl IntoResponse, AppError>`.

pub mod home;
pub mod run;

use std::sync::Arc;

use crate::{config::ServerConfig, registry::TransformRegistry};

/// Shared application state threaded through all Axum handlers via [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    /// Immutable once the router is built.
    pub registry: Arc<TransformRegistry>,
    pub config: ServerConfig,
}
