//! Landing page, `GET /`.

use axum::{extract::State, response::Html};

use super::AppState;

/// `GET /`
///
/// A greeting followed by one `/run/{name}` line per registered transform.
pub async fn home(State(state): State<AppState>) -> Html<String> {
    let routes: String = state
        .registry
        .names()
        .map(|name| format!("/run/{name}<br>"))
        .collect();
    Html(format!(
        "Hi there! You've reached a Maltego transform server.<br><br>routes:<br>{routes}"
    ))
}
