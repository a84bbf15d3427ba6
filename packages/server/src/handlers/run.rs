//! Transform endpoint, `/run/{name}`.
//!
//! A `POST` carries a request envelope with exactly one input entity. The
//! named handler stages its reply on a [`Transform`], and the rendered
//! envelope is written back as `text/xml`:
//!
//! ```text
//! POST /run/lookupIP
//! <MaltegoMessage><MaltegoTransformRequestMessage>…</MaltegoTransformRequestMessage></MaltegoMessage>
//!
//! 200 OK
//! Content-Type: text/xml
//! <MaltegoMessage><MaltegoTransformResponseMessage>…</MaltegoTransformResponseMessage></MaltegoMessage>
//! ```
//!
//! An empty body gets a plain-text hint with status 200, an unknown name 404,
//! and an undecodable or malformed request 400. A failing handler is reported
//! to the analyst as a `FatalError` UI message inside a normal response.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use maltego::{Payload, Transform, UiMessageType};

use super::AppState;
use crate::error::AppError;
use crate::registry::TransformHandler;

pub const EMPTY_BODY: &str = "empty body received. please add data";
pub const MALFORMED_REQUEST: &str = "malformed RequestMessage";
pub const POST_ONLY: &str = "please send a POST request to this endpoint";
pub const COMPLETE: &str = "complete";

/// `GET /run/{name}`
pub async fn info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<&'static str, AppError> {
    lookup(&state, &name)?;
    Ok(POST_ONLY)
}

/// `POST /run/{name}`
pub async fn run(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let handler = lookup(&state, &name)?;

    tracing::debug!(transform = %name, bytes = body.len(), "request body received");
    if body.is_empty() {
        return Ok(EMPTY_BODY.into_response());
    }
    if state.config.dump_messages {
        dump("REQUEST", &String::from_utf8_lossy(&body));
    }

    let message = maltego::decode(&body).map_err(|e| {
        tracing::warn!(transform = %name, "failed to decode request: {e}");
        AppError::from(e)
    })?;

    let request = match message.payload {
        Some(Payload::Request(request)) if request.entities.len() == 1 => request,
        Some(Payload::Request(request)) => {
            tracing::warn!(
                transform = %name,
                "invalid number of entities: {}",
                request.entities.len()
            );
            return Err(AppError::BadRequest(MALFORMED_REQUEST.into()));
        }
        _ => {
            tracing::warn!(transform = %name, "no request payload provided");
            return Err(AppError::BadRequest(MALFORMED_REQUEST.into()));
        }
    };

    let mut transform = Transform::with_request(request);
    if let Err(e) = handler.run(&mut transform).await {
        tracing::warn!(transform = %name, "transform failed: {e}");
        if transform.has_exceptions() {
            tracing::warn!(
                transform = %name,
                "dropping staged exceptions in favour of the failure message"
            );
        }
        transform.add_ui_message(&e.to_string(), UiMessageType::FatalError);
    }

    let output = if transform.has_exceptions() && !transform.has_response() {
        transform.render_as_exception()
    } else {
        transform.add_ui_message(COMPLETE, UiMessageType::Inform);
        transform.render()
    };

    if state.config.dump_messages {
        dump("RESPONSE", &output);
    }
    Ok(([(header::CONTENT_TYPE, "text/xml")], output).into_response())
}

// --- helpers -----------------------------------------------------------------

fn lookup(
    state: &AppState,
    name: &str,
) -> Result<std::sync::Arc<dyn TransformHandler>, AppError> {
    state
        .registry
        .get(name)
        .ok_or_else(|| AppError::NotFound(format!("no transform named {name:?}")))
}

fn dump(kind: &str, xml: &str) {
    tracing::debug!("================== {kind} ====================\n{xml}");
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use maltego::{entity_types, TransformError};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::ServerConfig, registry::TransformRegistry, router::build_router};

    const ONE_ENTITY: &str = r#"<MaltegoMessage><MaltegoTransformRequestMessage><Entities><Entity Type="maltego.Phrase"><Value>hello</Value><Weight>0</Weight></Entity></Entities><Limits SoftLimit="12" HardLimit="12"/></MaltegoTransformRequestMessage></MaltegoMessage>"#;

    fn build_app() -> Router {
        let mut registry = TransformRegistry::new();
        registry
            .register_fn("echo", |t: &mut Transform| {
                let value = t.input_entity().map(|e| e.value.clone()).unwrap_or_default();
                t.add_entity(entity_types::PHRASE, &value);
                Ok(())
            })
            .unwrap();
        registry
            .register_fn("fail", |_: &mut Transform| {
                Err(TransformError::failed("upstream unavailable"))
            })
            .unwrap();
        registry
            .register_fn("throw", |t: &mut Transform| {
                t.add_exception("quota exceeded", "429");
                Ok(())
            })
            .unwrap();
        registry
            .register_fn("silent", |_: &mut Transform| Ok(()))
            .unwrap();
        registry
            .register_fn("throw_then_fail", |t: &mut Transform| {
                t.add_exception("quota exceeded", "429");
                Err(TransformError::failed("gave up"))
            })
            .unwrap();
        build_router(Arc::new(registry), ServerConfig::default())
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "text/xml")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn echo_returns_entity_and_complete_message() {
        let resp = build_app().oneshot(post("/run/echo", ONE_ENTITY)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let ct = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert_eq!(ct, "text/xml");
        assert_eq!(
            body_text(resp).await,
            r#"<MaltegoMessage><MaltegoTransformResponseMessage><Entities><Entity Type="maltego.Phrase"><Value>hello</Value><Weight>100</Weight></Entity></Entities><UIMessages><UIMessage MessageType="Inform">complete</UIMessage></UIMessages></MaltegoTransformResponseMessage></MaltegoMessage>"#
        );
    }

    #[tokio::test]
    async fn handler_without_output_still_completes() {
        let resp = build_app().oneshot(post("/run/silent", ONE_ENTITY)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp)
            .await
            .contains(r#"<Entities></Entities><UIMessages><UIMessage MessageType="Inform">complete</UIMessage>"#));
    }

    #[tokio::test]
    async fn empty_body_gets_hint() {
        let resp = build_app().oneshot(post("/run/echo", "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, EMPTY_BODY);
    }

    #[tokio::test]
    async fn unknown_transform_returns_404() {
        let resp = build_app().oneshot(post("/run/nope", ONE_ENTITY)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn undecodable_body_returns_400() {
        let resp = build_app().oneshot(post("/run/echo", "<html></html>")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn two_entities_are_malformed() {
        let body = ONE_ENTITY.replace(
            "</Entities>",
            r#"<Entity Type="maltego.Phrase"><Value>again</Value><Weight>0</Weight></Entity></Entities>"#,
        );
        let resp = build_app().oneshot(post("/run/echo", &body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(resp).await, MALFORMED_REQUEST);
    }

    #[tokio::test]
    async fn response_payload_is_malformed() {
        let body = r#"<MaltegoMessage><MaltegoTransformResponseMessage></MaltegoTransformResponseMessage></MaltegoMessage>"#;
        let resp = build_app().oneshot(post("/run/echo", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(resp).await, MALFORMED_REQUEST);
    }

    #[tokio::test]
    async fn handler_error_becomes_fatal_ui_message() {
        let resp = build_app().oneshot(post("/run/fail", ONE_ENTITY)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let text = body_text(resp).await;
        assert!(text.contains(r#"<UIMessage MessageType="FatalError">upstream unavailable</UIMessage>"#));
        assert!(text.contains(r#"<UIMessage MessageType="Inform">complete</UIMessage>"#));
    }

    #[tokio::test]
    async fn staged_exceptions_are_thrown() {
        let resp = build_app().oneshot(post("/run/throw", ONE_ENTITY)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_text(resp).await,
            r#"<MaltegoMessage><MaltegoTransformExceptionMessage><Exceptions><Exception code="429">quota exceeded</Exception></Exceptions></MaltegoTransformExceptionMessage></MaltegoMessage>"#
        );
    }

    #[tokio::test]
    async fn failure_after_staged_exceptions_is_a_fatal_response() {
        let resp = build_app()
            .oneshot(post("/run/throw_then_fail", ONE_ENTITY))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_text(resp).await,
            r#"<MaltegoMessage><MaltegoTransformResponseMessage><Entities></Entities><UIMessages><UIMessage MessageType="FatalError">gave up</UIMessage><UIMessage MessageType="Inform">complete</UIMessage></UIMessages></MaltegoTransformResponseMessage></MaltegoMessage>"#
        );
    }

    #[tokio::test]
    async fn get_asks_for_post() {
        let req = Request::builder()
            .method("GET")
            .uri("/run/echo")
            .body(Body::empty())
            .unwrap();
        let resp = build_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, POST_ONLY);
    }

    #[tokio::test]
    async fn home_lists_routes_in_order() {
        let req = Request::builder()
            .method("GET")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let resp = build_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let ct = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(ct.starts_with("text/html"));
        assert!(body_text(resp)
            .await
            .ends_with("routes:<br>/run/echo<br>/run/fail<br>/run/throw<br>/run/silent<br>/run/throw_then_fail<br>"));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let config = ServerConfig {
            max_body_bytes: 16,
            ..ServerConfig::default()
        };
        let mut registry = TransformRegistry::new();
        registry.register_fn("echo", |_: &mut Transform| Ok(())).unwrap();
        let app = build_router(Arc::new(registry), config);
        let resp = app.oneshot(post("/run/echo", ONE_ENTITY)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
