//! Shared helpers for the transform server conformance test suite.
//!
//! Provides [`spawn_server`], which binds a `TcpListener` on an ephemeral
//! port, serves a router over the given registry, and returns the base URL.

use std::sync::Arc;

use maltego::{entity_types, Transform, TransformError};
use maltego_server::{build_router, transforms, ServerConfig, TransformRegistry};

/// Start an ephemeral in-process server and return its base URL.
///
/// The server runs in a background `tokio` task and is bound to an
/// OS-assigned port on `127.0.0.1`, e.g. `http://127.0.0.1:51234`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound or the server fails to start.
pub async fn spawn_server(registry: TransformRegistry, config: ServerConfig) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");

    let config = ServerConfig {
        bind_addr: addr,
        ..config
    };
    let router = build_router(Arc::new(registry), config);

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("conformance server error");
    });

    format!("http://{addr}")
}

/// The built-in transforms plus fixtures covering each reply shape:
///
/// | Name | Behaviour |
/// |------|-----------|
/// | `lookupIP` | built-in DNS lookup |
/// | `echo` | returns the input value as a `maltego.Phrase` with a note |
/// | `fail` | returns an error |
/// | `throw` | stages an exception |
pub fn fixture_registry() -> TransformRegistry {
    let mut registry = transforms::builtin().expect("built-in registry");
    registry
        .register_fn("echo", |t: &mut Transform| {
            let value = t
                .input_entity()
                .map(|e| e.value.clone())
                .unwrap_or_default();
            let setting = t.transform_field("suffix").to_string();
            t.add_entity(entity_types::PHRASE, &format!("{value}{setting}"))
                .set_note("echoed");
            Ok(())
        })
        .expect("register echo");
    registry
        .register_fn("fail", |_: &mut Transform| {
            Err(TransformError::failed("backend unavailable"))
        })
        .expect("register fail");
    registry
        .register_fn("throw", |t: &mut Transform| {
            t.add_exception("quota exceeded", "429");
            Ok(())
        })
        .expect("register throw");
    registry
}

/// A request envelope for a single input entity.
pub fn request_xml(entity_type: &str, value: &str) -> String {
    let mut message = maltego::RequestMessage::default();
    message
        .entities
        .push(maltego::Entity::new(entity_type, value, "0"));
    message.limits = maltego::Limits {
        soft_limit: "12".into(),
        hard_limit: "255".into(),
    };
    maltego::encode(&maltego::MaltegoMessage::request(message)).expect("encode request")
}
