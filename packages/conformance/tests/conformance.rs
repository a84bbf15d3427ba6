//! End-to-end conformance tests for the transform server.
//!
//! Each test spawns an ephemeral in-process server (real TCP, real HTTP) via
//! [`maltego_conformance::spawn_server`] and exercises it with a `reqwest`
//! HTTP client, decoding replies with the `maltego` codec the way the client
//! would.
//!
//! # Coverage
//!
//! | Test | Behaviour |
//! |------|-----------|
//! | `home_lists_registered_routes` | landing page |
//! | `get_on_transform_asks_for_post` | GET hint |
//! | `empty_body_returns_hint` | empty POST |
//! | `unknown_transform_returns_404` | routing |
//! | `garbage_body_returns_400` | decode failure |
//! | `two_entities_return_400` | entity count |
//! | `echo_round_trip` | response envelope |
//! | `transform_fields_reach_handler` | request settings |
//! | `handler_error_is_fatal_ui_message` | error reporting |
//! | `exceptions_are_thrown` | exception envelope |
//! | `lookup_ip_resolves_literal_address` | built-in transform |
//! | `oversized_body_returns_413` | body limit |

use maltego::{decode_str, entity_types, UiMessageType};
use maltego_conformance::{fixture_registry, request_xml, spawn_server};
use maltego_server::ServerConfig;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .unwrap()
}

async fn spawn() -> String {
    spawn_server(fixture_registry(), ServerConfig::default()).await
}

async fn post(base: &str, name: &str, body: String) -> reqwest::Response {
    make_client()
        .post(format!("{base}/run/{name}"))
        .header("content-type", "text/xml")
        .body(body)
        .send()
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn home_lists_registered_routes() {
    let base = spawn().await;
    let resp = make_client().get(&base).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.starts_with("Hi there! You've reached a Maltego transform server."));
    assert!(body.ends_with("/run/lookupIP<br>/run/echo<br>/run/fail<br>/run/throw<br>"));
}

#[tokio::test]
async fn get_on_transform_asks_for_post() {
    let base = spawn().await;
    let resp = make_client()
        .get(format!("{base}/run/echo"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.text().await.unwrap(),
        "please send a POST request to this endpoint"
    );
}

#[tokio::test]
async fn unknown_transform_returns_404() {
    let base = spawn().await;
    let resp = post(&base, "nope", request_xml(entity_types::PHRASE, "x")).await;
    assert_eq!(resp.status(), 404);
}

// ---------------------------------------------------------------------------
// Request validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_body_returns_hint() {
    let base = spawn().await;
    let resp = post(&base, "echo", String::new()).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "empty body received. please add data");
}

#[tokio::test]
async fn garbage_body_returns_400() {
    let base = spawn().await;
    let resp = post(&base, "echo", "not xml at all <".into()).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn two_entities_return_400() {
    let base = spawn().await;
    let body = request_xml(entity_types::PHRASE, "one").replace(
        "</Entities>",
        r#"<Entity Type="maltego.Phrase"><Value>two</Value><Weight>0</Weight></Entity></Entities>"#,
    );
    let resp = post(&base, "echo", body).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.text().await.unwrap(), "malformed RequestMessage");
}

#[tokio::test]
async fn oversized_body_returns_413() {
    let config = ServerConfig {
        max_body_bytes: 64,
        ..ServerConfig::default()
    };
    let base = spawn_server(fixture_registry(), config).await;
    let resp = post(&base, "echo", request_xml(entity_types::PHRASE, "x")).await;
    assert_eq!(resp.status(), 413);
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn echo_round_trip() {
    let base = spawn().await;
    let resp = post(&base, "echo", request_xml(entity_types::PHRASE, "Tom & Jerry")).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/xml");

    let message = decode_str(&resp.text().await.unwrap()).unwrap();
    let response = message.as_response().expect("response envelope");
    assert_eq!(response.entities.len(), 1);
    let entity = &response.entities[0];
    assert_eq!(entity.entity_type, "maltego.Phrase");
    // Escaped once by add_entity; the wire layer's escaping is undone by decode.
    assert_eq!(entity.value, "Tom &amp; Jerry");
    assert_eq!(entity.weight, "100");
    assert_eq!(entity.field_by_name("notes#"), "echoed");

    let last = response.ui_messages.last().unwrap();
    assert_eq!(last.message_type, UiMessageType::Inform);
    assert_eq!(last.text, "complete");
}

#[tokio::test]
async fn transform_fields_reach_handler() {
    let base = spawn().await;
    let body = request_xml(entity_types::PHRASE, "abc").replace(
        "<TransformFields></TransformFields>",
        r#"<TransformFields><Field Name="suffix">-xyz</Field></TransformFields>"#,
    );
    let resp = post(&base, "echo", body).await;
    let message = decode_str(&resp.text().await.unwrap()).unwrap();
    assert_eq!(message.as_response().unwrap().entities[0].value, "abc-xyz");
}

#[tokio::test]
async fn handler_error_is_fatal_ui_message() {
    let base = spawn().await;
    let resp = post(&base, "fail", request_xml(entity_types::PHRASE, "x")).await;
    assert_eq!(resp.status(), 200);
    let message = decode_str(&resp.text().await.unwrap()).unwrap();
    let response = message.as_response().unwrap();
    assert!(response.entities.is_empty());
    assert_eq!(response.ui_messages[0].message_type, UiMessageType::FatalError);
    assert_eq!(response.ui_messages[0].text, "backend unavailable");
}

#[tokio::test]
async fn exceptions_are_thrown() {
    let base = spawn().await;
    let resp = post(&base, "throw", request_xml(entity_types::PHRASE, "x")).await;
    assert_eq!(resp.status(), 200);
    let message = decode_str(&resp.text().await.unwrap()).unwrap();
    assert!(message.as_response().is_none());
    let exception = message.as_exception().expect("exception envelope");
    assert_eq!(exception.exceptions.len(), 1);
    assert_eq!(exception.exceptions[0].code, "429");
    assert_eq!(exception.exceptions[0].text, "quota exceeded");
}

#[tokio::test]
async fn lookup_ip_resolves_literal_address() {
    let base = spawn().await;
    let resp = post(&base, "lookupIP", request_xml(entity_types::DNS_NAME, "127.0.0.1")).await;
    assert_eq!(resp.status(), 200);
    let message = decode_str(&resp.text().await.unwrap()).unwrap();
    let response = message.as_response().unwrap();
    assert_eq!(response.entities.len(), 1);
    assert_eq!(response.entities[0].entity_type, entity_types::IPV4_ADDRESS);
    assert_eq!(response.entities[0].value, "127.0.0.1");
}
