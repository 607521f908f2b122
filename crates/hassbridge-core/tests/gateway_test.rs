#![allow(clippy::unwrap_used)]
// Integration tests for `Gateway` against a wiremock server.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hassbridge_api::HttpClient;
use hassbridge_core::channel::{self, ChannelEvent, Endpoint};
use hassbridge_core::{ApiStatus, CoreError, EntityId, Gateway, Message};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(force: bool) -> (MockServer, Gateway, Endpoint) {
    let server = MockServer::start().await;
    let (host, mut device) = channel::pair();
    assert_eq!(device.recv().await, ChannelEvent::Open);

    let gateway = Gateway::with_client(HttpClient::new(), host.sender());
    configure_for(&gateway, &server, force);
    (server, gateway, device)
}

fn configure_for(gateway: &Gateway, server: &MockServer, force: bool) {
    let addr = server.address();
    gateway.configure(
        Some(addr.ip().to_string()),
        Some(addr.port().to_string()),
        Some(SecretString::from("secret-token".to_string())),
        Some(force),
    );
}

/// Everything the gateway has emitted so far.
fn drain(device: &mut Endpoint) -> Vec<Message> {
    let mut out = Vec::new();
    while let Some(ChannelEvent::Message(msg)) = device.try_recv() {
        out.push(msg);
    }
    out
}

// ── Configuration ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unconfigured_gateway_sends_no_requests() {
    let (server, gateway, mut device) = setup(true).await;
    gateway.set_token(None);
    assert!(!gateway.is_configured());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let id = EntityId::from("switch.lamp");
    assert!(gateway.fetch_entity(&id).await.is_err());
    assert!(gateway.fetch_server_status().await.is_err());
    assert!(gateway.change_entity(&id, "turn_on").await.is_err());

    assert!(drain(&mut device).is_empty());
}

// ── Fetch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_entity_emits_add_with_friendly_name() {
    let (server, gateway, mut device) = setup(true).await;

    Mock::given(method("GET"))
        .and(path("/api/states/light.kitchen"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entity_id": "light.kitchen",
            "state": "on",
            "attributes": { "friendly_name": "Kitchen" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    gateway.fetch_entity(&"light.kitchen".into()).await.unwrap();

    assert_eq!(
        drain(&mut device),
        vec![Message::Add {
            id: "light.kitchen".into(),
            name: "Kitchen".into(),
            state: "on".into(),
        }]
    );
}

#[tokio::test]
async fn test_fetch_executable_reports_sentinel_state() {
    let (server, gateway, mut device) = setup(true).await;

    Mock::given(method("GET"))
        .and(path("/api/states/script.morning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entity_id": "script.morning",
            "state": "off",
            "attributes": {}
        })))
        .mount(&server)
        .await;

    gateway.fetch_entity(&"script.morning".into()).await.unwrap();

    assert_eq!(
        drain(&mut device),
        vec![Message::Add {
            id: "script.morning".into(),
            name: "script.morning".into(),
            state: "executable".into(),
        }]
    );
}

#[tokio::test]
async fn test_fetch_missing_entity_emits_nothing() {
    let (server, gateway, mut device) = setup(true).await;

    Mock::given(method("GET"))
        .and(path("/api/states/light.gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Entity not found."
        })))
        .mount(&server)
        .await;

    let result = gateway.fetch_entity(&"light.gone".into()).await;

    assert!(
        matches!(result, Err(CoreError::EntityNotFound { ref identifier }) if identifier == "light.gone"),
        "got {result:?}"
    );
    assert!(drain(&mut device).is_empty());
}

#[tokio::test]
async fn test_fetch_id_with_path_characters_stays_on_states_endpoint() {
    let (server, gateway, mut device) = setup(true).await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entity_id": "x",
            "state": "y"
        })))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states/light.a%2F..%2F..%2Fconfig"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Entity not found."))
        .expect(1)
        .mount(&server)
        .await;

    let result = gateway.fetch_entity(&"light.a/../../config".into()).await;

    assert!(matches!(result, Err(CoreError::EntityNotFound { .. })), "got {result:?}");
    assert!(drain(&mut device).is_empty());
}

// ── Server status ───────────────────────────────────────────────────

#[tokio::test]
async fn test_status_ok_reports_location_verbatim() {
    let (server, gateway, mut device) = setup(true).await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "location_name": "Cabin  by the Lake",
            "version": "2024.6.0"
        })))
        .mount(&server)
        .await;

    gateway.fetch_server_status().await.unwrap();

    let msgs = drain(&mut device);
    assert_eq!(msgs.len(), 1);
    assert_eq!(
        msgs[0].api_status(),
        Some(ApiStatus::Available {
            location: "Cabin  by the Lake".into()
        })
    );
}

#[tokio::test]
async fn test_status_server_error_reports_description() {
    let (server, gateway, mut device) = setup(true).await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(gateway.fetch_server_status().await.is_err());

    let msgs = drain(&mut device);
    assert_eq!(msgs.len(), 1);
    match msgs[0].api_status() {
        Some(ApiStatus::Unavailable { error }) => {
            assert!(!error.is_empty());
            assert!(error.contains("500"), "{error}");
        }
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_status_not_found_is_not_an_entity_error() {
    let (server, gateway, mut device) = setup(true).await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(404).set_body_string("404: Not Found"))
        .mount(&server)
        .await;

    let result = gateway.fetch_server_status().await;
    assert!(matches!(result, Err(CoreError::Api { status: Some(404), .. })), "got {result:?}");

    match drain(&mut device).first().and_then(Message::api_status) {
        Some(ApiStatus::Unavailable { error }) => {
            assert!(error.contains("404"), "{error}");
            assert!(!error.contains("Entity not found"), "{error}");
        }
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_status_unreachable_server_reports_description() {
    let (_server, gateway, mut device) = setup(true).await;
    // discard port, nothing listens there
    gateway.set_url(Some("127.0.0.1".into()));
    gateway.set_port(Some("9".into()));

    assert!(gateway.fetch_server_status().await.is_err());

    let msgs = drain(&mut device);
    assert!(matches!(
        msgs.as_slice(),
        [msg] if matches!(msg.api_status(), Some(ApiStatus::Unavailable { ref error }) if !error.is_empty())
    ));
}

// ── Change: force mode ──────────────────────────────────────────────

#[tokio::test]
async fn test_force_mode_assumes_terminal_state() {
    let (server, gateway, mut device) = setup(true).await;

    Mock::given(method("POST"))
        .and(path("/api/services/switch/turn_on"))
        .and(body_json(json!({ "entity_id": "switch.lamp" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    gateway
        .change_entity(&"switch.lamp".into(), "turn_on")
        .await
        .unwrap();

    assert_eq!(
        drain(&mut device),
        vec![Message::change(&"switch.lamp".into(), "on")]
    );
}

#[tokio::test]
async fn test_executable_posts_override_and_emits_nothing() {
    let (server, gateway, mut device) = setup(true).await;

    Mock::given(method("POST"))
        .and(path("/api/services/homeassistant/activate"))
        .and(body_json(json!({ "entity_id": "script.foo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let id = EntityId::from("script.foo");
    assert!(Gateway::is_executable(&id));
    gateway.change_entity(&id, "turn_on").await.unwrap();

    assert!(drain(&mut device).is_empty());
}

#[tokio::test]
async fn test_unknown_domain_fails_locally() {
    let (server, gateway, mut device) = setup(true).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = gateway
        .change_entity(&"sensor.temperature".into(), "turn_on")
        .await;

    assert!(
        matches!(result, Err(CoreError::UnknownDomain { ref domain, .. }) if domain == "sensor"),
        "got {result:?}"
    );
    assert!(drain(&mut device).is_empty());
}

#[tokio::test]
async fn test_failed_change_emits_nothing() {
    let (server, gateway, mut device) = setup(true).await;

    Mock::given(method("POST"))
        .and(path("/api/services/light/turn_on"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = gateway.change_entity(&"light.a".into(), "turn_on").await;

    assert!(matches!(result, Err(CoreError::Api { status: Some(500), .. })));
    assert!(drain(&mut device).is_empty());
}

// ── Change: read-back mode ──────────────────────────────────────────

#[tokio::test]
async fn test_read_back_reports_server_state_for_target() {
    let (server, gateway, mut device) = setup(false).await;

    Mock::given(method("POST"))
        .and(path("/api/services/cover/open_cover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "entity_id": "cover.blinds", "state": "open" },
            { "entity_id": "cover.garage", "state": "closed" }
        ])))
        .mount(&server)
        .await;

    gateway
        .change_entity(&"cover.blinds".into(), "open_cover")
        .await
        .unwrap();

    assert_eq!(
        drain(&mut device),
        vec![Message::change(&"cover.blinds".into(), "open")]
    );
}

#[tokio::test]
async fn test_read_back_without_matching_entry_emits_nothing() {
    let (server, gateway, mut device) = setup(false).await;

    Mock::given(method("POST"))
        .and(path("/api/services/cover/open_cover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "entity_id": "cover.garage", "state": "open" }
        ])))
        .mount(&server)
        .await;

    gateway
        .change_entity(&"cover.blinds".into(), "open_cover")
        .await
        .unwrap();

    assert!(drain(&mut device).is_empty());
}

#[tokio::test]
async fn test_read_back_never_reports_executables() {
    let (server, gateway, mut device) = setup(false).await;

    Mock::given(method("POST"))
        .and(path("/api/services/homeassistant/press"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "entity_id": "button.bell", "state": "2024-06-15T10:30:00Z" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    gateway
        .change_entity(&"button.bell".into(), "turn_on")
        .await
        .unwrap();

    assert!(drain(&mut device).is_empty());
}

// ── Timeout ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_slow_server_hits_transport_timeout() {
    let server = MockServer::start().await;
    let (host, mut device) = channel::pair();
    device.recv().await;

    let http = hassbridge_core::TransportConfig::default()
        .with_timeout(Duration::from_millis(200))
        .build_client()
        .unwrap();
    let gateway = Gateway::with_client(http, host.sender());
    configure_for(&gateway, &server, true);

    Mock::given(method("GET"))
        .and(path("/api/states/light.slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let result = gateway.fetch_entity(&"light.slow".into()).await;

    assert!(matches!(result, Err(CoreError::Timeout)), "got {result:?}");
    assert!(drain(&mut device).is_empty());
}
