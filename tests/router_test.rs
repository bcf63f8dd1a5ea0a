use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use greeter_object::config::{CorsConfig, ObjectConfig};
use greeter_object::greeter::Flavor;
use greeter_object::lifecycle::GreeterSystem;
use greeter_object::server;
use object_framework::mock::{test_peer, FlakyStore};
use object_framework::{DurableStore, MemoryStore, ObjectStub};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(store: Arc<dyn DurableStore>, flavor: Flavor) -> (Router, Arc<GreeterSystem>) {
    let config = ObjectConfig {
        flavor,
        ..ObjectConfig::default()
    };
    let system = Arc::new(GreeterSystem::new(store, &config));
    let app = server::router(system.clone(), &CorsConfig::default()).expect("router");
    (app, system)
}

fn app(flavor: Flavor) -> (Router, Arc<GreeterSystem>) {
    app_with(Arc::new(MemoryStore::new()), flavor)
}

async fn send(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_ws_without_upgrade_is_426() {
    let (app, _) = app(Flavor::Presence);

    let (status, body) = send(&app, Method::GET, "/ws", "").await;

    assert_eq!(status, StatusCode::UPGRADE_REQUIRED);
    assert_eq!(body, "Expected websocket request");
}

#[tokio::test]
async fn test_hello_uses_query_or_stored_name() {
    let (app, _) = app(Flavor::Presence);

    assert_eq!(
        send(&app, Method::GET, "/", "").await,
        (StatusCode::OK, "Hello, World!".to_string())
    );
    assert_eq!(
        send(&app, Method::GET, "/?name=Sam", "").await,
        (StatusCode::OK, "Hello, Sam!".to_string())
    );
}

#[tokio::test]
async fn test_post_greeting_and_name_echo() {
    let (app, _) = app(Flavor::Presence);

    assert_eq!(
        send(&app, Method::POST, "/greeting", "Hi").await,
        (StatusCode::OK, "Set greeting to \"Hi\"".to_string())
    );
    assert_eq!(
        send(&app, Method::POST, "/name", "Sam").await,
        (StatusCode::OK, "Set name to \"Sam\"".to_string())
    );
    assert_eq!(
        send(&app, Method::GET, "/greeting", "").await,
        (StatusCode::OK, "Hi".to_string())
    );
    assert_eq!(
        send(&app, Method::GET, "/", "").await,
        (StatusCode::OK, "Hi, Sam!".to_string())
    );
}

#[tokio::test]
async fn test_http_write_reaches_streams() {
    let (app, system) = app(Flavor::Presence);
    let (sender, mut peer) = test_peer();
    system.object().accept_stream(sender).await.unwrap();
    peer.drain();

    send(&app, Method::POST, "/greeting", "Howdy").await;

    assert_eq!(peer.next_json(), Some(json!({ "hello": "Howdy, World!" })));
}

#[tokio::test]
async fn test_basic_flavor_routes() {
    let (app, _) = app(Flavor::Basic);

    assert_eq!(
        send(&app, Method::GET, "/", "").await,
        (StatusCode::OK, "Hello, world!".to_string())
    );
    assert_eq!(
        send(&app, Method::GET, "/?name=Sam", "").await,
        (StatusCode::OK, "Hello, Sam!".to_string())
    );
    let (status, _) = send(&app, Method::POST, "/name", "Sam").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_failure_is_500() {
    let store = Arc::new(FlakyStore::new());
    let (app, _) = app_with(store.clone(), Flavor::Presence);
    store.fail_puts(true);

    let (status, body) = send(&app, Method::POST, "/greeting", "Hi").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.starts_with("Storage error"), "{body}");
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let (app, _) = app(Flavor::Presence);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/greeting")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_policy_skips_ws() {
    let (app, _) = app(Flavor::Presence);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/ws")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_headers_on_http_routes() {
    let (app, _) = app(Flavor::Presence);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/greeting")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
}
