//! Shared test utilities: app state wired to a mock collaborator, request helpers.

#![allow(dead_code, unused_imports)]

pub mod mock_collaborator;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use study_assistant::config::{AppConfig, ChatConfig, Endpoints, SessionConfig};
use study_assistant::routes::build_router;
use study_assistant::state::AppState;

pub use mock_collaborator::{CapturedRequest, MockCollaborator, MockResponse};

pub const UPLOAD_JSON: &str = r###"{
  "summary": "## Overview\n\n**Cells** are the unit of life.",
  "flash_cards": [["What is a cell?", "The unit of life"], ["Organelle?", "A cell part"]],
  "quiz": [
    {"question": "Unit of life?", "possible_answers": ["Atom", "Cell", "Organ", "Tissue"], "index": 1},
    {"question": "Powerhouse?", "possible_answers": ["Nucleus", "Ribosome", "Mitochondria", "Golgi"], "index": 2},
    {"question": "Broken?", "possible_answers": ["A", "B"], "index": 9}
  ]
}"###;

/// Every collaborator URL points at the mock.
pub fn config_for(mock: &MockCollaborator) -> AppConfig {
    let base = mock.base_url();
    AppConfig {
        endpoints: Endpoints {
            summarizer_url: base.clone(),
            export_url: base.clone(),
            accounts_url: base,
            timeout_secs: 5,
        },
        chat: ChatConfig::default(),
        sessions: SessionConfig::default(),
    }
}

pub fn app_for(mock: &MockCollaborator) -> (Arc<AppState>, Router) {
    let state = Arc::new(AppState::with_config(config_for(mock)).expect("state"));
    let router = build_router(state.clone());
    (state, router)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response is not JSON")
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let resp = app.clone().oneshot(req).await.expect("router error");
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.into_body().collect().await.expect("body").to_bytes().to_vec();
    TestResponse { status, headers, body }
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

pub fn multipart_request(uri: &str, field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let boundary = "X-STUDY-BOUNDARY";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

/// Create a session through the API and return its id.
pub async fn new_session(app: &Router) -> String {
    let resp = send(app, empty_request(Method::POST, "/api/v1/sessions")).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    resp.json()["sessionId"].as_str().unwrap().to_string()
}

/// Create a session and load `UPLOAD_JSON` into it.
pub async fn session_with_document(app: &Router, mock: &MockCollaborator) -> String {
    let id = new_session(app).await;
    mock.enqueue(MockResponse::json(UPLOAD_JSON)).await;
    let resp = send(app, multipart_request(&format!("/api/v1/sessions/{id}/upload"), "file", "cells.pdf", b"%PDF-1.4 cells")).await;
    assert_eq!(resp.status, StatusCode::OK, "upload failed: {:?}", String::from_utf8_lossy(&resp.body));
    id
}

/// Serve the full router on an ephemeral port, for clients that need a real socket.
pub async fn serve_app(state: Arc<AppState>) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind app");
    let addr = listener.local_addr().expect("local addr");
    let router = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("app server");
    });
    addr
}
