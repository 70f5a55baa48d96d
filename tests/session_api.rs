mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::*;

#[tokio::test]
async fn health_ok() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let resp = send(&app, empty_request(Method::GET, "/api/v1/health")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json(), json!({"ok": true}));
}

#[tokio::test]
async fn unknown_session_is_404() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let resp = send(&app, empty_request(Method::GET, "/api/v1/sessions/nope/quiz")).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.json()["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn upload_forwards_file_field_and_loads_views() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let id = session_with_document(&app, &mock).await;

    let captured = mock.captured().await;
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].path, "/upload");
    assert!(captured[0].content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&captured[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("cells.pdf"));

    let session = send(&app, empty_request(Method::GET, &format!("/api/v1/sessions/{id}"))).await.json();
    assert_eq!(session["hasDocument"], true);
    assert_eq!(session["generation"], 1);
    assert_eq!(session["view"], "Summary");

    let view = send(&app, empty_request(Method::GET, &format!("/api/v1/sessions/{id}/view"))).await.json();
    assert_eq!(view["view"], "summary");
    assert!(view["summary"].as_str().unwrap().starts_with("## Overview"));

    let view = send(
        &app,
        json_request(Method::PUT, &format!("/api/v1/sessions/{id}/view"), json!({"selected": 1})),
    )
    .await
    .json();
    assert_eq!(view["view"], "flashcards");
    assert_eq!(view["cards"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn failed_upload_keeps_previous_document() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let id = session_with_document(&app, &mock).await;

    mock.enqueue(MockResponse::error(500, "model crashed")).await;
    let resp = send(
        &app,
        multipart_request(&format!("/api/v1/sessions/{id}/upload"), "file", "other.pdf", b"other"),
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert!(resp.json()["error"].as_str().unwrap().contains("model crashed"));

    let session = send(&app, empty_request(Method::GET, &format!("/api/v1/sessions/{id}"))).await.json();
    assert_eq!(session["generation"], 1);
    let quiz = send(&app, empty_request(Method::GET, &format!("/api/v1/sessions/{id}/quiz"))).await.json();
    assert_eq!(quiz["total"], 3);
}

#[tokio::test]
async fn upload_without_file_field_is_rejected_locally() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let id = new_session(&app).await;
    let resp = send(
        &app,
        multipart_request(&format!("/api/v1/sessions/{id}/upload"), "document", "a.pdf", b"data"),
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(mock.captured().await.is_empty());
}

#[tokio::test]
async fn invalid_view_index_is_rejected() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let id = new_session(&app).await;
    let resp = send(
        &app,
        json_request(Method::PUT, &format!("/api/v1/sessions/{id}/view"), json!({"selected": 3})),
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_body_gets_error_envelope() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let id = new_session(&app).await;

    let resp = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/v1/sessions/{id}/quiz/answer"),
            json!({"questionIndex": -1, "answerIndex": 0}),
        ),
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.json()["error"].as_str().unwrap().starts_with("Invalid request"));

    let resp = send(
        &app,
        axum::http::Request::builder()
            .method(Method::POST)
            .uri(format!("/api/v1/sessions/{id}/chat"))
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{oops"))
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.json()["error"].is_string());
}

#[tokio::test]
async fn quiz_answer_submit_retake_cycle() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let id = session_with_document(&app, &mock).await;
    let answer = format!("/api/v1/sessions/{id}/quiz/answer");

    // first question right, second wrong, third has an out-of-range index
    for (q, a) in [(0, 1), (1, 0), (2, 1)] {
        let resp = send(&app, json_request(Method::POST, &answer, json!({"questionIndex": q, "answerIndex": a}))).await;
        assert_eq!(resp.status, StatusCode::OK);
    }
    let quiz = send(&app, empty_request(Method::GET, &format!("/api/v1/sessions/{id}/quiz"))).await.json();
    assert_eq!(quiz["answered"], 3);
    assert_eq!(quiz["submitted"], false);
    assert!(quiz["score"].is_null());
    assert_eq!(quiz["questions"][1]["options"][0]["state"], "neutral");

    let quiz = send(&app, empty_request(Method::POST, &format!("/api/v1/sessions/{id}/quiz/submit"))).await.json();
    assert_eq!(quiz["submitted"], true);
    assert_eq!(quiz["score"], 1);
    assert_eq!(quiz["total"], 3);
    assert_eq!(quiz["questions"][1]["options"][0]["state"], "incorrect_selection");
    assert_eq!(quiz["questions"][1]["options"][2]["state"], "correct");
    assert_eq!(quiz["questions"][2]["options"][1]["state"], "incorrect_selection");

    // frozen after submit
    let quiz = send(&app, json_request(Method::POST, &answer, json!({"questionIndex": 1, "answerIndex": 2}))).await.json();
    assert_eq!(quiz["questions"][1]["selected"], 0);
    let quiz = send(&app, empty_request(Method::POST, &format!("/api/v1/sessions/{id}/quiz/submit"))).await.json();
    assert_eq!(quiz["score"], 1);

    let quiz = send(&app, empty_request(Method::POST, &format!("/api/v1/sessions/{id}/quiz/retake"))).await.json();
    assert_eq!(quiz["submitted"], false);
    assert_eq!(quiz["answered"], 0);
    assert!(quiz["score"].is_null());

    let quiz = send(&app, empty_request(Method::POST, &format!("/api/v1/sessions/{id}/quiz/submit"))).await.json();
    assert_eq!(quiz["score"], 0);
}

#[tokio::test]
async fn export_flashcards_downloads_named_document() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let id = session_with_document(&app, &mock).await;

    mock.enqueue(MockResponse::binary(b"PK\x03\x04docx")).await;
    let resp = send(
        &app,
        json_request(Method::POST, &format!("/api/v1/sessions/{id}/export"), json!({"selected": 1})),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.headers.get("content-disposition").unwrap(),
        "attachment; filename=\"Flashcards.docx\""
    );
    assert_eq!(resp.body, b"PK\x03\x04docx");

    let captured = mock.captured().await;
    let export = captured.last().unwrap();
    assert_eq!(export.path, "/export");
    let body = export.json();
    assert_eq!(body["selected"], 1);
    assert_eq!(body["data"][0], json!(["What is a cell?", "The unit of life"]));
}

#[tokio::test]
async fn export_quiz_sends_wire_shape() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let id = session_with_document(&app, &mock).await;

    mock.enqueue(MockResponse::binary(b"doc")).await;
    let resp = send(
        &app,
        json_request(Method::POST, &format!("/api/v1/sessions/{id}/export"), json!({"selected": 2})),
    )
    .await;
    assert_eq!(resp.headers.get("content-disposition").unwrap(), "attachment; filename=\"Quiz.docx\"");
    let body = mock.captured().await.last().unwrap().json();
    assert_eq!(body["data"][0]["question"], "Unit of life?");
    assert_eq!(body["data"][0]["index"], 1);
}

#[tokio::test]
async fn export_failure_produces_no_download_and_keeps_state() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let id = session_with_document(&app, &mock).await;
    send(&app, json_request(Method::PUT, &format!("/api/v1/sessions/{id}/view"), json!({"selected": 2}))).await;

    mock.enqueue(MockResponse::error(500, "converter down")).await;
    let resp = send(
        &app,
        json_request(Method::POST, &format!("/api/v1/sessions/{id}/export"), json!({"selected": 0})),
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert!(resp.headers.get("content-disposition").is_none());

    let session = send(&app, empty_request(Method::GET, &format!("/api/v1/sessions/{id}"))).await.json();
    assert_eq!(session["selected"], 2);
    assert_eq!(session["hasDocument"], true);
}

#[tokio::test]
async fn export_before_upload_is_conflict() {
    let mock = MockCollaborator::start().await;
    let (_, app) = app_for(&mock);
    let id = new_session(&app).await;
    let resp = send(
        &app,
        json_request(Method::POST, &format!("/api/v1/sessions/{id}/export"), json!({"selected": 0})),
    )
    .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert!(mock.captured().await.is_empty());
}
