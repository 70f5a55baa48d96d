//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures render as `{ "error": ... }` via `ApiError`.

use std::sync::Arc;
use axum::{
  extract::{FromRequest, Multipart, Path, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::error::{ApiError, ValidationError};
use crate::forms::{ContactForm, RegisterForm};
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// `Json` whose rejections render through `ApiError`.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let session = state.create_session().await;
  (StatusCode::CREATED, Json(to_session_out(&session)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<SessionOut> {
  Ok(Json(logic::session_overview(&state, &id).await?))
}

#[instrument(level = "info", skip(state, multipart))]
pub async fn http_upload(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  mut multipart: Multipart,
) -> ApiResult<UploadOut> {
  while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::BadRequest(e.to_string()))? {
    if field.name() != Some("file") {
      continue;
    }
    let file_name = field.file_name().unwrap_or("document").to_string();
    let bytes = field.bytes().await.map_err(|e| ApiError::BadRequest(e.to_string()))?;
    info!(target: "study_assistant", session_id = %id, %file_name, size = bytes.len(), "HTTP upload received");
    let out = logic::upload_document(&state, &id, &file_name, bytes.to_vec()).await?;
    return Ok(Json(out));
  }
  Err(ValidationError::EmptyFile.into())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_view(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<ViewOut> {
  Ok(Json(logic::current_view(&state, &id).await?))
}

#[instrument(level = "info", skip(state), fields(selected = body.selected))]
pub async fn http_put_view(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<ViewIn>,
) -> ApiResult<ViewOut> {
  Ok(Json(logic::select_view(&state, &id, body.selected).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<QuizOut> {
  Ok(Json(logic::quiz_snapshot(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(q = body.question_index, a = body.answer_index))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<AnswerIn>,
) -> ApiResult<QuizOut> {
  Ok(Json(logic::select_answer(&state, &id, body.question_index, body.answer_index).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_submit(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<QuizOut> {
  Ok(Json(logic::submit_quiz(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_retake(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<QuizOut> {
  Ok(Json(logic::retake_quiz(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(selected = body.selected))]
pub async fn http_post_export(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<ExportIn>,
) -> Result<impl IntoResponse, ApiError> {
  let download = logic::export_view(&state, &id, body.selected).await?;
  info!(target: "export", session_id = %id, filename = download.filename, "HTTP export served");
  Ok(download)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_chat(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<ChatOut> {
  Ok(Json(logic::chat_log(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_chat(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<ChatIn>,
) -> ApiResult<ChatOut> {
  Ok(Json(logic::send_chat(&state, &id, &body.text).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_chat(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<ChatOut> {
  Ok(Json(logic::clear_chat(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_register(State(state): State<Arc<AppState>>, ApiJson(body): ApiJson<RegisterForm>) -> ApiResult<OkOut> {
  Ok(Json(logic::register(&state, body).await?))
}

#[instrument(level = "info", skip(state, body), fields(has_session = body.session_id.is_some()))]
pub async fn http_login(State(state): State<Arc<AppState>>, ApiJson(body): ApiJson<LoginIn>) -> ApiResult<OkOut> {
  Ok(Json(logic::login(&state, body.form, body.session_id.as_deref()).await?))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_contact(State(state): State<Arc<AppState>>, ApiJson(body): ApiJson<ContactForm>) -> ApiResult<OkOut> {
  Ok(Json(logic::contact(&state, body).await?))
}
