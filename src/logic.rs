//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Uploading a document and applying the summarizer's payload
//!   - Switching views and exporting the selected one
//!   - Quiz transitions (select, submit, retake)
//!   - The chat widget (user message now, bot reply after the configured delay)
//!   - Account and contact forms (validated locally, then forwarded)

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::View;
use crate::error::{ApiError, ValidationError};
use crate::export::Download;
use crate::forms::{ContactForm, LoginForm, RegisterForm};
use crate::protocol::*;
use crate::state::AppState;

fn parse_view(index: i64) -> Result<View, ApiError> {
  View::from_index(index).ok_or(ApiError::Validation(ValidationError::InvalidView(index)))
}

#[instrument(level = "debug", skip(state))]
pub async fn session_overview(state: &AppState, session_id: &str) -> Result<SessionOut, ApiError> {
  state.read_session(session_id, to_session_out).await
}

#[instrument(level = "info", skip(state, bytes), fields(size = bytes.len()))]
pub async fn upload_document(
  state: &AppState,
  session_id: &str,
  file_name: &str,
  bytes: Vec<u8>,
) -> Result<UploadOut, ApiError> {
  if bytes.is_empty() {
    return Err(ValidationError::EmptyFile.into());
  }
  let ticket = state.with_session(session_id, |s| s.views.begin_upload()).await?;

  // No lock held while the summarizer works.
  let payload = match state.backend.upload(file_name, bytes).await {
    Ok(p) => p,
    Err(e) => {
      error!(target: "study_assistant", %session_id, error = %e, "There was an error summarizing the document");
      return Err(e.into());
    }
  };
  let flashcards = payload.flashcards.len();
  let questions = payload.quiz.len();

  let (applied, generation) = state
    .with_session(session_id, |s| {
      let applied = s.views.apply_upload(ticket, payload);
      (applied, s.views.generation())
    })
    .await?;
  info!(target: "study_assistant", %session_id, applied, generation, flashcards, questions, "Document uploaded");
  Ok(UploadOut { applied, generation, flashcards, questions })
}

/// Decode a WebSocket upload (base64 file body) and forward it like a multipart one.
pub async fn upload_document_base64(
  state: &AppState,
  session_id: &str,
  file_name: &str,
  file_base64: &str,
) -> Result<UploadOut, ApiError> {
  let bytes = STANDARD
    .decode(file_base64.trim())
    .map_err(|e| ValidationError::InvalidBase64(e.to_string()))?;
  upload_document(state, session_id, file_name, bytes).await
}

#[instrument(level = "info", skip(state))]
pub async fn select_view(state: &AppState, session_id: &str, selected: i64) -> Result<ViewOut, ApiError> {
  let view = parse_view(selected)?;
  state
    .with_session(session_id, |s| {
      s.views.select(view);
      to_view_out(&s.views)
    })
    .await
}

pub async fn current_view(state: &AppState, session_id: &str) -> Result<ViewOut, ApiError> {
  state.read_session(session_id, |s| to_view_out(&s.views)).await
}

pub async fn quiz_snapshot(state: &AppState, session_id: &str) -> Result<QuizOut, ApiError> {
  state.read_session(session_id, |s| to_quiz_out(s.views.quiz())).await
}

#[instrument(level = "debug", skip(state))]
pub async fn select_answer(
  state: &AppState,
  session_id: &str,
  question_index: usize,
  answer_index: usize,
) -> Result<QuizOut, ApiError> {
  state
    .with_session(session_id, |s| {
      if !s.views.quiz_mut().select_answer(question_index, answer_index) {
        debug!(target: "quiz", %session_id, question_index, answer_index, "Selection ignored");
      }
      to_quiz_out(s.views.quiz())
    })
    .await
}

#[instrument(level = "info", skip(state))]
pub async fn submit_quiz(state: &AppState, session_id: &str) -> Result<QuizOut, ApiError> {
  state
    .with_session(session_id, |s| {
      let score = s.views.quiz_mut().submit();
      info!(target: "quiz", %session_id, score, total = s.views.quiz().total(), "Quiz submitted");
      to_quiz_out(s.views.quiz())
    })
    .await
}

#[instrument(level = "info", skip(state))]
pub async fn retake_quiz(state: &AppState, session_id: &str) -> Result<QuizOut, ApiError> {
  state
    .with_session(session_id, |s| {
      s.views.quiz_mut().retake();
      to_quiz_out(s.views.quiz())
    })
    .await
}

#[instrument(level = "info", skip(state))]
pub async fn export_view(state: &AppState, session_id: &str, selected: i64) -> Result<Download, ApiError> {
  let view = parse_view(selected)?;
  let data = state
    .read_session(session_id, |s| s.views.export_data(view))
    .await?
    .ok_or(ApiError::NoDocument)?;
  state.exporter.export(&data, view).await.ok_or(ApiError::ExportUnavailable)
}

/// Append the user's message, wait, then append the bot's reply. A reply whose
/// log was cleared during the wait is dropped.
#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub async fn send_chat(state: &AppState, session_id: &str, text: &str) -> Result<ChatOut, ApiError> {
  let mount = state.with_session(session_id, |s| s.chat.send(text)).await?;
  if let Some(mount) = mount {
    if !state.chat_delay.is_zero() {
      tokio::time::sleep(state.chat_delay).await;
    }
    let reply = state.responder.respond(text).to_string();
    debug!(target: "chat", %session_id, reply_len = reply.len(), "Bot reply selected");
    let pushed = state.with_session(session_id, |s| s.chat.push_reply(mount, reply)).await?;
    if !pushed {
      debug!(target: "chat", %session_id, "Chat cleared during reply delay, reply dropped");
    }
  }
  chat_log(state, session_id).await
}

pub async fn chat_log(state: &AppState, session_id: &str) -> Result<ChatOut, ApiError> {
  state.read_session(session_id, |s| ChatOut { messages: s.chat.messages().to_vec() }).await
}

pub async fn clear_chat(state: &AppState, session_id: &str) -> Result<ChatOut, ApiError> {
  state
    .with_session(session_id, |s| {
      s.chat.clear();
      ChatOut { messages: vec![] }
    })
    .await
}

#[instrument(level = "info", skip(state, form), fields(username = %form.username))]
pub async fn register(state: &AppState, form: RegisterForm) -> Result<OkOut, ApiError> {
  form.validate()?;
  if let Err(e) = state.backend.register(&form).await {
    warn!(target: "study_assistant", error = %e, "Error creating user");
    return Err(e.into());
  }
  Ok(OkOut { ok: true, message: "User Created".into() })
}

#[instrument(level = "info", skip(state, form))]
pub async fn login(state: &AppState, form: LoginForm, session_id: Option<&str>) -> Result<OkOut, ApiError> {
  form.validate()?;
  if let Err(e) = state.backend.login(&form).await {
    warn!(target: "study_assistant", error = %e, "Login rejected");
    return Err(e.into());
  }
  if let Some(id) = session_id {
    let email = form.email.clone();
    state.with_session(id, |s| s.user = Some(email)).await?;
  }
  Ok(OkOut { ok: true, message: "Login successful".into() })
}

#[instrument(level = "info", skip(state, form))]
pub async fn contact(state: &AppState, form: ContactForm) -> Result<OkOut, ApiError> {
  form.validate()?;
  if let Err(e) = state.backend.contact(&form).await {
    warn!(target: "study_assistant", error = %e, "Failed to send message");
    return Err(e.into());
  }
  Ok(OkOut { ok: true, message: "Message sent successfully!".into() })
}
