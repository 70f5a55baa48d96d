//! Minimal client for the external collaborators: summarizer, export service, accounts service.
//!
//! Calls are instrumented and log endpoints, latencies and payload sizes (not contents).
//! Passwords and uploaded file bytes are never logged.

use std::time::{Duration, Instant};

use axum::body::Bytes;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::config::Endpoints;
use crate::domain::{ResponsePayload, View};
use crate::error::BackendError;
use crate::forms::{ContactForm, LoginForm, RegisterForm};

const UA: &str = concat!("study-assistant/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct StudyBackend {
  pub client: reqwest::Client,
  pub summarizer_url: String,
  pub export_url: String,
  pub accounts_url: String,
}

#[derive(Serialize)]
struct ExportReq<'a> {
  data: &'a serde_json::Value,
  selected: u8,
}

impl StudyBackend {
  pub fn new(endpoints: &Endpoints) -> Result<Self, BackendError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(endpoints.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      summarizer_url: trim_base(&endpoints.summarizer_url),
      export_url: trim_base(&endpoints.export_url),
      accounts_url: trim_base(&endpoints.accounts_url),
    })
  }

  /// Send a document to the summarizer; the response body becomes the payload.
  #[instrument(level = "info", skip(self, bytes), fields(%file_name, size = bytes.len()))]
  pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<ResponsePayload, BackendError> {
    let url = format!("{}/upload", self.summarizer_url);
    let part = Part::bytes(bytes).file_name(file_name.to_string());
    let form = Form::new().part("file", part);

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, UA)
      .multipart(form)
      .send().await?;
    let res = ensure_success(res).await?;
    let body = res.bytes().await?;
    let payload = serde_json::from_slice::<ResponsePayload>(&body)
      .map_err(|e| BackendError::Decode(e.to_string()))?;
    info!(
      elapsed = ?start.elapsed(),
      summary_len = payload.summary.len(),
      flashcards = payload.flashcards.len(),
      quiz = payload.quiz.len(),
      "Summarizer response received"
    );
    Ok(payload)
  }

  /// Ask the export service to render `data` as a document.
  #[instrument(level = "info", skip(self, data), fields(view = view.label()))]
  pub async fn export(&self, data: &serde_json::Value, view: View) -> Result<Bytes, BackendError> {
    let url = format!("{}/export", self.export_url);
    let req = ExportReq { data, selected: view.index() };
    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, UA)
      .header(CONTENT_TYPE, "application/json")
      .json(&req).send().await?;
    let res = ensure_success(res).await?;
    let bytes = res.bytes().await?;
    info!(elapsed = ?start.elapsed(), size = bytes.len(), "Export document received");
    Ok(bytes)
  }

  #[instrument(level = "info", skip(self, form), fields(username = %form.username))]
  pub async fn register(&self, form: &RegisterForm) -> Result<(), BackendError> {
    let url = format!("{}/register", self.accounts_url);
    let res = self.client.post(&url).header(USER_AGENT, UA).json(form).send().await?;
    ensure_success(res).await?;
    Ok(())
  }

  /// Credentials are verified by the accounts service; nothing is compared here.
  #[instrument(level = "info", skip(self, form))]
  pub async fn login(&self, form: &LoginForm) -> Result<(), BackendError> {
    let url = format!("{}/login", self.accounts_url);
    let res = self.client.post(&url).header(USER_AGENT, UA).json(form).send().await?;
    match res.status() {
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
        Err(BackendError::InvalidCredentials)
      }
      _ => ensure_success(res).await.map(|_| ()),
    }
  }

  #[instrument(level = "info", skip(self, form), fields(message_len = form.message.len()))]
  pub async fn contact(&self, form: &ContactForm) -> Result<(), BackendError> {
    let url = format!("{}/contact", self.accounts_url);
    let res = self.client.post(&url).header(USER_AGENT, UA).json(form).send().await?;
    ensure_success(res).await?;
    Ok(())
  }
}

fn trim_base(url: &str) -> String {
  url.trim_end_matches('/').to_string()
}

async fn ensure_success(res: Response) -> Result<Response, BackendError> {
  if res.status().is_success() {
    return Ok(res);
  }
  let status = res.status();
  let body = res.text().await.unwrap_or_default();
  let message = extract_error_message(&body).unwrap_or(body);
  error!(status = status.as_u16(), %message, "Collaborator returned an error status");
  Err(BackendError::Status { status: status.as_u16(), message })
}

/// Pull a human message out of `{"error": ..}`, `{"message": ..}` or `{"detail": ..}` bodies.
fn extract_error_message(body: &str) -> Option<String> {
  let v: serde_json::Value = serde_json::from_str(body).ok()?;
  ["error", "message", "detail"]
    .iter()
    .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
}
