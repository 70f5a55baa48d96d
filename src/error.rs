//! Error types and HTTP response mapping.
//!
//! `BackendError` covers calls to external collaborators, `ValidationError`
//! covers input rejected before any network call, and `ApiError` is what
//! handlers return.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Failures talking to the summarizer, export or accounts service.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Connection failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Malformed upstream response: {0}")]
    Decode(String),

    #[error("Invalid email or password")]
    InvalidCredentials,
}

/// Input rejected locally; nothing was sent anywhere.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill all the fields (missing '{0}')")]
    MissingField(&'static str),

    #[error("You must accept the terms and conditions")]
    TermsNotAccepted,

    #[error("Unknown view index {0}; expected 0, 1 or 2")]
    InvalidView(i64),

    #[error("No file provided")]
    EmptyFile,

    #[error("Invalid base64 file content: {0}")]
    InvalidBase64(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown session '{0}'")]
    UnknownSession(String),

    #[error("No document has been uploaded yet")]
    NoDocument,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Export failed; no document was produced")]
    ExportUnavailable,

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnknownSession(_) => StatusCode::NOT_FOUND,
            ApiError::NoDocument => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Backend(BackendError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
            ApiError::ExportUnavailable => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Malformed or mistyped JSON bodies get the same `{ "error": ... }` shape.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}
