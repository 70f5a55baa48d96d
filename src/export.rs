//! Export of the current view as a downloadable document.
//!
//! Failures are logged and swallowed: the caller only learns that no
//! download was produced.

use axum::body::Bytes;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use tracing::{error, info, instrument};

use crate::backend::StudyBackend;
use crate::domain::View;

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A finished document, ready to be handed to the browser.
#[derive(Clone, Debug)]
pub struct Download {
  pub filename: &'static str,
  pub bytes: Bytes,
}

impl IntoResponse for Download {
  fn into_response(self) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", self.filename);
    ([(CONTENT_TYPE, DOCX_MIME.to_string()), (CONTENT_DISPOSITION, disposition)], self.bytes).into_response()
  }
}

#[derive(Clone, Debug)]
pub struct ExportRequester {
  backend: StudyBackend,
}

impl ExportRequester {
  pub fn new(backend: StudyBackend) -> Self {
    Self { backend }
  }

  #[instrument(level = "info", skip(self, data), fields(view = view.label()))]
  pub async fn export(&self, data: &serde_json::Value, view: View) -> Option<Download> {
    match self.backend.export(data, view).await {
      Ok(bytes) => {
        info!(target: "export", filename = view.export_filename(), size = bytes.len(), "Export ready");
        Some(Download { filename: view.export_filename(), bytes })
      }
      Err(e) => {
        error!(target: "export", view = view.label(), error = %e, "There was an error exporting the document");
        None
      }
    }
  }
}
