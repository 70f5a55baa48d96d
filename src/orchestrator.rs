//! View orchestration: the single owner of the uploaded payload.
//!
//! Uploads are stamped with a ticket when they start. Only the result carrying
//! the most recent ticket is applied, so a superseded upload that finishes
//! late is dropped instead of overwriting newer content.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{ResponsePayload, View};
use crate::quiz::QuizEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadTicket(u64);

#[derive(Clone, Debug, Default)]
pub struct ViewOrchestrator {
  payload: Option<Arc<ResponsePayload>>,
  selected: View,
  quiz: QuizEngine,
  last_ticket: u64,
  generation: u64,
}

impl ViewOrchestrator {
  pub fn selected(&self) -> View { self.selected }

  pub fn select(&mut self, view: View) {
    self.selected = view;
  }

  pub fn payload(&self) -> Option<Arc<ResponsePayload>> { self.payload.clone() }

  /// Number of payloads applied so far.
  pub fn generation(&self) -> u64 { self.generation }

  pub fn begin_upload(&mut self) -> UploadTicket {
    self.last_ticket += 1;
    UploadTicket(self.last_ticket)
  }

  /// Returns false when the ticket has been superseded; nothing changes then.
  pub fn apply_upload(&mut self, ticket: UploadTicket, payload: ResponsePayload) -> bool {
    if ticket.0 != self.last_ticket {
      warn!(target: "study_assistant", ticket = ticket.0, latest = self.last_ticket, "Discarding stale upload result");
      return false;
    }
    self.quiz.initialize(payload.quiz.clone());
    self.payload = Some(Arc::new(payload));
    self.generation += 1;
    debug!(target: "study_assistant", generation = self.generation, questions = self.quiz.total(), "Applied new payload");
    true
  }

  pub fn quiz(&self) -> &QuizEngine { &self.quiz }

  pub fn quiz_mut(&mut self) -> &mut QuizEngine { &mut self.quiz }

  /// What the given view sends to the export service. None before the first upload.
  pub fn export_data(&self, view: View) -> Option<serde_json::Value> {
    let p = self.payload.as_ref()?;
    let data = match view {
      View::Summary => serde_json::Value::String(p.summary.clone()),
      View::Flashcards => serde_json::Value::Array(p.flashcards.clone()),
      View::Quiz => serde_json::to_value(self.quiz.questions()).ok()?,
    };
    Some(data)
  }
}
