//! Domain models: the summarizer payload, quiz questions, chat messages and views.

use serde::{Deserialize, Serialize};

/// One multiple-choice question as produced by the summarization backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizQuestion {
  #[serde(rename = "question")]
  pub prompt: String,
  #[serde(default)]
  pub possible_answers: Vec<String>,
  /// Signed on purpose: the collaborator is not trusted to stay in range.
  #[serde(rename = "index")]
  pub correct_index: i64,
}

impl QuizQuestion {
  /// True if `answer_index` is the correct option.
  /// An out-of-range `correct_index` never matches anything.
  pub fn is_correct(&self, answer_index: usize) -> bool {
    answer_index < self.possible_answers.len()
      && i64::try_from(answer_index).map_or(false, |a| a == self.correct_index)
  }
}

/// Output bundle of the summarization backend. Immutable once received.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct ResponsePayload {
  #[serde(default)]
  pub summary: String,
  /// Cards are opaque to us; the summarizer currently emits `[front, back]` pairs.
  #[serde(default, alias = "flash_cards")]
  pub flashcards: Vec<serde_json::Value>,
  #[serde(default)]
  pub quiz: Vec<QuizQuestion>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
  pub text: String,
  #[serde(rename = "isFromBot")]
  pub is_from_bot: bool,
}

/// Mutually exclusive display modes, addressed by selection index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum View {
  #[default]
  Summary,
  Flashcards,
  Quiz,
}

impl View {
  pub const ALL: [View; 3] = [View::Summary, View::Flashcards, View::Quiz];

  pub fn from_index(index: i64) -> Option<Self> {
    match index {
      0 => Some(View::Summary),
      1 => Some(View::Flashcards),
      2 => Some(View::Quiz),
      _ => None,
    }
  }

  pub fn index(self) -> u8 {
    match self {
      View::Summary => 0,
      View::Flashcards => 1,
      View::Quiz => 2,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      View::Summary => "Summary",
      View::Flashcards => "Flashcards",
      View::Quiz => "Quiz",
    }
  }

  /// Name of the document offered for download when this view is exported.
  pub fn export_filename(self) -> &'static str {
    match self {
      View::Summary => "Summary.docx",
      View::Flashcards => "Flashcards.docx",
      View::Quiz => "Quiz.docx",
    }
  }
}
