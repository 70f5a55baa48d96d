//! Quiz evaluation: answer selection, scoring and retake.
//!
//! All transitions are synchronous and run to completion. Malformed questions
//! coming from the summarizer (empty answer lists, out-of-range correct index)
//! are scored as "never correct" instead of being rejected.

use serde::Serialize;

use crate::domain::QuizQuestion;

/// Visual classification of one answer option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionState {
  Neutral,
  Correct,
  IncorrectSelection,
}

#[derive(Clone, Debug, Default)]
pub struct QuizEngine {
  questions: Vec<QuizQuestion>,
  user_answers: Vec<Option<usize>>,
  submitted: bool,
  score: Option<usize>,
}

impl QuizEngine {
  pub fn new(questions: Vec<QuizQuestion>) -> Self {
    let mut engine = Self::default();
    engine.initialize(questions);
    engine
  }

  /// Replace the quiz wholesale. Every answer starts unset.
  pub fn initialize(&mut self, questions: Vec<QuizQuestion>) {
    self.user_answers = vec![None; questions.len()];
    self.questions = questions;
    self.submitted = false;
    self.score = None;
  }

  /// Record a selection. Returns false (and changes nothing) once submitted
  /// or when the question index does not exist.
  pub fn select_answer(&mut self, question_index: usize, answer_index: usize) -> bool {
    if self.submitted {
      return false;
    }
    match self.user_answers.get_mut(question_index) {
      Some(slot) => {
        *slot = Some(answer_index);
        true
      }
      None => false,
    }
  }

  /// Score the current selections. Calling it again returns the stored score.
  pub fn submit(&mut self) -> usize {
    if let Some(score) = self.score {
      return score;
    }
    let score = self
      .questions
      .iter()
      .zip(&self.user_answers)
      .filter(|(q, a)| a.map_or(false, |a| q.is_correct(a)))
      .count();
    self.score = Some(score);
    self.submitted = true;
    score
  }

  pub fn retake(&mut self) {
    self.user_answers.iter_mut().for_each(|a| *a = None);
    self.submitted = false;
    self.score = None;
  }

  pub fn option_state(&self, question_index: usize, answer_index: usize) -> OptionState {
    if !self.submitted {
      return OptionState::Neutral;
    }
    let Some(question) = self.questions.get(question_index) else {
      return OptionState::Neutral;
    };
    if question.is_correct(answer_index) {
      OptionState::Correct
    } else if self.user_answers[question_index] == Some(answer_index) {
      OptionState::IncorrectSelection
    } else {
      OptionState::Neutral
    }
  }

  pub fn questions(&self) -> &[QuizQuestion] { &self.questions }

  pub fn user_answers(&self) -> &[Option<usize>] { &self.user_answers }

  pub fn is_submitted(&self) -> bool { self.submitted }

  pub fn score(&self) -> Option<usize> { self.score }

  pub fn total(&self) -> usize { self.questions.len() }

  pub fn answered_count(&self) -> usize {
    self.user_answers.iter().filter(|a| a.is_some()).count()
  }
}
