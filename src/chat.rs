//! Rule-based chat widget: the reply selector and the message log.

use serde::Deserialize;

use crate::config::ChatConfig;
use crate::domain::ChatMessage;

/// One keyword category. Matches when any keyword is a substring of the
/// lower-cased utterance.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ChatRule {
  pub keywords: Vec<String>,
  pub reply: String,
}

impl ChatRule {
  fn new(keywords: &[&str], reply: &str) -> Self {
    Self { keywords: keywords.iter().map(|k| k.to_string()).collect(), reply: reply.into() }
  }

  fn matches(&self, lowered: &str) -> bool {
    self.keywords.iter().any(|k| lowered.contains(k.as_str()))
  }
}

/// Ordered first-match-wins table.
#[derive(Clone, Debug)]
pub struct ChatResponder {
  rules: Vec<ChatRule>,
  fallback: String,
}

impl Default for ChatResponder {
  fn default() -> Self {
    Self {
      rules: vec![
        ChatRule::new(&["study", "learn"], "Great! What topic or subject would you like to focus on?"),
        ChatRule::new(&["help", "assist"], "I’m here to help! What do you need assistance with?"),
        ChatRule::new(&["quiz", "test"], "Would you like to take a quiz or practice test?"),
        ChatRule::new(
          &["notes", "summary"],
          "I can provide summaries or notes on various topics. Let me know what you need!",
        ),
        ChatRule::new(&["hello", "hi"], "Hello! How can I assist you today?"),
        ChatRule::new(&["bye", "goodbye"], "Goodbye! Have a great day!"),
      ],
      fallback: "I’m not sure how to help with that. Can you provide more details?".into(),
    }
  }
}

impl ChatResponder {
  /// Build from config; an empty rule list keeps the built-in table.
  pub fn from_config(cfg: &ChatConfig) -> Self {
    let mut out = Self::default();
    if !cfg.rules.is_empty() {
      out.rules = cfg
        .rules
        .iter()
        .map(|r| ChatRule {
          keywords: r.keywords.iter().map(|k| k.to_lowercase()).collect(),
          reply: r.reply.clone(),
        })
        .collect();
    }
    if let Some(fallback) = &cfg.fallback {
      out.fallback = fallback.clone();
    }
    out
  }

  pub fn respond(&self, utterance: &str) -> &str {
    let lowered = utterance.to_lowercase();
    self
      .rules
      .iter()
      .find(|r| r.matches(&lowered))
      .map_or(self.fallback.as_str(), |r| r.reply.as_str())
  }

  pub fn rules(&self) -> &[ChatRule] { &self.rules }
}

/// Append-only log owned by one chat widget. `generation` counts remounts so a
/// reply computed for an earlier mount can be recognised and dropped.
#[derive(Clone, Debug, Default)]
pub struct ChatLog {
  messages: Vec<ChatMessage>,
  generation: u64,
}

impl ChatLog {
  /// Append the user's message and return the mount it belongs to.
  /// Blank input is ignored.
  pub fn send(&mut self, text: &str) -> Option<u64> {
    if text.trim().is_empty() {
      return None;
    }
    self.messages.push(ChatMessage { text: text.to_string(), is_from_bot: false });
    Some(self.generation)
  }

  /// Append a bot reply unless the log was cleared since `generation` was taken.
  pub fn push_reply(&mut self, generation: u64, text: impl Into<String>) -> bool {
    if generation != self.generation {
      return false;
    }
    self.messages.push(ChatMessage { text: text.into(), is_from_bot: true });
    true
  }

  pub fn messages(&self) -> &[ChatMessage] { &self.messages }

  pub fn generation(&self) -> u64 { self.generation }

  /// Widget remount.
  pub fn clear(&mut self) {
    self.messages.clear();
    self.generation += 1;
  }
}
