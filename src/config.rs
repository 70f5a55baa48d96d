//! Loading service configuration (collaborator endpoints + chat table) from TOML.
//!
//! See `AppConfig` for the expected schema. Every section is optional; missing
//! values fall back to the defaults below, then env overrides are applied.

use serde::Deserialize;
use tracing::{error, info};

use crate::chat::ChatRule;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub endpoints: Endpoints,
  #[serde(default)]
  pub chat: ChatConfig,
  #[serde(default)]
  pub sessions: SessionConfig,
}

/// Base URLs of the external collaborators.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Endpoints {
  pub summarizer_url: String,
  pub export_url: String,
  pub accounts_url: String,
  /// Summarization runs a local model and can take minutes.
  pub timeout_secs: u64,
}

impl Default for Endpoints {
  fn default() -> Self {
    Self {
      summarizer_url: "http://127.0.0.1:5000".into(),
      export_url: "http://127.0.0.1:8000".into(),
      accounts_url: "http://localhost:8090".into(),
      timeout_secs: 300,
    }
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ChatConfig {
  #[serde(default)]
  pub reply_delay_ms: u64,
  #[serde(default)]
  pub fallback: Option<String>,
  /// Evaluated top to bottom. Empty keeps the built-in table.
  #[serde(default)]
  pub rules: Vec<ChatRule>,
}

/// Bounds on the in-memory session store.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
  /// Sessions untouched for this long are swept.
  pub idle_ttl_secs: u64,
  pub sweep_interval_secs: u64,
  /// Creating a session past this evicts the least recently used one.
  pub max_sessions: usize,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self { idle_ttl_secs: 3600, sweep_interval_secs: 60, max_sessions: 10_000 }
  }
}

pub fn parse_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from STUDY_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("STUDY_CONFIG_PATH").ok()?;
  load_config_file(&path)
}

pub fn load_config_file(path: &str) -> Option<AppConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "study_assistant", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "study_assistant", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "study_assistant", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Config file (or defaults) with SUMMARIZER_URL / EXPORT_URL / ACCOUNTS_URL applied on top.
pub fn resolve_config() -> AppConfig {
  let mut cfg = load_config_from_env().unwrap_or_default();
  apply_env_overrides(&mut cfg.endpoints, |k| std::env::var(k).ok());
  cfg
}

fn apply_env_overrides(endpoints: &mut Endpoints, get: impl Fn(&str) -> Option<String>) {
  if let Some(v) = get("SUMMARIZER_URL") { endpoints.summarizer_url = v; }
  if let Some(v) = get("EXPORT_URL") { endpoints.export_url = v; }
  if let Some(v) = get("ACCOUNTS_URL") { endpoints.accounts_url = v; }
}
