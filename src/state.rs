//! Application state: in-memory session store, collaborator clients and the chat table.
//!
//! This module owns:
//!   - sessions (by id), each with its own view orchestrator and chat log
//!   - the client for the summarizer/export/accounts collaborators
//!   - the chat responder (from TOML or defaults)
//!
//! Sessions never share mutable state; the store lock is only held for
//! synchronous transitions, never across a network call. The store is bounded:
//! idle sessions are swept and creation past `max_sessions` evicts the least
//! recently used one.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::backend::StudyBackend;
use crate::chat::{ChatLog, ChatResponder};
use crate::config::{resolve_config, AppConfig};
use crate::error::{ApiError, BackendError};
use crate::export::ExportRequester;
use crate::orchestrator::ViewOrchestrator;

/// One browser tab's state.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub views: ViewOrchestrator,
    pub chat: ChatLog,
    /// Email of the signed-in user, if any.
    pub user: Option<String>,
    last_seen: Instant,
}

impl Session {
    fn new(id: String) -> Self {
        Self {
            id,
            views: ViewOrchestrator::default(),
            chat: ChatLog::default(),
            user: None,
            last_seen: Instant::now(),
        }
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
    pub backend: StudyBackend,
    pub exporter: ExportRequester,
    pub responder: ChatResponder,
    pub chat_delay: Duration,
    pub idle_ttl: Duration,
    pub sweep_interval: Duration,
    pub max_sessions: usize,
}

impl AppState {
    /// Build state from env: STUDY_CONFIG_PATH plus endpoint overrides.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::with_config(resolve_config())
    }

    #[instrument(level = "info", skip_all)]
    pub fn with_config(cfg: AppConfig) -> Result<Self, BackendError> {
        let backend = StudyBackend::new(&cfg.endpoints)?;
        let responder = ChatResponder::from_config(&cfg.chat);
        info!(
            target: "study_assistant",
            summarizer = %backend.summarizer_url,
            export = %backend.export_url,
            accounts = %backend.accounts_url,
            chat_rules = responder.rules().len(),
            idle_ttl_secs = cfg.sessions.idle_ttl_secs,
            max_sessions = cfg.sessions.max_sessions,
            "Collaborator endpoints configured"
        );
        Ok(Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            exporter: ExportRequester::new(backend.clone()),
            backend,
            responder,
            chat_delay: Duration::from_millis(cfg.chat.reply_delay_ms),
            idle_ttl: Duration::from_secs(cfg.sessions.idle_ttl_secs),
            sweep_interval: Duration::from_secs(cfg.sessions.sweep_interval_secs.max(1)),
            max_sessions: cfg.sessions.max_sessions.max(1),
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn create_session(&self) -> Session {
        let session = Session::new(Uuid::new_v4().to_string());
        let mut sessions = self.sessions.write().await;
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions.values().max_by_key(|s| s.idle_for()).map(|s| s.id.clone()) else {
                break;
            };
            sessions.remove(&oldest);
            info!(target: "study_assistant", id = %oldest, "Session evicted (store full)");
        }
        sessions.insert(session.id.clone(), session.clone());
        info!(target: "study_assistant", id = %session.id, "Session created");
        session
    }

    /// Run a synchronous transition against one session.
    pub async fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut Session) -> R) -> Result<R, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or_else(|| ApiError::UnknownSession(id.to_string()))?;
        session.last_seen = Instant::now();
        Ok(f(session))
    }

    /// Read one session. Takes the write lock because every access refreshes
    /// the idle clock.
    pub async fn read_session<R>(&self, id: &str, f: impl FnOnce(&Session) -> R) -> Result<R, ApiError> {
        self.with_session(id, |s| f(s)).await
    }

    pub async fn has_session(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn remove_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(target: "study_assistant", %id, "Session removed");
        }
        removed
    }

    /// Drop every session idle for at least `max_idle`. Returns how many went.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.idle_for() < max_idle);
        let swept = before - sessions.len();
        if swept > 0 {
            info!(target: "study_assistant", swept, remaining = sessions.len(), "Idle sessions swept");
        }
        swept
    }
}

/// Background task that sweeps idle sessions every `sweep_interval`.
pub fn spawn_session_sweeper(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(state.sweep_interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            let swept = state.sweep_idle(state.idle_ttl).await;
            debug!(target: "study_assistant", swept, "Session sweep finished");
        }
    })
}
