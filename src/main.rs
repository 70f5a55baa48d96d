//! Study Assistant · Backend
//!
//! - Axum HTTP + WebSocket API for the summary / flashcards / quiz views and the chat widget
//! - Forwards uploads, exports and account forms to the external services
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   STUDY_CONFIG_PATH : path to TOML config (endpoints + chat table)
//!   SUMMARIZER_URL    : default "http://127.0.0.1:5000"
//!   EXPORT_URL        : default "http://127.0.0.1:8000"
//!   ACCOUNTS_URL      : default "http://localhost:8090"
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use study_assistant::routes::build_router;
use study_assistant::state::{spawn_session_sweeper, AppState};
use study_assistant::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared application state (session store, collaborator client, chat table).
  let state = Arc::new(AppState::from_env()?);

  let app = build_router(state.clone());

  // Idle sessions are dropped in the background.
  spawn_session_sweeper(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "study_assistant", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "study_assistant", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "study_assistant", "Shutdown signal received");
}
