//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//!
//! The socket is bound to one session: `?sessionId=` when it names a live
//! session, otherwise a fresh one announced with a `session` message. A session
//! the socket created itself is removed when the socket closes.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    Query, State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::error::ApiError;
use crate::logic;
use crate::protocol::{ClientWsMessage, ServerWsMessage, WsQuery};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(
  ws: WebSocketUpgrade,
  Query(q): Query<WsQuery>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  info!(target: "study_assistant", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state, q.session_id))
}

/// Returns the bound id and whether this socket created it.
async fn bind_session(state: &AppState, requested: Option<String>) -> (String, bool) {
  if let Some(id) = requested {
    if state.has_session(&id).await {
      return (id, false);
    }
  }
  (state.create_session().await.id, true)
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, requested: Option<String>) {
  let (session_id, owned) = bind_session(&state, requested).await;
  info!(target: "study_assistant", %session_id, owned, "WebSocket connected");

  let hello = match logic::session_overview(&state, &session_id).await {
    Ok(session) => ServerWsMessage::Session { session },
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  };
  if send_json(&mut socket, &hello).await.is_ok() {
    serve_socket(&mut socket, &state, &session_id).await;
  }

  if owned {
    state.remove_session(&session_id).await;
  }
  info!(target: "study_assistant", %session_id, "WebSocket disconnected");
}

async fn serve_socket(socket: &mut WebSocket, state: &AppState, session_id: &str) {
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "study_assistant", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, state, session_id).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        if let Err(e) = send_json(socket, &reply_msg).await {
          error!(target: "study_assistant", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
}

async fn send_json(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await
}

fn or_error<T>(res: Result<T, ApiError>, ok: impl FnOnce(T) -> ServerWsMessage) -> ServerWsMessage {
  match res {
    Ok(v) => ok(v),
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

#[instrument(level = "info", skip(msg, state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session_id: &str) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::GetView => {
      or_error(logic::current_view(state, session_id).await, |view| ServerWsMessage::View { view })
    }

    ClientWsMessage::SelectView { selected } => {
      or_error(logic::select_view(state, session_id, selected).await, |view| ServerWsMessage::View { view })
    }

    ClientWsMessage::GetQuiz => {
      or_error(logic::quiz_snapshot(state, session_id).await, |quiz| ServerWsMessage::Quiz { quiz })
    }

    ClientWsMessage::SelectAnswer { question_index, answer_index } => or_error(
      logic::select_answer(state, session_id, question_index, answer_index).await,
      |quiz| ServerWsMessage::Quiz { quiz },
    ),

    ClientWsMessage::SubmitQuiz => {
      or_error(logic::submit_quiz(state, session_id).await, |quiz| ServerWsMessage::Quiz { quiz })
    }

    ClientWsMessage::RetakeQuiz => {
      or_error(logic::retake_quiz(state, session_id).await, |quiz| ServerWsMessage::Quiz { quiz })
    }

    ClientWsMessage::Chat { text } => or_error(logic::send_chat(state, session_id, &text).await, |c| {
      ServerWsMessage::Chat { messages: c.messages }
    }),

    ClientWsMessage::ClearChat => or_error(logic::clear_chat(state, session_id).await, |c| {
      ServerWsMessage::Chat { messages: c.messages }
    }),

    ClientWsMessage::Upload { file_name, file_base64 } => or_error(
      logic::upload_document_base64(state, session_id, &file_name, &file_base64).await,
      |upload| ServerWsMessage::Uploaded { upload },
    ),
  }
}
