//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//!
//! Messages are handled one at a time per socket, so a client cannot have two
//! generations or saves in flight on the same connection.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    Query, State, WebSocketUpgrade,
  },
  http::HeaderMap,
  response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use super::identity::user_from_headers;
use crate::error::QuizError;
use crate::logic;
use crate::protocol::{ClientWsMessage, FeedbackOut, ServerWsMessage, Severity};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
  pub user_id: Option<String>,
}

#[instrument(level = "info", skip(ws, state, headers, q))]
pub async fn ws_upgrade(
  ws: WebSocketUpgrade,
  State(state): State<Arc<AppState>>,
  Query(q): Query<WsQuery>,
  headers: HeaderMap,
) -> impl IntoResponse {
  let user = q
    .user_id
    .map(|u| u.trim().to_string())
    .filter(|u| !u.is_empty())
    .or_else(|| user_from_headers(&headers));
  info!(target: "quizcraft_backend", authenticated = user.is_some(), "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state, user))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, user: Option<String>) {
  info!(target: "quizcraft_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "quizcraft_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, user.as_deref()).await
          }
          Err(e) => ServerWsMessage::Error { feedback: FeedbackOut::new(Severity::Error, format!("Invalid JSON: {}", e)) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "feedback": { "kind": "error", "message": format!("Serialization error: {}", e) } }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "quizcraft_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => {
        let _ = socket.send(Message::Pong(payload)).await;
      }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "quizcraft_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, user: Option<&str>) -> ServerWsMessage {
  let user = match (&msg, user) {
    (ClientWsMessage::Ping, _) => return ServerWsMessage::Pong,
    (_, Some(user)) => user,
    (_, None) => return ServerWsMessage::Error { feedback: QuizError::NotAuthenticated.feedback() },
  };

  let result = match msg {
    ClientWsMessage::Ping => return ServerWsMessage::Pong,
    ClientWsMessage::Generate { prompt } => logic::generate_quiz(state, user, &prompt).await,
    ClientWsMessage::SelectAnswer { index, letter } => logic::select_answer(state, user, index, &letter).await,
    ClientWsMessage::Save => logic::save_active_quiz(state, user).await,
    ClientWsMessage::LoadSaved { quiz_id } => logic::load_saved_quiz(state, user, &quiz_id).await,
    ClientWsMessage::Active => Ok(logic::active_quiz(state, user).await),
  };

  match result {
    Ok(workspace) => ServerWsMessage::Workspace { workspace },
    Err(e) => {
      info!(target: "quiz", %user, error = %e, "WS request refused");
      ServerWsMessage::Error { feedback: e.feedback() }
    }
  }
}
