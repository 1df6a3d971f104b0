//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use super::identity::CurrentUser;
use crate::error::QuizError;
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, generator: state.generator_name() })
}

#[instrument(level = "info", skip(state, body), fields(user = %user.0, prompt_len = body.prompt.len()))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  user: CurrentUser,
  Json(body): Json<GenerateIn>,
) -> Result<Json<WorkspaceOut>, QuizError> {
  let out = logic::generate_quiz(&state, &user.0, &body.prompt).await?;
  info!(target: "quiz", user = %user.0, "HTTP quiz generated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(user = %user.0))]
pub async fn http_get_active(State(state): State<Arc<AppState>>, user: CurrentUser) -> Json<WorkspaceOut> {
  Json(logic::active_quiz(&state, &user.0).await)
}

#[instrument(level = "info", skip(state, body), fields(user = %user.0, index = body.index))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  user: CurrentUser,
  Json(body): Json<AnswerIn>,
) -> Result<Json<WorkspaceOut>, QuizError> {
  Ok(Json(logic::select_answer(&state, &user.0, body.index, &body.letter).await?))
}

#[instrument(level = "info", skip(state), fields(user = %user.0))]
pub async fn http_post_save(State(state): State<Arc<AppState>>, user: CurrentUser) -> Result<Json<WorkspaceOut>, QuizError> {
  let out = logic::save_active_quiz(&state, &user.0).await?;
  info!(target: "quiz", user = %user.0, kind = ?out.feedback.as_ref().map(|f| f.kind), "HTTP save handled");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(user = %user.0))]
pub async fn http_get_library(
  State(state): State<Arc<AppState>>,
  user: CurrentUser,
  Query(q): Query<LibraryQuery>,
) -> Json<LibraryOut> {
  Json(logic::library(&state, &user.0, q.filter.as_deref(), q.limit).await)
}

#[instrument(level = "info", skip(state), fields(user = %user.0))]
pub async fn http_post_load(
  State(state): State<Arc<AppState>>,
  user: CurrentUser,
  Path(id): Path<String>,
) -> Result<Json<WorkspaceOut>, QuizError> {
  Ok(Json(logic::load_saved_quiz(&state, &user.0, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(user = %user.0, public = body.public))]
pub async fn http_put_visibility(
  State(state): State<Arc<AppState>>,
  user: CurrentUser,
  Path(id): Path<String>,
  Json(body): Json<VisibilityIn>,
) -> Result<Json<VisibilityOut>, QuizError> {
  let (feedback, quiz) = logic::set_visibility(&state, &user.0, &id, body.public).await?;
  Ok(Json(VisibilityOut { feedback, quiz }))
}

#[instrument(level = "info", skip(state), fields(user = %user.0))]
pub async fn http_delete_quiz(
  State(state): State<Arc<AppState>>,
  user: CurrentUser,
  Path(id): Path<String>,
) -> Result<Json<DeletedOut>, QuizError> {
  let feedback = logic::delete_saved_quiz(&state, &user.0, &id).await?;
  Ok(Json(DeletedOut { feedback }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_public(
  State(state): State<Arc<AppState>>,
  Path(share_id): Path<String>,
) -> Result<Json<QuizView>, QuizError> {
  Ok(Json(logic::public_quiz(&state, &share_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(selections = body.answers.len()))]
pub async fn http_post_public_score(
  State(state): State<Arc<AppState>>,
  Path(share_id): Path<String>,
  Json(body): Json<PublicScoreIn>,
) -> Result<Json<QuizView>, QuizError> {
  let view = logic::score_public(&state, &share_id, &body.answers).await?;
  info!(target: "quiz", %share_id, score = view.score, total = view.total, "Public quiz scored");
  Ok(Json(view))
}
