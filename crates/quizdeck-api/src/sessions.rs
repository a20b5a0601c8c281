//! Handlers for `/game-sessions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/game-sessions/new-from-quiz-board/{quiz_board_id}` | 404 for unknown board |
//! | `GET`  | `/game-sessions/existing?quiz_board_id=` | Most recent session, if any |
//! | `GET`  | `/game-sessions/{id}` | Owner only; 403 otherwise |
//! | `POST` | `/game-sessions/{id}/answer-question/{question_id}` | Body: `{"answer":"..."}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use quizdeck_core::{
  Error as DomainError,
  generate::QuizGenerator,
  session::AnswerResult,
  store::GameStore,
  view::SessionView,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, auth::CurrentPlayer, error::ApiError};

#[derive(Debug, Serialize)]
pub struct SessionRef {
  pub game_session_id: Uuid,
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /game-sessions/new-from-quiz-board/{quiz_board_id}`
pub async fn new_from_board<S, G>(
  State(state): State<ApiState<S, G>>,
  CurrentPlayer(player): CurrentPlayer,
  Path(quiz_board_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionRef>), ApiError>
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  let session = state.engine.create_session(quiz_board_id, &player).await?;
  Ok((
    StatusCode::CREATED,
    Json(SessionRef { game_session_id: session.session_id }),
  ))
}

// ─── Existing lookup ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExistingParams {
  pub quiz_board_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ExistingResponse {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub game_session_id: Option<Uuid>,
}

/// `GET /game-sessions/existing?quiz_board_id=` — the caller's most
/// recently started session for the board. An empty object when they
/// never played it.
pub async fn existing<S, G>(
  State(state): State<ApiState<S, G>>,
  CurrentPlayer(player): CurrentPlayer,
  Query(params): Query<ExistingParams>,
) -> Result<Json<ExistingResponse>, ApiError>
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  let session = state
    .engine
    .find_latest_session(&player, params.quiz_board_id)
    .await?;
  Ok(Json(ExistingResponse {
    game_session_id: session.map(|s| s.session_id),
  }))
}

// ─── View ────────────────────────────────────────────────────────────────────

/// `GET /game-sessions/{id}`
pub async fn get_one<S, G>(
  State(state): State<ApiState<S, G>>,
  CurrentPlayer(player): CurrentPlayer,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError>
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  let view = state.engine.session_view(id, &player).await?;
  Ok(Json(view))
}

// ─── Answer ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerBody {
  pub answer: String,
}

/// `POST /game-sessions/{id}/answer-question/{question_id}`
pub async fn answer<S, G>(
  State(state): State<ApiState<S, G>>,
  CurrentPlayer(player): CurrentPlayer,
  Path((id, question_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<AnswerBody>,
) -> Result<Json<AnswerResult>, ApiError>
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  let result = state
    .engine
    .answer_question(id, question_id, &body.answer, &player)
    .await?;
  Ok(Json(result))
}
