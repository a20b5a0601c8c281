//! Handlers for `/quiz-boards` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/quiz-boards` | Optional `?search=&limit=&offset=` |
//! | `POST` | `/quiz-boards/from-topic` | Body: `{"topic":"..."}`, get-or-create |
//!
//! Board responses use [`BoardView`], which never carries canonical
//! answers.

use axum::{Json, extract::{Query, State}};
use quizdeck_core::{
  Error as DomainError,
  board::BoardSummary,
  generate::QuizGenerator,
  store::{BoardQuery, GameStore},
  view::BoardView,
};
use serde::Deserialize;

use crate::{ApiState, auth::CurrentPlayer, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub search: Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /quiz-boards[?search=&limit=&offset=]`
pub async fn list<S, G>(
  State(state): State<ApiState<S, G>>,
  _player: CurrentPlayer,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<BoardSummary>>, ApiError>
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  let summaries = state
    .store
    .list_boards(BoardQuery {
      search: params.search,
      limit:  params.limit,
      offset: params.offset,
    })
    .await
    .map_err(|e| ApiError::Domain(e.into()))?;
  Ok(Json(summaries))
}

// ─── Get-or-create from topic ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FromTopicBody {
  pub topic: String,
}

/// `POST /quiz-boards/from-topic` — returns the existing board for the
/// topic or generates and persists a new one.
pub async fn from_topic<S, G>(
  State(state): State<ApiState<S, G>>,
  CurrentPlayer(player): CurrentPlayer,
  Json(body): Json<FromTopicBody>,
) -> Result<Json<BoardView>, ApiError>
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  let board = state.provider.get_or_create(&body.topic, &player).await?;
  Ok(Json(BoardView::from(&board)))
}
