//! Error taxonomy for `quizdeck-core`.
//!
//! Variants map one-to-one onto the HTTP failure modes the API layer
//! surfaces: not-found, ownership, duplicate-attempt conflict, input
//! validation, and upstream generation failure.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("quiz board not found: {0}")]
  BoardNotFound(Uuid),

  #[error("game session not found: {0}")]
  SessionNotFound(Uuid),

  #[error("question not found: {0}")]
  QuestionNotFound(Uuid),

  #[error("player not found: {0}")]
  PlayerNotFound(Uuid),

  #[error("player {player_id} does not own session {session_id}")]
  NotSessionOwner { session_id: Uuid, player_id: Uuid },

  #[error("question {question_id} already answered in session {session_id}")]
  AlreadyAnswered { session_id: Uuid, question_id: Uuid },

  #[error("a quiz board for topic {0:?} already exists")]
  DuplicateTopic(String),

  #[error("validation error: {0}")]
  Validation(String),

  #[error("quiz board generation failed: {0}")]
  Generation(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
