//! Error type for `quizdeck-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] quizdeck_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("cannot decode stored value: {0}")]
  Decode(String),

  /// The `(session_id, question_id)` uniqueness constraint rejected a
  /// duplicate attempt insert.
  #[error("question {question_id} already answered in session {session_id}")]
  AlreadyAnswered { session_id: Uuid, question_id: Uuid },

  /// The topic uniqueness constraint rejected a duplicate board insert.
  #[error("a quiz board for topic {0:?} already exists")]
  DuplicateTopic(String),

  #[error("username {0:?} is already taken")]
  UsernameTaken(String),

  #[error("game session not found: {0}")]
  SessionNotFound(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for quizdeck_core::Error {
  fn from(e: Error) -> Self {
    use quizdeck_core::Error as Core;
    match e {
      Error::Core(inner) => inner,
      Error::AlreadyAnswered { session_id, question_id } => {
        Core::AlreadyAnswered { session_id, question_id }
      }
      Error::DuplicateTopic(topic) => Core::DuplicateTopic(topic),
      Error::UsernameTaken(name) => {
        Core::Validation(format!("username {name:?} is already taken"))
      }
      Error::SessionNotFound(id) => Core::SessionNotFound(id),
      other => Core::Storage(Box::new(other)),
    }
  }
}
