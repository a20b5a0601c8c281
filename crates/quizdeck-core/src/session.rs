//! Game session types.
//!
//! A session is one player's play-through of one quiz board. Attempts are
//! immutable once recorded; a second submission for the same
//! (session, question) pair is rejected, never overwritten. The session's
//! score and status are mutated only by the session engine, inside the
//! same transaction that records the attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Session ─────────────────────────────────────────────────────────────────

/// Lifecycle status of a game session.
///
/// `InProgress` is the initial state; `Completed` and `Abandoned` are
/// terminal. `Completed` is reached automatically inside the operation
/// that records the final attempt. `Abandoned` is reserved for an
/// administrative/timeout path outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
  InProgress,
  Completed,
  Abandoned,
}

impl SessionStatus {
  pub fn is_terminal(&self) -> bool { !matches!(self, Self::InProgress) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
  pub session_id:   Uuid,
  pub board_id:     Uuid,
  pub player_id:    Uuid,
  /// Invariant: equals the sum of `points_earned` over this session's
  /// attempts.
  pub score:        u32,
  pub status:       SessionStatus,
  pub started_at:   DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
}

// ─── Attempts ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
  Correct,
  Incorrect,
}

/// One answer submission, recorded verbatim. At most one exists per
/// (session, question) pair — enforced by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAttempt {
  pub attempt_id:       Uuid,
  pub session_id:       Uuid,
  pub question_id:      Uuid,
  pub submitted_answer: String,
  pub outcome:          AttemptOutcome,
  /// 0 or the question's full point value.
  pub points_earned:    u32,
  pub attempted_at:     DateTime<Utc>,
}

/// Input for [`GameStore::record_attempt`](crate::store::GameStore::record_attempt).
/// The outcome is pre-graded by the engine; the store's job is the atomic
/// insert + score update + completion recount.
#[derive(Debug, Clone)]
pub struct NewAttempt {
  pub session_id:       Uuid,
  pub question_id:      Uuid,
  pub submitted_answer: String,
  pub outcome:          AttemptOutcome,
  pub points_earned:    u32,
}

/// What [`record_attempt`](crate::store::GameStore::record_attempt)
/// returns: the persisted attempt plus the session as updated by the same
/// transaction.
#[derive(Debug, Clone)]
pub struct AttemptRecorded {
  pub attempt: QuestionAttempt,
  pub session: GameSession,
}

// ─── Engine output ───────────────────────────────────────────────────────────

/// The player-facing result of answering a question. The canonical answer
/// is safe to reveal here because an attempt now exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
  pub question_id:    Uuid,
  /// Serialized as `status` on the wire: `"correct"` or `"incorrect"`.
  #[serde(rename = "status")]
  pub outcome:        AttemptOutcome,
  pub correct_answer: String,
  pub points_earned:  u32,
  pub updated_score:  u32,
  pub game_status:    SessionStatus,
}
