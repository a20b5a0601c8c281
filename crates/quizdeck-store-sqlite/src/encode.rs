//! Encoding and decoding helpers between the domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings. UUIDs are hyphenated lowercase
//! strings. Enums are stored as their snake_case wire names.

use chrono::{DateTime, Utc};
use quizdeck_core::{
  board::Question,
  player::{Guest, Player, PlayerKind, PlayerRef, User},
  session::{AttemptOutcome, GameSession, QuestionAttempt, SessionStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── PlayerKind ──────────────────────────────────────────────────────────────

pub fn encode_player_kind(k: PlayerKind) -> &'static str {
  match k {
    PlayerKind::User => "user",
    PlayerKind::Guest => "guest",
  }
}

pub fn decode_player_kind(s: &str) -> Result<PlayerKind> {
  match s {
    "user" => Ok(PlayerKind::User),
    "guest" => Ok(PlayerKind::Guest),
    other => Err(Error::Decode(format!("unknown player kind: {other:?}"))),
  }
}

// ─── SessionStatus ───────────────────────────────────────────────────────────

pub fn encode_status(s: SessionStatus) -> &'static str {
  match s {
    SessionStatus::InProgress => "in_progress",
    SessionStatus::Completed => "completed",
    SessionStatus::Abandoned => "abandoned",
  }
}

pub fn decode_status(s: &str) -> Result<SessionStatus> {
  match s {
    "in_progress" => Ok(SessionStatus::InProgress),
    "completed" => Ok(SessionStatus::Completed),
    "abandoned" => Ok(SessionStatus::Abandoned),
    other => Err(Error::Decode(format!("unknown session status: {other:?}"))),
  }
}

// ─── AttemptOutcome ──────────────────────────────────────────────────────────

pub fn encode_outcome(o: AttemptOutcome) -> &'static str {
  match o {
    AttemptOutcome::Correct => "correct",
    AttemptOutcome::Incorrect => "incorrect",
  }
}

pub fn decode_outcome(s: &str) -> Result<AttemptOutcome> {
  match s {
    "correct" => Ok(AttemptOutcome::Correct),
    "incorrect" => Ok(AttemptOutcome::Incorrect),
    other => Err(Error::Decode(format!("unknown attempt outcome: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `players` row.
pub struct RawPlayer {
  pub player_id:    String,
  pub kind:         String,
  pub user_id:      Option<String>,
  pub guest_id:     Option<String>,
  pub display_name: String,
  pub created_at:   String,
}

impl RawPlayer {
  pub fn into_player(self) -> Result<Player> {
    let kind = decode_player_kind(&self.kind)?;
    let backing = match (kind, &self.user_id, &self.guest_id) {
      (PlayerKind::User, Some(user_id), None) => {
        PlayerRef::User { user_id: decode_uuid(user_id)? }
      }
      (PlayerKind::Guest, None, Some(guest_id)) => {
        PlayerRef::Guest { guest_id: decode_uuid(guest_id)? }
      }
      _ => {
        return Err(Error::Decode(format!(
          "player {} has inconsistent backing (kind {:?})",
          self.player_id, self.kind
        )));
      }
    };

    Ok(Player {
      player_id: decode_uuid(&self.player_id)?,
      display_name: self.display_name,
      backing,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `guests` row.
pub struct RawGuest {
  pub guest_id:          String,
  pub created_at:        String,
  pub converted_user_id: Option<String>,
}

impl RawGuest {
  pub fn into_guest(self) -> Result<Guest> {
    Ok(Guest {
      guest_id:          decode_uuid(&self.guest_id)?,
      created_at:        decode_dt(&self.created_at)?,
      converted_user_id: self
        .converted_user_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
    })
  }
}

/// Raw strings read directly from a `game_sessions` row.
pub struct RawSession {
  pub session_id:   String,
  pub board_id:     String,
  pub player_id:    String,
  pub score:        i64,
  pub status:       String,
  pub started_at:   String,
  pub completed_at: Option<String>,
}

impl RawSession {
  pub fn into_session(self) -> Result<GameSession> {
    Ok(GameSession {
      session_id:   decode_uuid(&self.session_id)?,
      board_id:     decode_uuid(&self.board_id)?,
      player_id:    decode_uuid(&self.player_id)?,
      score:        u32::try_from(self.score)
        .map_err(|_| Error::Decode(format!("negative score: {}", self.score)))?,
      status:       decode_status(&self.status)?,
      started_at:   decode_dt(&self.started_at)?,
      completed_at: self.completed_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from a `questions` row.
pub struct RawQuestion {
  pub question_id:   String,
  pub category_id:   String,
  pub question_text: String,
  pub answer_text:   String,
  pub points:        i64,
  pub position:      i64,
}

impl RawQuestion {
  pub fn into_question(self) -> Result<Question> {
    Ok(Question {
      question_id:   decode_uuid(&self.question_id)?,
      category_id:   decode_uuid(&self.category_id)?,
      question_text: self.question_text,
      answer_text:   self.answer_text,
      points:        u32::try_from(self.points)
        .map_err(|_| Error::Decode(format!("negative points: {}", self.points)))?,
      position:      u32::try_from(self.position)
        .map_err(|_| Error::Decode(format!("negative position: {}", self.position)))?,
    })
  }
}

/// Raw strings read directly from a `question_attempts` row.
pub struct RawAttempt {
  pub attempt_id:       String,
  pub session_id:       String,
  pub question_id:      String,
  pub submitted_answer: String,
  pub outcome:          String,
  pub points_earned:    i64,
  pub attempted_at:     String,
}

impl RawAttempt {
  pub fn into_attempt(self) -> Result<QuestionAttempt> {
    Ok(QuestionAttempt {
      attempt_id:       decode_uuid(&self.attempt_id)?,
      session_id:       decode_uuid(&self.session_id)?,
      question_id:      decode_uuid(&self.question_id)?,
      submitted_answer: self.submitted_answer,
      outcome:          decode_outcome(&self.outcome)?,
      points_earned:    u32::try_from(self.points_earned).map_err(|_| {
        Error::Decode(format!("negative points_earned: {}", self.points_earned))
      })?,
      attempted_at:     decode_dt(&self.attempted_at)?,
    })
  }
}
