//! Game session engine — session creation, attempt recording, score
//! accumulation, and the completion transition.
//!
//! The engine performs the resolution, ownership, and grading steps, then
//! delegates the attempt insert + score update + completion recount to
//! the store as one transaction. It holds no session state of its own;
//! every operation reads current persisted state before deciding
//! transitions.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
  Error, Result,
  grader,
  player::Player,
  session::{AnswerResult, AttemptOutcome, GameSession, NewAttempt},
  store::GameStore,
  view::{self, SessionView},
};

pub struct GameEngine<S> {
  store:     Arc<S>,
  /// Acceptance threshold handed to the grader, 0–100.
  threshold: u8,
}

impl<S> GameEngine<S>
where
  S: GameStore,
  S::Error: Into<Error>,
{
  pub fn new(store: Arc<S>, threshold: u8) -> Self {
    Self { store, threshold }
  }

  pub fn with_default_threshold(store: Arc<S>) -> Self {
    Self::new(store, grader::DEFAULT_THRESHOLD)
  }

  /// Start a new session for `player` against an existing board.
  ///
  /// No duplicate prevention here: whether to reuse an open session is
  /// the caller's decision, via [`find_latest_session`](Self::find_latest_session).
  pub async fn create_session(
    &self,
    board_id: Uuid,
    player: &Player,
  ) -> Result<GameSession> {
    self
      .store
      .get_board(board_id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::BoardNotFound(board_id))?;

    let session = self
      .store
      .create_session(board_id, player.player_id)
      .await
      .map_err(Into::into)?;

    info!(
      session_id = %session.session_id,
      board_id = %board_id,
      player_id = %player.player_id,
      "game session started"
    );
    Ok(session)
  }

  /// Record one answer submission.
  ///
  /// Resolution and ownership failures are reported before any grading
  /// happens; submissions against a terminal session are rejected, and a
  /// duplicate submission surfaces as [`Error::AlreadyAnswered`] and
  /// leaves the session untouched.
  pub async fn answer_question(
    &self,
    session_id: Uuid,
    question_id: Uuid,
    submitted_answer: &str,
    player: &Player,
  ) -> Result<AnswerResult> {
    let session = self.owned_session(session_id, player).await?;
    if session.status.is_terminal() {
      return Err(Error::Validation(format!(
        "session {session_id} is no longer in progress"
      )));
    }

    let question = self
      .store
      .get_question(question_id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::QuestionNotFound(question_id))?;

    let correct = grader::grade(submitted_answer, &question.answer_text, self.threshold);
    let outcome = if correct { AttemptOutcome::Correct } else { AttemptOutcome::Incorrect };
    let points_earned = if correct { question.points } else { 0 };

    let recorded = self
      .store
      .record_attempt(NewAttempt {
        session_id: session.session_id,
        question_id,
        submitted_answer: submitted_answer.to_owned(),
        outcome,
        points_earned,
      })
      .await
      .map_err(Into::into)?;

    info!(
      session_id = %session_id,
      question_id = %question_id,
      outcome = ?outcome,
      points_earned,
      updated_score = recorded.session.score,
      game_status = ?recorded.session.status,
      "answer recorded"
    );

    Ok(AnswerResult {
      question_id,
      outcome,
      correct_answer: question.answer_text,
      points_earned,
      updated_score: recorded.session.score,
      game_status: recorded.session.status,
    })
  }

  /// Render the player-facing view of a session (see [`view::render`]).
  pub async fn session_view(
    &self,
    session_id: Uuid,
    player: &Player,
  ) -> Result<SessionView> {
    let session = self.owned_session(session_id, player).await?;

    let board = self
      .store
      .get_board(session.board_id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::BoardNotFound(session.board_id))?;

    let attempts = self
      .store
      .list_attempts(session_id)
      .await
      .map_err(Into::into)?;

    Ok(view::render(&session, &board, &attempts))
  }

  /// The player's most recent session for a board, regardless of status.
  pub async fn find_latest_session(
    &self,
    player: &Player,
    board_id: Uuid,
  ) -> Result<Option<GameSession>> {
    self
      .store
      .find_latest_session(player.player_id, board_id)
      .await
      .map_err(Into::into)
  }

  /// Fetch a session and verify `player` owns it.
  async fn owned_session(
    &self,
    session_id: Uuid,
    player: &Player,
  ) -> Result<GameSession> {
    let session = self
      .store
      .get_session(session_id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::SessionNotFound(session_id))?;

    if session.player_id != player.player_id {
      return Err(Error::NotSessionOwner {
        session_id,
        player_id: player.player_id,
      });
    }
    Ok(session)
  }
}
