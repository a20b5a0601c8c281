//! The `GameStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `quizdeck-store-sqlite`). The engine, provider, and HTTP layer depend
//! on this abstraction, not on any concrete backend.
//!
//! Counting queries are explicit repository methods; the engine never
//! walks entity relationships itself.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  board::{BoardSummary, NewBoard, Question, QuizBoard},
  player::{AuthToken, Guest, Player, User},
  session::{AttemptRecorded, GameSession, NewAttempt, QuestionAttempt},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`GameStore::list_boards`].
#[derive(Debug, Clone, Default)]
pub struct BoardQuery {
  /// Case-insensitive substring filter on board titles.
  pub search: Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a quizdeck storage backend.
///
/// Attempts are append-only: [`record_attempt`](Self::record_attempt) is
/// the only write against them, and it must apply the attempt insert, the
/// incremental score update, and the completion-state transition as one
/// atomic unit. The `(session_id, question_id)` uniqueness is enforced by
/// the backend, so concurrent duplicate submissions race safely.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (tokio with `axum`).
pub trait GameStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Players & identity ────────────────────────────────────────────────

  /// Create a registered user together with its player row.
  fn create_user(
    &self,
    username: String,
    password_hash: String,
  ) -> impl Future<Output = Result<(User, Player), Self::Error>> + Send + '_;

  fn find_user_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Create an ephemeral guest together with its player row.
  fn create_guest(
    &self,
    display_name: String,
  ) -> impl Future<Output = Result<Player, Self::Error>> + Send + '_;

  fn get_player(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;

  /// Look up the player that owns a user account.
  fn find_player_for_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;

  /// Record the auxiliary guest-to-user conversion link. The guest's
  /// player row keeps its variant.
  fn link_guest_to_user(
    &self,
    guest_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Guest, Self::Error>> + Send + '_;

  // ── Bearer tokens ─────────────────────────────────────────────────────

  /// Store a token digest with its expiry.
  fn insert_token(
    &self,
    token: AuthToken,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve a token digest to its player, if the token exists and has
  /// not expired as of `now`.
  fn find_player_by_token(
    &self,
    token_hash: String,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;

  /// Delete all tokens that expired before `now`.
  fn purge_expired_tokens(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Quiz boards ───────────────────────────────────────────────────────

  /// Persist a board with all its categories and questions as one atomic
  /// unit. A partially-written board is never visible to readers. Fails
  /// if another board already uses the same topic.
  fn add_board(
    &self,
    new: NewBoard,
  ) -> impl Future<Output = Result<QuizBoard, Self::Error>> + Send + '_;

  fn get_board(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<QuizBoard>, Self::Error>> + Send + '_;

  /// Case-sensitive exact-match lookup on the source topic.
  fn find_board_by_topic(
    &self,
    topic: String,
  ) -> impl Future<Output = Result<Option<QuizBoard>, Self::Error>> + Send + '_;

  fn list_boards(
    &self,
    query: BoardQuery,
  ) -> impl Future<Output = Result<Vec<BoardSummary>, Self::Error>> + Send + '_;

  /// Total questions across all categories of a board.
  fn count_questions(
    &self,
    board_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Questions ─────────────────────────────────────────────────────────

  fn get_question(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  // ── Game sessions ─────────────────────────────────────────────────────

  /// Insert a new in-progress session with score 0.
  fn create_session(
    &self,
    board_id: Uuid,
    player_id: Uuid,
  ) -> impl Future<Output = Result<GameSession, Self::Error>> + Send + '_;

  fn get_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<GameSession>, Self::Error>> + Send + '_;

  /// The player's most recently started session for a board, if any.
  fn find_latest_session(
    &self,
    player_id: Uuid,
    board_id: Uuid,
  ) -> impl Future<Output = Result<Option<GameSession>, Self::Error>> + Send + '_;

  fn list_attempts(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<QuestionAttempt>, Self::Error>> + Send + '_;

  /// Number of distinct questions answered in a session.
  fn count_attempts(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Record a graded attempt: insert the immutable attempt row, add its
  /// points to the session score, recount answered questions against the
  /// board total, and transition the session to completed when the counts
  /// match — all inside one transaction.
  fn record_attempt(
    &self,
    input: NewAttempt,
  ) -> impl Future<Output = Result<AttemptRecorded, Self::Error>> + Send + '_;
}
