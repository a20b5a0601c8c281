//! [`SqliteStore`] — the SQLite implementation of [`GameStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use quizdeck_core::{
  board::{BoardSummary, Category, NewBoard, Question, QuizBoard},
  player::{AuthToken, Guest, Player, PlayerRef, User},
  session::{
    AttemptRecorded, GameSession, NewAttempt, QuestionAttempt, SessionStatus,
  },
  store::{BoardQuery, GameStore},
};

use crate::{
  Error, Result,
  encode::{
    RawAttempt, RawGuest, RawPlayer, RawQuestion, RawSession, RawUser,
    encode_dt, encode_outcome, encode_player_kind, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A quizdeck store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// `true` if `err` is a UNIQUE-constraint failure whose message mentions
/// `needle` (SQLite reports the violated columns by name).
fn is_unique_violation(err: &tokio_rusqlite::Error, needle: &str) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, Some(msg)))
      if e.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains(needle)
  )
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

struct RawBoardRow {
  board_id:   String,
  title:      String,
  topic:      String,
  created_by: String,
  created_at: String,
}

struct RawCategoryRow {
  category_id: String,
  name:        String,
  position:    i64,
}

/// Read a board with its full category/question tree. Runs on the
/// connection thread; returns raw strings for decoding on the caller
/// side.
#[allow(clippy::type_complexity)]
fn read_board_tree(
  conn: &rusqlite::Connection,
  board_id: &str,
) -> rusqlite::Result<Option<(RawBoardRow, Vec<RawCategoryRow>, Vec<RawQuestion>)>> {
  let board: Option<RawBoardRow> = conn
    .query_row(
      "SELECT board_id, title, topic, created_by, created_at
       FROM quiz_boards WHERE board_id = ?1",
      rusqlite::params![board_id],
      |row| {
        Ok(RawBoardRow {
          board_id:   row.get(0)?,
          title:      row.get(1)?,
          topic:      row.get(2)?,
          created_by: row.get(3)?,
          created_at: row.get(4)?,
        })
      },
    )
    .optional()?;

  let Some(board) = board else {
    return Ok(None);
  };

  let mut stmt = conn.prepare(
    "SELECT category_id, name, position
     FROM categories WHERE board_id = ?1 ORDER BY position",
  )?;
  let categories = stmt
    .query_map(rusqlite::params![board_id], |row| {
      Ok(RawCategoryRow {
        category_id: row.get(0)?,
        name:        row.get(1)?,
        position:    row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(
    "SELECT q.question_id, q.category_id, q.question_text, q.answer_text,
            q.points, q.position
     FROM questions q
     JOIN categories c ON c.category_id = q.category_id
     WHERE c.board_id = ?1
     ORDER BY c.position, q.position",
  )?;
  let questions = stmt
    .query_map(rusqlite::params![board_id], |row| {
      Ok(RawQuestion {
        question_id:   row.get(0)?,
        category_id:   row.get(1)?,
        question_text: row.get(2)?,
        answer_text:   row.get(3)?,
        points:        row.get(4)?,
        position:      row.get(5)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some((board, categories, questions)))
}

fn assemble_board(
  board: RawBoardRow,
  categories: Vec<RawCategoryRow>,
  questions: Vec<RawQuestion>,
) -> Result<QuizBoard> {
  let questions: Vec<Question> = questions
    .into_iter()
    .map(RawQuestion::into_question)
    .collect::<Result<_>>()?;

  let categories = categories
    .into_iter()
    .map(|raw| {
      let category_id = crate::encode::decode_uuid(&raw.category_id)?;
      Ok(Category {
        category_id,
        name: raw.name,
        position: u32::try_from(raw.position)
          .map_err(|_| Error::Decode(format!("negative position: {}", raw.position)))?,
        questions: questions
          .iter()
          .filter(|q| q.category_id == category_id)
          .cloned()
          .collect(),
      })
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(QuizBoard {
    board_id:   crate::encode::decode_uuid(&board.board_id)?,
    title:      board.title,
    topic:      board.topic,
    created_by: crate::encode::decode_uuid(&board.created_by)?,
    created_at: crate::encode::decode_dt(&board.created_at)?,
    categories,
  })
}

const PLAYER_COLUMNS: &str =
  "player_id, kind, user_id, guest_id, display_name, created_at";

fn player_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPlayer> {
  Ok(RawPlayer {
    player_id:    row.get(0)?,
    kind:         row.get(1)?,
    user_id:      row.get(2)?,
    guest_id:     row.get(3)?,
    display_name: row.get(4)?,
    created_at:   row.get(5)?,
  })
}

const SESSION_COLUMNS: &str =
  "session_id, board_id, player_id, score, status, started_at, completed_at";

fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSession> {
  Ok(RawSession {
    session_id:   row.get(0)?,
    board_id:     row.get(1)?,
    player_id:    row.get(2)?,
    score:        row.get(3)?,
    status:       row.get(4)?,
    started_at:   row.get(5)?,
    completed_at: row.get(6)?,
  })
}

// ─── GameStore impl ──────────────────────────────────────────────────────────

impl GameStore for SqliteStore {
  type Error = Error;

  // ── Players & identity ────────────────────────────────────────────────────

  async fn create_user(
    &self,
    username: String,
    password_hash: String,
  ) -> Result<(User, Player)> {
    let now = Utc::now();
    let user = User {
      user_id: Uuid::new_v4(),
      username: username.clone(),
      password_hash,
      created_at: now,
    };
    let player = Player {
      player_id:    Uuid::new_v4(),
      display_name: username.clone(),
      backing:      PlayerRef::User { user_id: user.user_id },
      created_at:   now,
    };

    let user_id_str = encode_uuid(user.user_id);
    let player_id_str = encode_uuid(player.player_id);
    let kind_str = encode_player_kind(player.backing.kind());
    let hash = user.password_hash.clone();
    let name = username.clone();
    let at_str = encode_dt(now);

    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO users (user_id, username, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id_str, name, hash, at_str],
        )?;
        tx.execute(
          "INSERT INTO players (player_id, kind, user_id, guest_id, display_name, created_at)
           VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
          rusqlite::params![player_id_str, kind_str, user_id_str, name, at_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await;

    match result {
      Ok(()) => Ok((user, player)),
      Err(e) if is_unique_violation(&e, "users.username") => {
        Err(Error::UsernameTaken(username))
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn find_user_by_username(&self, username: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, username, password_hash, created_at
             FROM users WHERE username = ?1",
            rusqlite::params![username],
            |row| {
              Ok(RawUser {
                user_id:       row.get(0)?,
                username:      row.get(1)?,
                password_hash: row.get(2)?,
                created_at:    row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn create_guest(&self, display_name: String) -> Result<Player> {
    let now = Utc::now();
    let guest_id = Uuid::new_v4();
    let player = Player {
      player_id: Uuid::new_v4(),
      display_name,
      backing: PlayerRef::Guest { guest_id },
      created_at: now,
    };

    let guest_id_str = encode_uuid(guest_id);
    let player_id_str = encode_uuid(player.player_id);
    let kind_str = encode_player_kind(player.backing.kind());
    let name = player.display_name.clone();
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO guests (guest_id, created_at, converted_user_id)
           VALUES (?1, ?2, NULL)",
          rusqlite::params![guest_id_str, at_str],
        )?;
        tx.execute(
          "INSERT INTO players (player_id, kind, user_id, guest_id, display_name, created_at)
           VALUES (?1, ?2, NULL, ?3, ?4, ?5)",
          rusqlite::params![player_id_str, kind_str, guest_id_str, name, at_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(player)
  }

  async fn get_player(&self, id: Uuid) -> Result<Option<Player>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPlayer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE player_id = ?1"),
            rusqlite::params![id_str],
            player_from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPlayer::into_player).transpose()
  }

  async fn find_player_for_user(&self, user_id: Uuid) -> Result<Option<Player>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawPlayer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE user_id = ?1"),
            rusqlite::params![id_str],
            player_from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPlayer::into_player).transpose()
  }

  async fn link_guest_to_user(&self, guest_id: Uuid, user_id: Uuid) -> Result<Guest> {
    let guest_id_str = encode_uuid(guest_id);
    let user_id_str = encode_uuid(user_id);

    let raw: Option<RawGuest> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE guests SET converted_user_id = ?1 WHERE guest_id = ?2",
          rusqlite::params![user_id_str, guest_id_str],
        )?;
        Ok(
          conn
            .query_row(
              "SELECT guest_id, created_at, converted_user_id
               FROM guests WHERE guest_id = ?1",
              rusqlite::params![guest_id_str],
              |row| {
                Ok(RawGuest {
                  guest_id:          row.get(0)?,
                  created_at:        row.get(1)?,
                  converted_user_id: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(RawGuest::into_guest)
      .transpose()?
      .ok_or(Error::Decode(format!("guest {guest_id} not found")))
  }

  // ── Bearer tokens ─────────────────────────────────────────────────────────

  async fn insert_token(&self, token: AuthToken) -> Result<()> {
    let player_id_str = encode_uuid(token.player_id);
    let issued_str = encode_dt(token.issued_at);
    let expires_str = encode_dt(token.expires_at);
    let token_hash = token.token_hash;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO auth_tokens (token_hash, player_id, issued_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_hash, player_id_str, issued_str, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_player_by_token(
    &self,
    token_hash: String,
    now: DateTime<Utc>,
  ) -> Result<Option<Player>> {
    let now_str = encode_dt(now);

    let raw: Option<RawPlayer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT p.player_id, p.kind, p.user_id, p.guest_id,
                    p.display_name, p.created_at
             FROM auth_tokens t
             JOIN players p ON p.player_id = t.player_id
             WHERE t.token_hash = ?1 AND t.expires_at > ?2",
            rusqlite::params![token_hash, now_str],
            player_from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPlayer::into_player).transpose()
  }

  async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize> {
    let now_str = encode_dt(now);

    let purged = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM auth_tokens WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;
    Ok(purged)
  }

  // ── Quiz boards ───────────────────────────────────────────────────────────

  async fn add_board(&self, new: NewBoard) -> Result<QuizBoard> {
    let now = Utc::now();
    let board_id = Uuid::new_v4();

    // Assign ids up front so the domain value can be returned without a
    // re-read after the transaction commits.
    let categories: Vec<Category> = new
      .categories
      .into_iter()
      .enumerate()
      .map(|(cat_index, category)| {
        let category_id = Uuid::new_v4();
        Category {
          category_id,
          name: category.name,
          position: cat_index as u32,
          questions: category
            .questions
            .into_iter()
            .enumerate()
            .map(|(q_index, question)| Question {
              question_id:   Uuid::new_v4(),
              category_id,
              question_text: question.question_text,
              answer_text:   question.answer_text,
              points:        question.points,
              position:      q_index as u32,
            })
            .collect(),
        }
      })
      .collect();

    let board = QuizBoard {
      board_id,
      title: new.title,
      topic: new.topic.clone(),
      created_by: new.created_by,
      created_at: now,
      categories,
    };

    let board_id_str = encode_uuid(board_id);
    let title = board.title.clone();
    let topic = board.topic.clone();
    let created_by_str = encode_uuid(board.created_by);
    let at_str = encode_dt(now);

    let category_rows: Vec<(String, String, i64)> = board
      .categories
      .iter()
      .map(|c| (encode_uuid(c.category_id), c.name.clone(), i64::from(c.position)))
      .collect();

    let question_rows: Vec<(String, String, String, String, i64, i64)> = board
      .categories
      .iter()
      .flat_map(|c| c.questions.iter())
      .map(|q| {
        (
          encode_uuid(q.question_id),
          encode_uuid(q.category_id),
          q.question_text.clone(),
          q.answer_text.clone(),
          i64::from(q.points),
          i64::from(q.position),
        )
      })
      .collect();

    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO quiz_boards (board_id, title, topic, created_by, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![board_id_str, title, topic, created_by_str, at_str],
        )?;
        for (category_id, name, position) in &category_rows {
          tx.execute(
            "INSERT INTO categories (category_id, board_id, name, position)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![category_id, board_id_str, name, position],
          )?;
        }
        for (question_id, category_id, text, answer, points, position) in
          &question_rows
        {
          tx.execute(
            "INSERT INTO questions
               (question_id, category_id, question_text, answer_text, points, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![question_id, category_id, text, answer, points, position],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await;

    match result {
      Ok(()) => Ok(board),
      Err(e) if is_unique_violation(&e, "quiz_boards.topic") => {
        Err(Error::DuplicateTopic(new.topic))
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn get_board(&self, id: Uuid) -> Result<Option<QuizBoard>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(read_board_tree(conn, &id_str)?))
      .await?;

    raw
      .map(|(board, categories, questions)| assemble_board(board, categories, questions))
      .transpose()
  }

  async fn find_board_by_topic(&self, topic: String) -> Result<Option<QuizBoard>> {
    let raw = self
      .conn
      .call(move |conn| {
        let board_id: Option<String> = conn
          .query_row(
            "SELECT board_id FROM quiz_boards WHERE topic = ?1",
            rusqlite::params![topic],
            |row| row.get(0),
          )
          .optional()?;

        match board_id {
          Some(id) => Ok(read_board_tree(conn, &id)?),
          None => Ok(None),
        }
      })
      .await?;

    raw
      .map(|(board, categories, questions)| assemble_board(board, categories, questions))
      .transpose()
  }

  async fn list_boards(&self, query: BoardQuery) -> Result<Vec<BoardSummary>> {
    let pattern = query.search.as_deref().map(|s| format!("%{s}%"));
    let limit = query.limit.unwrap_or(20) as i64;
    let offset = query.offset.unwrap_or(0) as i64;

    let raws: Vec<(String, String, String, String)> = self
      .conn
      .call(move |conn| {
        let sql = if pattern.is_some() {
          "SELECT board_id, title, topic, created_at FROM quiz_boards
           WHERE title LIKE ?1 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
        } else {
          "SELECT board_id, title, topic, created_at FROM quiz_boards
           ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
        };

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![pattern.as_deref(), limit, offset],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(board_id, title, topic, created_at)| {
        Ok(BoardSummary {
          board_id: crate::encode::decode_uuid(&board_id)?,
          title,
          topic,
          created_at: crate::encode::decode_dt(&created_at)?,
        })
      })
      .collect()
  }

  async fn count_questions(&self, board_id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(board_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM questions q
           JOIN categories c ON c.category_id = q.category_id
           WHERE c.board_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }

  // ── Questions ─────────────────────────────────────────────────────────────

  async fn get_question(&self, id: Uuid) -> Result<Option<Question>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawQuestion> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT question_id, category_id, question_text, answer_text,
                    points, position
             FROM questions WHERE question_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawQuestion {
                question_id:   row.get(0)?,
                category_id:   row.get(1)?,
                question_text: row.get(2)?,
                answer_text:   row.get(3)?,
                points:        row.get(4)?,
                position:      row.get(5)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawQuestion::into_question).transpose()
  }

  // ── Game sessions ─────────────────────────────────────────────────────────

  async fn create_session(&self, board_id: Uuid, player_id: Uuid) -> Result<GameSession> {
    let session = GameSession {
      session_id: Uuid::new_v4(),
      board_id,
      player_id,
      score: 0,
      status: SessionStatus::InProgress,
      started_at: Utc::now(),
      completed_at: None,
    };

    let session_id_str = encode_uuid(session.session_id);
    let board_id_str = encode_uuid(board_id);
    let player_id_str = encode_uuid(player_id);
    let status_str = encode_status(session.status).to_owned();
    let at_str = encode_dt(session.started_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO game_sessions
             (session_id, board_id, player_id, score, status, started_at, completed_at)
           VALUES (?1, ?2, ?3, 0, ?4, ?5, NULL)",
          rusqlite::params![session_id_str, board_id_str, player_id_str, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn get_session(&self, id: Uuid) -> Result<Option<GameSession>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM game_sessions WHERE session_id = ?1"),
            rusqlite::params![id_str],
            session_from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn find_latest_session(
    &self,
    player_id: Uuid,
    board_id: Uuid,
  ) -> Result<Option<GameSession>> {
    let player_id_str = encode_uuid(player_id);
    let board_id_str = encode_uuid(board_id);

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {SESSION_COLUMNS} FROM game_sessions
               WHERE player_id = ?1 AND board_id = ?2
               ORDER BY started_at DESC LIMIT 1"
            ),
            rusqlite::params![player_id_str, board_id_str],
            session_from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn list_attempts(&self, session_id: Uuid) -> Result<Vec<QuestionAttempt>> {
    let id_str = encode_uuid(session_id);

    let raws: Vec<RawAttempt> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT attempt_id, session_id, question_id, submitted_answer,
                  outcome, points_earned, attempted_at
           FROM question_attempts WHERE session_id = ?1
           ORDER BY attempted_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAttempt {
              attempt_id:       row.get(0)?,
              session_id:       row.get(1)?,
              question_id:      row.get(2)?,
              submitted_answer: row.get(3)?,
              outcome:          row.get(4)?,
              points_earned:    row.get(5)?,
              attempted_at:     row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAttempt::into_attempt).collect()
  }

  async fn count_attempts(&self, session_id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(session_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM question_attempts WHERE session_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn record_attempt(&self, input: NewAttempt) -> Result<AttemptRecorded> {
    let attempt = QuestionAttempt {
      attempt_id:       Uuid::new_v4(),
      session_id:       input.session_id,
      question_id:      input.question_id,
      submitted_answer: input.submitted_answer,
      outcome:          input.outcome,
      points_earned:    input.points_earned,
      attempted_at:     Utc::now(),
    };

    let attempt_id_str = encode_uuid(attempt.attempt_id);
    let session_id_str = encode_uuid(attempt.session_id);
    let question_id_str = encode_uuid(attempt.question_id);
    let submitted = attempt.submitted_answer.clone();
    let outcome_str = encode_outcome(attempt.outcome).to_owned();
    let points = i64::from(attempt.points_earned);
    let attempted_str = encode_dt(attempt.attempted_at);
    let completed_str = encode_dt(Utc::now());

    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // The UNIQUE (session_id, question_id) constraint turns a lost
        // duplicate race into a constraint failure right here.
        tx.execute(
          "INSERT INTO question_attempts
             (attempt_id, session_id, question_id, submitted_answer,
              outcome, points_earned, attempted_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            attempt_id_str,
            session_id_str,
            question_id_str,
            submitted,
            outcome_str,
            points,
            attempted_str,
          ],
        )?;

        // Incremental score update against current persisted state.
        tx.execute(
          "UPDATE game_sessions SET score = score + ?1 WHERE session_id = ?2",
          rusqlite::params![points, session_id_str],
        )?;

        // Authoritative completion recount: distinct answered questions
        // against the board's full question count, not an inference from
        // the single new attempt.
        let total: i64 = tx.query_row(
          "SELECT COUNT(*) FROM questions q
           JOIN categories c ON c.category_id = q.category_id
           JOIN game_sessions s ON s.board_id = c.board_id
           WHERE s.session_id = ?1",
          rusqlite::params![session_id_str],
          |row| row.get(0),
        )?;
        let answered: i64 = tx.query_row(
          "SELECT COUNT(*) FROM question_attempts WHERE session_id = ?1",
          rusqlite::params![session_id_str],
          |row| row.get(0),
        )?;

        if answered == total {
          tx.execute(
            "UPDATE game_sessions
             SET status = 'completed', completed_at = ?1
             WHERE session_id = ?2 AND status = 'in_progress'",
            rusqlite::params![completed_str, session_id_str],
          )?;
        }

        let session = tx
          .query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM game_sessions WHERE session_id = ?1"),
            rusqlite::params![session_id_str],
            session_from_row,
          )
          .optional()?;

        tx.commit()?;
        Ok(session)
      })
      .await;

    let raw = match result {
      Ok(raw) => raw,
      Err(e) if is_unique_violation(&e, "question_attempts") => {
        return Err(Error::AlreadyAnswered {
          session_id:  attempt.session_id,
          question_id: attempt.question_id,
        });
      }
      Err(e) => return Err(e.into()),
    };

    let session = raw
      .ok_or(Error::SessionNotFound(attempt.session_id))?
      .into_session()?;

    Ok(AttemptRecorded { attempt, session })
  }
}
