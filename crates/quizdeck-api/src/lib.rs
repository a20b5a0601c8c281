//! JSON REST API for quizdeck.
//!
//! Exposes an axum [`Router`] backed by any
//! [`quizdeck_core::store::GameStore`] and any
//! [`quizdeck_core::generate::QuizGenerator`]. TLS and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", quizdeck_api::api_router(state.clone()))
//! ```

pub mod auth;
pub mod boards;
pub mod error;
pub mod sessions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use chrono::Duration;
use quizdeck_core::{
  Error as DomainError,
  board::PointsPolicy,
  engine::GameEngine,
  generate::QuizGenerator,
  grader,
  provider::BoardProvider,
  store::GameStore,
};

pub use error::ApiError;

// ─── Options & state ─────────────────────────────────────────────────────────

/// Tunables for the API layer, usually sourced from server config.
#[derive(Debug, Clone)]
pub struct ApiOptions {
  /// Lifetime of issued bearer tokens.
  pub token_ttl:         Duration,
  /// Answer-grading acceptance threshold, 0-100.
  pub grading_threshold: u8,
  pub points:            PointsPolicy,
}

impl Default for ApiOptions {
  fn default() -> Self {
    Self {
      token_ttl:         Duration::days(30),
      grading_threshold: grader::DEFAULT_THRESHOLD,
      points:            PointsPolicy::default(),
    }
  }
}

/// Shared state threaded through all axum handlers.
pub struct ApiState<S, G> {
  pub store:     Arc<S>,
  pub engine:    Arc<GameEngine<S>>,
  pub provider:  Arc<BoardProvider<S, G>>,
  pub token_ttl: Duration,
}

// Manual impl: the derive would require `S: Clone` and `G: Clone`.
impl<S, G> Clone for ApiState<S, G> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      engine:    Arc::clone(&self.engine),
      provider:  Arc::clone(&self.provider),
      token_ttl: self.token_ttl,
    }
  }
}

impl<S, G> ApiState<S, G>
where
  S: GameStore,
  S::Error: Into<DomainError>,
  G: QuizGenerator,
{
  pub fn new(store: Arc<S>, generator: Arc<G>, options: ApiOptions) -> Self {
    let engine =
      Arc::new(GameEngine::new(Arc::clone(&store), options.grading_threshold));
    let provider = Arc::new(BoardProvider::new(
      Arc::clone(&store),
      generator,
      options.points,
    ));
    Self { store, engine, provider, token_ttl: options.token_ttl }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S, G>(state: ApiState<S, G>) -> Router<()>
where
  S: GameStore + 'static,
  S::Error: Into<DomainError>,
  G: QuizGenerator + 'static,
{
  Router::new()
    // Auth
    .route("/auth/guest", post(auth::guest::<S, G>))
    .route("/auth/register", post(auth::register::<S, G>))
    .route("/auth/login", post(auth::login::<S, G>))
    .route("/auth/me", get(auth::me::<S, G>))
    // Quiz boards
    .route("/quiz-boards", get(boards::list::<S, G>))
    .route("/quiz-boards/from-topic", post(boards::from_topic::<S, G>))
    // Game sessions
    .route(
      "/game-sessions/new-from-quiz-board/{quiz_board_id}",
      post(sessions::new_from_board::<S, G>),
    )
    .route("/game-sessions/existing", get(sessions::existing::<S, G>))
    .route("/game-sessions/{id}", get(sessions::get_one::<S, G>))
    .route(
      "/game-sessions/{id}/answer-question/{question_id}",
      post(sessions::answer::<S, G>),
    )
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use quizdeck_core::generate::{
    GeneratedBoard, GeneratedCategory, GeneratedQuestion,
  };
  use quizdeck_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  /// Canned generator: same two-category board for every topic.
  struct StaticGenerator;

  impl QuizGenerator for StaticGenerator {
    async fn generate(&self, topic: &str) -> Result<GeneratedBoard, DomainError> {
      Ok(GeneratedBoard {
        title:      format!("All about {topic}"),
        categories: vec![
          GeneratedCategory {
            name:      "People".into(),
            questions: vec![
              GeneratedQuestion {
                question_text: "Who developed the theory of relativity?".into(),
                answer:        "Albert Einstein".into(),
                points:        None,
              },
              GeneratedQuestion {
                question_text: "Who painted the Mona Lisa?".into(),
                answer:        "Leonardo da Vinci".into(),
                points:        None,
              },
            ],
          },
          GeneratedCategory {
            name:      "Places".into(),
            questions: vec![
              GeneratedQuestion {
                question_text: "What is the capital of France?".into(),
                answer:        "Paris".into(),
                points:        None,
              },
              GeneratedQuestion {
                question_text: "Which river runs through Cairo?".into(),
                answer:        "the Nile".into(),
                points:        None,
              },
            ],
          },
        ],
      })
    }
  }

  /// Generator that always fails, for the 500 path.
  struct FailingGenerator;

  impl QuizGenerator for FailingGenerator {
    async fn generate(&self, _topic: &str) -> Result<GeneratedBoard, DomainError> {
      Err(DomainError::Generation("upstream produced garbage".into()))
    }
  }

  async fn make_state() -> ApiState<SqliteStore, StaticGenerator> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    ApiState::new(
      Arc::new(store),
      Arc::new(StaticGenerator),
      ApiOptions::default(),
    )
  }

  async fn request<G: QuizGenerator + 'static>(
    state: ApiState<SqliteStore, G>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = api_router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn guest_token(state: &ApiState<SqliteStore, StaticGenerator>) -> String {
    let (status, body) =
      request(state.clone(), "POST", "/auth/guest", None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_owned()
  }

  /// Create a board for `topic` and return (board json, question ids in
  /// grid order).
  async fn make_board(
    state: &ApiState<SqliteStore, StaticGenerator>,
    token: &str,
    topic: &str,
  ) -> (Value, Vec<Uuid>) {
    let (status, board) = request(
      state.clone(),
      "POST",
      "/quiz-boards/from-topic",
      Some(token),
      Some(json!({ "topic": topic })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "from-topic failed: {board}");

    let ids = board["categories"]
      .as_array()
      .unwrap()
      .iter()
      .flat_map(|c| c["questions"].as_array().unwrap())
      .map(|q| q["question_id"].as_str().unwrap().parse().unwrap())
      .collect();
    (board, ids)
  }

  async fn start_session(
    state: &ApiState<SqliteStore, StaticGenerator>,
    token: &str,
    board: &Value,
  ) -> String {
    let board_id = board["board_id"].as_str().unwrap();
    let (status, body) = request(
      state.clone(),
      "POST",
      &format!("/game-sessions/new-from-quiz-board/{board_id}"),
      Some(token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["game_session_id"].as_str().unwrap().to_owned()
  }

  async fn submit_answer(
    state: &ApiState<SqliteStore, StaticGenerator>,
    token: &str,
    session_id: &str,
    question_id: Uuid,
    answer: &str,
  ) -> (StatusCode, Value) {
    request(
      state.clone(),
      "POST",
      &format!("/game-sessions/{session_id}/answer-question/{question_id}"),
      Some(token),
      Some(json!({ "answer": answer })),
    )
    .await
  }

  // ── Auth ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn guest_token_authenticates_me() {
    let state = make_state().await;
    let token = guest_token(&state).await;

    let (status, body) =
      request(state, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["display_name"].as_str().unwrap().starts_with("Guest-"));
    assert_eq!(body["backing"]["kind"], "guest");
  }

  #[tokio::test]
  async fn requests_without_token_get_401() {
    let state = make_state().await;

    for (method, uri) in [
      ("GET", "/auth/me"),
      ("GET", "/quiz-boards"),
      ("POST", "/quiz-boards/from-topic"),
      ("GET", "/game-sessions/existing?quiz_board_id=00000000-0000-0000-0000-000000000000"),
    ] {
      let (status, _) = request(
        state.clone(),
        method,
        uri,
        None,
        (method == "POST").then(|| json!({ "topic": "x" })),
      )
      .await;
      assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
  }

  #[tokio::test]
  async fn register_login_roundtrip() {
    let state = make_state().await;

    let (status, body) = request(
      state.clone(),
      "POST",
      "/auth/register",
      None,
      Some(json!({ "username": "alice", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["player"]["display_name"], "alice");

    let (status, body) = request(
      state.clone(),
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": "alice", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();

    let (status, me) =
      request(state.clone(), "GET", "/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["backing"]["kind"], "user");

    let (status, _) = request(
      state,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn register_rejects_short_password_and_duplicate_username() {
    let state = make_state().await;

    let (status, _) = request(
      state.clone(),
      "POST",
      "/auth/register",
      None,
      Some(json!({ "username": "bob", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({ "username": "bob", "password": "long enough" });
    let (status, _) = request(
      state.clone(),
      "POST",
      "/auth/register",
      None,
      Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) =
      request(state, "POST", "/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn registering_with_guest_bearer_links_the_guest() {
    let state = make_state().await;
    let token = guest_token(&state).await;

    let (status, body) = request(
      state.clone(),
      "POST",
      "/auth/register",
      Some(&token),
      Some(json!({ "username": "carol", "password": "long enough" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["player"]["backing"]["kind"], "user");

    // The old guest token still resolves to the guest player.
    let (status, me) =
      request(state, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["backing"]["kind"], "guest");
  }

  // ── Boards ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn from_topic_generates_once_and_reuses() {
    let state = make_state().await;
    let token = guest_token(&state).await;

    let (first, _) = make_board(&state, &token, "history").await;
    let (second, _) = make_board(&state, &token, "history").await;
    assert_eq!(first["board_id"], second["board_id"]);

    // Ascending policy: 100 then 200 within each category.
    let people = &first["categories"][0]["questions"];
    assert_eq!(people[0]["points"], 100);
    assert_eq!(people[1]["points"], 200);

    let (status, list) =
      request(state, "GET", "/quiz-boards", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn board_response_carries_no_answers() {
    let state = make_state().await;
    let token = guest_token(&state).await;

    let (board, _) = make_board(&state, &token, "art").await;
    let raw = board.to_string();
    assert!(!raw.contains("Albert Einstein"), "leaked answer: {raw}");
    assert!(!raw.contains("answer"), "leaked answer field: {raw}");
  }

  #[tokio::test]
  async fn blank_topic_is_a_400() {
    let state = make_state().await;
    let token = guest_token(&state).await;

    let (status, _) = request(
      state,
      "POST",
      "/quiz-boards/from-topic",
      Some(&token),
      Some(json!({ "topic": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn generator_failure_is_a_500() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = ApiState::new(
      Arc::new(store),
      Arc::new(FailingGenerator),
      ApiOptions::default(),
    );

    let (status, body) = request(
      state.clone(),
      "POST",
      "/auth/guest",
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().unwrap().to_owned();

    let (status, _) = request(
      state,
      "POST",
      "/quiz-boards/from-topic",
      Some(&token),
      Some(json!({ "topic": "anything" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  }

  // ── Sessions ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn full_game_scores_and_completes() {
    let state = make_state().await;
    let token = guest_token(&state).await;
    let (board, qs) = make_board(&state, &token, "science").await;
    let session_id = start_session(&state, &token, &board).await;

    // Exact answer, full marks.
    let (status, result) =
      submit_answer(&state, &token, &session_id, qs[0], "Albert Einstein").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["status"], "correct");
    assert_eq!(result["points_earned"], 100);
    assert_eq!(result["updated_score"], 100);
    assert_eq!(result["game_status"], "in_progress");

    // Fuzzy partial match: surname only.
    let (_, result) =
      submit_answer(&state, &token, &session_id, qs[1], "da vinci").await;
    assert_eq!(result["status"], "correct");
    assert_eq!(result["updated_score"], 300);

    // Wrong answer earns nothing but reveals the canonical answer.
    let (_, result) =
      submit_answer(&state, &token, &session_id, qs[2], "Lyon").await;
    assert_eq!(result["status"], "incorrect");
    assert_eq!(result["points_earned"], 0);
    assert_eq!(result["correct_answer"], "Paris");
    assert_eq!(result["updated_score"], 300);

    // Final answer completes the session.
    let (_, result) =
      submit_answer(&state, &token, &session_id, qs[3], "nile").await;
    assert_eq!(result["status"], "correct");
    assert_eq!(result["game_status"], "completed");
    assert_eq!(result["updated_score"], 500);
  }

  #[tokio::test]
  async fn completed_session_rejects_further_answers() {
    let state = make_state().await;
    let token = guest_token(&state).await;
    let (board, qs) = make_board(&state, &token, "science").await;
    let session_id = start_session(&state, &token, &board).await;

    for &q in &qs {
      let (status, _) =
        submit_answer(&state, &token, &session_id, q, "whatever").await;
      assert_eq!(status, StatusCode::OK);
    }

    let (status, body) =
      submit_answer(&state, &token, &session_id, qs[0], "again").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
      body["error"].as_str().unwrap().contains("no longer in progress"),
      "unexpected error: {body}"
    );
  }

  #[tokio::test]
  async fn duplicate_answer_is_rejected_and_score_unchanged() {
    let state = make_state().await;
    let token = guest_token(&state).await;
    let (board, qs) = make_board(&state, &token, "science").await;
    let session_id = start_session(&state, &token, &board).await;

    let (status, _) =
      submit_answer(&state, &token, &session_id, qs[0], "Albert Einstein").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
      submit_answer(&state, &token, &session_id, qs[0], "Einstein again").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already answered"));

    let (_, view) = request(
      state,
      "GET",
      &format!("/game-sessions/{session_id}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(view["score"], 100);
  }

  #[tokio::test]
  async fn session_view_reveals_only_attempted_answers() {
    let state = make_state().await;
    let token = guest_token(&state).await;
    let (board, qs) = make_board(&state, &token, "science").await;
    let session_id = start_session(&state, &token, &board).await;

    submit_answer(&state, &token, &session_id, qs[0], "einstein").await;

    let (status, view) = request(
      state,
      "GET",
      &format!("/game-sessions/{session_id}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let questions: Vec<&Value> = view["board"]["categories"]
      .as_array()
      .unwrap()
      .iter()
      .flat_map(|c| c["questions"].as_array().unwrap())
      .collect();
    assert_eq!(questions.len(), 4);

    // "einstein" partial-matches "Albert Einstein" at the default
    // threshold.
    assert_eq!(questions[0]["outcome"], "correct");
    assert_eq!(questions[0]["correct_answer"], "Albert Einstein");
    assert_eq!(questions[0]["submitted_answer"], "einstein");

    for q in &questions[1..] {
      assert!(q.get("correct_answer").is_none(), "leaked: {q}");
      assert!(q.get("outcome").is_none());
    }
  }

  #[tokio::test]
  async fn other_players_session_is_403() {
    let state = make_state().await;
    let owner = guest_token(&state).await;
    let intruder = guest_token(&state).await;
    let (board, qs) = make_board(&state, &owner, "science").await;
    let session_id = start_session(&state, &owner, &board).await;

    let (status, _) = request(
      state.clone(),
      "GET",
      &format!("/game-sessions/{session_id}"),
      Some(&intruder),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
      submit_answer(&state, &intruder, &session_id, qs[0], "x").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn unknown_ids_are_404() {
    let state = make_state().await;
    let token = guest_token(&state).await;
    let (board, _) = make_board(&state, &token, "science").await;
    let session_id = start_session(&state, &token, &board).await;

    let (status, _) = request(
      state.clone(),
      "GET",
      &format!("/game-sessions/{}", Uuid::new_v4()),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
      state.clone(),
      "POST",
      &format!("/game-sessions/new-from-quiz-board/{}", Uuid::new_v4()),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
      submit_answer(&state, &token, &session_id, Uuid::new_v4(), "x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn existing_finds_latest_session_or_none() {
    let state = make_state().await;
    let token = guest_token(&state).await;
    let (board, _) = make_board(&state, &token, "science").await;
    let board_id = board["board_id"].as_str().unwrap();

    let (status, body) = request(
      state.clone(),
      "GET",
      &format!("/game-sessions/existing?quiz_board_id={board_id}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // The id is omitted entirely, not serialized as null.
    assert!(body.get("game_session_id").is_none());

    let session_id = start_session(&state, &token, &board).await;
    let (_, body) = request(
      state,
      "GET",
      &format!("/game-sessions/existing?quiz_board_id={board_id}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(body["game_session_id"], session_id.as_str());
  }
}
