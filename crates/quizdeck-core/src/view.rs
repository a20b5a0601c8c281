//! Player-facing projections — never stored, always derived.
//!
//! The session view is the one place a canonical answer may reach a
//! client, and only for questions the session has already attempted.
//! Unattempted questions carry text and point value, nothing else.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  board::QuizBoard,
  session::{AttemptOutcome, GameSession, QuestionAttempt, SessionStatus},
};

// ─── Session view ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
  pub session_id:   Uuid,
  pub player_id:    Uuid,
  pub score:        u32,
  pub status:       SessionStatus,
  pub started_at:   DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
  pub board:        SessionBoardView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBoardView {
  pub board_id:   Uuid,
  pub title:      String,
  pub categories: Vec<SessionCategoryView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCategoryView {
  pub category_id: Uuid,
  pub name:        String,
  pub questions:   Vec<SessionQuestionView>,
}

/// One question as the player sees it. The attempt-derived fields are
/// absent until an attempt exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionQuestionView {
  pub question_id:   Uuid,
  pub question_text: String,
  pub points:        u32,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub correct_answer:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub submitted_answer: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub outcome:          Option<AttemptOutcome>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub points_earned:    Option<u32>,
}

impl SessionQuestionView {
  pub fn is_attempted(&self) -> bool { self.outcome.is_some() }
}

/// Project a session, its board, and its attempts into the player-facing
/// view. Pure; safe to call repeatedly and concurrently with reads.
pub fn render(
  session: &GameSession,
  board: &QuizBoard,
  attempts: &[QuestionAttempt],
) -> SessionView {
  let by_question: HashMap<Uuid, &QuestionAttempt> =
    attempts.iter().map(|a| (a.question_id, a)).collect();

  let categories = board
    .categories
    .iter()
    .map(|category| SessionCategoryView {
      category_id: category.category_id,
      name:        category.name.clone(),
      questions:   category
        .questions
        .iter()
        .map(|question| {
          let attempt = by_question.get(&question.question_id);
          SessionQuestionView {
            question_id:      question.question_id,
            question_text:    question.question_text.clone(),
            points:           question.points,
            correct_answer:   attempt.map(|_| question.answer_text.clone()),
            submitted_answer: attempt.map(|a| a.submitted_answer.clone()),
            outcome:          attempt.map(|a| a.outcome),
            points_earned:    attempt.map(|a| a.points_earned),
          }
        })
        .collect(),
    })
    .collect();

  SessionView {
    session_id:   session.session_id,
    player_id:    session.player_id,
    score:        session.score,
    status:       session.status,
    started_at:   session.started_at,
    completed_at: session.completed_at,
    board:        SessionBoardView {
      board_id: board.board_id,
      title:    board.title.clone(),
      categories,
    },
  }
}

// ─── Board view ──────────────────────────────────────────────────────────────

/// A board as returned by the board routes: the full grid, canonical
/// answers withheld.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardView {
  pub board_id:   Uuid,
  pub title:      String,
  pub topic:      String,
  pub created_at: DateTime<Utc>,
  pub categories: Vec<BoardCategoryView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardCategoryView {
  pub category_id: Uuid,
  pub name:        String,
  pub questions:   Vec<BoardQuestionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardQuestionView {
  pub question_id:   Uuid,
  pub question_text: String,
  pub points:        u32,
}

impl From<&QuizBoard> for BoardView {
  fn from(board: &QuizBoard) -> Self {
    BoardView {
      board_id:   board.board_id,
      title:      board.title.clone(),
      topic:      board.topic.clone(),
      created_at: board.created_at,
      categories: board
        .categories
        .iter()
        .map(|category| BoardCategoryView {
          category_id: category.category_id,
          name:        category.name.clone(),
          questions:   category
            .questions
            .iter()
            .map(|question| BoardQuestionView {
              question_id:   question.question_id,
              question_text: question.question_text.clone(),
              points:        question.points,
            })
            .collect(),
        })
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::board::{Category, Question, QuizBoard};
  use crate::session::{AttemptOutcome, GameSession, QuestionAttempt, SessionStatus};

  fn board_with_two_questions() -> QuizBoard {
    let category_id = Uuid::new_v4();
    QuizBoard {
      board_id:   Uuid::new_v4(),
      title:      "Physics".into(),
      topic:      "physics".into(),
      created_by: Uuid::new_v4(),
      created_at: Utc::now(),
      categories: vec![Category {
        category_id,
        name: "Relativity".into(),
        position: 0,
        questions: vec![
          Question {
            question_id:   Uuid::new_v4(),
            category_id,
            question_text: "Who developed general relativity?".into(),
            answer_text:   "Albert Einstein".into(),
            points:        100,
            position:      0,
          },
          Question {
            question_id:   Uuid::new_v4(),
            category_id,
            question_text: "What does c denote?".into(),
            answer_text:   "The speed of light".into(),
            points:        200,
            position:      1,
          },
        ],
      }],
    }
  }

  fn session_for(board: &QuizBoard) -> GameSession {
    GameSession {
      session_id:   Uuid::new_v4(),
      board_id:     board.board_id,
      player_id:    Uuid::new_v4(),
      score:        100,
      status:       SessionStatus::InProgress,
      started_at:   Utc::now(),
      completed_at: None,
    }
  }

  #[test]
  fn unattempted_questions_withhold_answer_fields() {
    let board = board_with_two_questions();
    let session = session_for(&board);

    let view = render(&session, &board, &[]);

    let questions = &view.board.categories[0].questions;
    assert_eq!(questions.len(), 2);
    for q in questions {
      assert!(!q.is_attempted());
      assert!(q.correct_answer.is_none());
      assert!(q.submitted_answer.is_none());
      assert!(q.outcome.is_none());
      assert!(q.points_earned.is_none());
    }
  }

  #[test]
  fn attempted_question_reveals_answer_and_matches_attempt() {
    let board = board_with_two_questions();
    let session = session_for(&board);
    let answered = &board.categories[0].questions[0];

    let attempt = QuestionAttempt {
      attempt_id:       Uuid::new_v4(),
      session_id:       session.session_id,
      question_id:      answered.question_id,
      submitted_answer: "einstein".into(),
      outcome:          AttemptOutcome::Correct,
      points_earned:    100,
      attempted_at:     Utc::now(),
    };

    let view = render(&session, &board, &[attempt]);
    let questions = &view.board.categories[0].questions;

    let first = &questions[0];
    assert!(first.is_attempted());
    assert_eq!(first.correct_answer.as_deref(), Some("Albert Einstein"));
    assert_eq!(first.submitted_answer.as_deref(), Some("einstein"));
    assert_eq!(first.outcome, Some(AttemptOutcome::Correct));
    assert_eq!(first.points_earned, Some(100));

    // The second question stays sealed.
    assert!(questions[1].correct_answer.is_none());
  }

  #[test]
  fn absent_attempt_fields_are_omitted_from_json() {
    let board = board_with_two_questions();
    let session = session_for(&board);

    let view = render(&session, &board, &[]);
    let json = serde_json::to_string(&view).unwrap();

    assert!(!json.contains("correct_answer"));
    assert!(!json.contains("Albert Einstein"));
  }

  #[test]
  fn board_view_never_contains_answers() {
    let board = board_with_two_questions();
    let view = BoardView::from(&board);
    let json = serde_json::to_string(&view).unwrap();

    assert!(!json.contains("answer"));
    assert!(!json.contains("Albert Einstein"));
    assert_eq!(view.categories[0].questions.len(), 2);
  }
}
