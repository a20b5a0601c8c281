//! Quiz board types — a board is a topic-keyed grid of categories and
//! questions, created once and immutable afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Persisted entities ──────────────────────────────────────────────────────

/// A full board with its category/question tree. Shared read-only across
/// any number of game sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizBoard {
  pub board_id:   Uuid,
  pub title:      String,
  /// The source topic string; acts as the natural dedup key
  /// (case-sensitive exact match).
  pub topic:      String,
  pub created_by: Uuid,
  pub created_at: DateTime<Utc>,
  pub categories: Vec<Category>,
}

impl QuizBoard {
  /// Total number of questions reachable from this board.
  pub fn question_count(&self) -> usize {
    self.categories.iter().map(|c| c.questions.len()).sum()
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
  pub category_id: Uuid,
  pub name:        String,
  pub position:    u32,
  pub questions:   Vec<Question>,
}

/// A single question. `answer_text` is the canonical answer; it must only
/// ever reach a client through the session view of an attempted question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
  pub question_id:   Uuid,
  pub category_id:   Uuid,
  pub question_text: String,
  pub answer_text:   String,
  pub points:        u32,
  pub position:      u32,
}

/// A board without its question tree, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSummary {
  pub board_id:   Uuid,
  pub title:      String,
  pub topic:      String,
  pub created_at: DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input for [`GameStore::add_board`](crate::store::GameStore::add_board).
/// The whole tree is persisted as one atomic unit.
#[derive(Debug, Clone)]
pub struct NewBoard {
  pub title:      String,
  pub topic:      String,
  pub created_by: Uuid,
  pub categories: Vec<NewCategory>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
  pub name:      String,
  pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
  pub question_text: String,
  pub answer_text:   String,
  pub points:        u32,
}

// ─── Points policy ───────────────────────────────────────────────────────────

/// How point values are assigned to generated questions.
///
/// The progression is provider policy, not a core invariant; the engine
/// only requires positive point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PointsPolicy {
  /// Ignore any provider-suggested value and assign `step`, `2 * step`,
  /// `3 * step`, ... per question within each category.
  Ascending { step: u32 },
  /// Trust the generation provider's value, falling back to the ascending
  /// progression when it is missing or zero.
  ProviderSupplied { fallback_step: u32 },
}

impl Default for PointsPolicy {
  fn default() -> Self { PointsPolicy::Ascending { step: 100 } }
}

impl PointsPolicy {
  /// Point value for the question at `index` (0-based) within a category.
  pub fn points_for(&self, index: usize, suggested: Option<u32>) -> u32 {
    let rank = (index as u32) + 1;
    match *self {
      PointsPolicy::Ascending { step } => rank * step,
      PointsPolicy::ProviderSupplied { fallback_step } => match suggested {
        Some(p) if p > 0 => p,
        _ => rank * fallback_step,
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ascending_ignores_suggested_points() {
    let policy = PointsPolicy::Ascending { step: 100 };
    assert_eq!(policy.points_for(0, Some(800)), 100);
    assert_eq!(policy.points_for(1, None), 200);
    assert_eq!(policy.points_for(4, Some(1)), 500);
  }

  #[test]
  fn provider_supplied_falls_back_when_missing_or_zero() {
    let policy = PointsPolicy::ProviderSupplied { fallback_step: 200 };
    assert_eq!(policy.points_for(0, Some(800)), 800);
    assert_eq!(policy.points_for(1, None), 400);
    assert_eq!(policy.points_for(2, Some(0)), 600);
  }
}
