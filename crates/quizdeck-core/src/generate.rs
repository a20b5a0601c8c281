//! The external quiz-generation boundary.
//!
//! A generator is a black-box producer of a board document for a topic:
//! a title plus categories of (question, answer) pairs, possibly with
//! suggested point values. It may fail or return malformed structure;
//! implementations surface both as [`Error::Generation`](crate::Error).

use std::future::Future;

use serde::Deserialize;

use crate::Error;

/// A generated board document, before point assignment and persistence.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedBoard {
  pub title:      String,
  pub categories: Vec<GeneratedCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedCategory {
  pub name:      String,
  pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuestion {
  pub question_text: String,
  pub answer:        String,
  /// A point value suggested by the provider. Whether it is honoured is
  /// decided by the configured [`PointsPolicy`](crate::board::PointsPolicy).
  #[serde(default)]
  pub points:        Option<u32>,
}

impl GeneratedBoard {
  /// Reject structurally empty documents before they reach the store.
  pub fn validate(&self) -> Result<(), Error> {
    if self.title.trim().is_empty() {
      return Err(Error::Generation("generated board has no title".into()));
    }
    if self.categories.is_empty() {
      return Err(Error::Generation("generated board has no categories".into()));
    }
    for category in &self.categories {
      if category.questions.is_empty() {
        return Err(Error::Generation(format!(
          "generated category {:?} has no questions",
          category.name
        )));
      }
    }
    Ok(())
  }
}

/// Produces a quiz board document for a topic.
pub trait QuizGenerator: Send + Sync {
  fn generate(
    &self,
    topic: &str,
  ) -> impl Future<Output = Result<GeneratedBoard, Error>> + Send;
}
