//! Quiz board provider — topic-keyed get-or-create over a store and a
//! generator.

use std::sync::Arc;

use tracing::{error, info};

use crate::{
  Error, Result,
  board::{NewBoard, NewCategory, NewQuestion, PointsPolicy, QuizBoard},
  generate::QuizGenerator,
  player::Player,
  store::GameStore,
};

/// Serves boards by topic: an existing board with the exact same topic is
/// reused; otherwise one is generated and persisted as a single atomic
/// unit.
pub struct BoardProvider<S, G> {
  store:     Arc<S>,
  generator: Arc<G>,
  points:    PointsPolicy,
}

impl<S, G> BoardProvider<S, G>
where
  S: GameStore,
  S::Error: Into<Error>,
  G: QuizGenerator,
{
  pub fn new(store: Arc<S>, generator: Arc<G>, points: PointsPolicy) -> Self {
    Self { store, generator, points }
  }

  /// Return the board for `topic`, generating and persisting it on first
  /// request. The topic match is case-sensitive and exact.
  pub async fn get_or_create(
    &self,
    topic: &str,
    creator: &Player,
  ) -> Result<QuizBoard> {
    let topic = topic.trim();
    if topic.is_empty() {
      return Err(Error::Validation("topic must not be empty".into()));
    }

    if let Some(board) = self
      .store
      .find_board_by_topic(topic.to_owned())
      .await
      .map_err(Into::into)?
    {
      info!(topic, board_id = %board.board_id, "reusing existing quiz board");
      return Ok(board);
    }

    info!(topic, "generating quiz board");
    let generated = self.generator.generate(topic).await.map_err(|e| {
      error!(topic, error = %e, "quiz board generation failed");
      e
    })?;
    generated.validate()?;

    let new_board = NewBoard {
      title:      generated.title,
      topic:      topic.to_owned(),
      created_by: creator.player_id,
      categories: generated
        .categories
        .into_iter()
        .map(|category| NewCategory {
          name:      category.name,
          questions: category
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, question)| NewQuestion {
              question_text: question.question_text,
              answer_text:   question.answer,
              points:        self.points.points_for(index, question.points),
            })
            .collect(),
        })
        .collect(),
    };

    match self.store.add_board(new_board).await.map_err(Into::into) {
      Ok(board) => {
        info!(topic, board_id = %board.board_id, "persisted generated quiz board");
        Ok(board)
      }
      // Lost a creation race for the same topic: the winner's board is
      // the canonical one.
      Err(Error::DuplicateTopic(_)) => self
        .store
        .find_board_by_topic(topic.to_owned())
        .await
        .map_err(Into::into)?
        .ok_or_else(|| {
          Error::Generation(format!("board for topic {topic:?} vanished"))
        }),
      Err(e) => {
        error!(topic, error = %e, "failed to persist generated quiz board");
        Err(e)
      }
    }
  }
}
