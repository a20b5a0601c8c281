//! OpenAI-backed implementation of [`QuizGenerator`].
//!
//! One chat-completion request per topic, no retries. Transport failures,
//! non-2xx responses, and unparseable model output all surface as
//! [`Error::Generation`]; the provider decides nothing beyond that.

use quizdeck_core::{
  Error,
  generate::{GeneratedBoard, QuizGenerator},
};
use serde_json::json;

pub struct OpenAiGenerator {
  client:   reqwest::Client,
  api_key:  String,
  model:    String,
  base_url: String,
}

impl OpenAiGenerator {
  pub fn new(api_key: String, model: String, base_url: String) -> Self {
    Self {
      client: reqwest::Client::new(),
      api_key,
      model,
      base_url: base_url.trim_end_matches('/').to_owned(),
    }
  }
}

fn prompt_for(topic: &str) -> String {
  format!(
    "You are a Jeopardy quiz creator. Create a Jeopardy-style quiz board \
     based on the following topic:\n\n\
     Topic: {topic}\n\n\
     For this topic, create 5 relevant categories with 5 questions each. \
     The questions should have increasing difficulty and point values \
     (200, 400, 600, 800, 1000).\n\n\
     Return the results as a JSON object with the following structure:\n\
     {{\n\
       \"title\": \"Quiz title based on the topic\",\n\
       \"categories\": [\n\
         {{\n\
           \"name\": \"Category 1 Name\",\n\
           \"questions\": [\n\
             {{\n\
               \"question_text\": \"Question text\",\n\
               \"answer\": \"Answer text\",\n\
               \"points\": 200\n\
             }}\n\
           ]\n\
         }}\n\
       ]\n\
     }}\n\n\
     Return only the JSON object, with all keys and string values in \
     double quotes."
  )
}

/// Parse the model's message content into a board document. Tolerates a
/// markdown code fence around the JSON.
fn parse_board(content: &str) -> Result<GeneratedBoard, Error> {
  let trimmed = content.trim();
  let trimmed = trimmed
    .strip_prefix("```json")
    .or_else(|| trimmed.strip_prefix("```"))
    .unwrap_or(trimmed);
  let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed).trim();

  serde_json::from_str(trimmed)
    .map_err(|e| Error::Generation(format!("malformed board document: {e}")))
}

impl QuizGenerator for OpenAiGenerator {
  async fn generate(&self, topic: &str) -> Result<GeneratedBoard, Error> {
    let body = json!({
      "model": self.model,
      "temperature": 0.1,
      "messages": [
        { "role": "user", "content": prompt_for(topic) }
      ],
      "response_format": { "type": "json_object" },
    });

    let response = self
      .client
      .post(format!("{}/chat/completions", self.base_url))
      .bearer_auth(&self.api_key)
      .json(&body)
      .send()
      .await
      .map_err(|e| Error::Generation(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let detail = response.text().await.unwrap_or_default();
      return Err(Error::Generation(format!(
        "upstream returned {status}: {detail}"
      )));
    }

    let payload: serde_json::Value = response
      .json()
      .await
      .map_err(|e| Error::Generation(format!("unreadable response: {e}")))?;

    let content = payload["choices"][0]["message"]["content"]
      .as_str()
      .ok_or_else(|| {
        Error::Generation("response carries no message content".into())
      })?;

    let board = parse_board(content)?;
    board.validate()?;
    tracing::info!(
      topic,
      title = %board.title,
      categories = board.categories.len(),
      "quiz board generated"
    );
    Ok(board)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DOCUMENT: &str = r#"{
    "title": "Marvel Mania",
    "categories": [
      {
        "name": "Heroes",
        "questions": [
          { "question_text": "Who is Iron Man?", "answer": "Tony Stark", "points": 200 }
        ]
      }
    ]
  }"#;

  #[test]
  fn parses_bare_json() {
    let board = parse_board(DOCUMENT).unwrap();
    assert_eq!(board.title, "Marvel Mania");
    assert_eq!(board.categories[0].questions[0].points, Some(200));
  }

  #[test]
  fn parses_fenced_json() {
    let fenced = format!("```json\n{DOCUMENT}\n```");
    let board = parse_board(&fenced).unwrap();
    assert_eq!(board.categories.len(), 1);
  }

  #[test]
  fn missing_points_is_tolerated() {
    let board = parse_board(
      r#"{"title":"T","categories":[{"name":"C","questions":[
        {"question_text":"Q","answer":"A"}]}]}"#,
    )
    .unwrap();
    assert_eq!(board.categories[0].questions[0].points, None);
  }

  #[test]
  fn malformed_document_is_a_generation_error() {
    let err = parse_board("not json at all").unwrap_err();
    assert!(matches!(err, Error::Generation(_)));
  }

  #[test]
  fn prompt_mentions_topic_and_grid_shape() {
    let prompt = prompt_for("the French Revolution");
    assert!(prompt.contains("the French Revolution"));
    assert!(prompt.contains("5 relevant categories with 5 questions"));
  }
}
