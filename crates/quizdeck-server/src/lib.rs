//! quizdeck server wiring: configuration and the OpenAI-backed quiz
//! generator. The binary in `main.rs` is a thin shell around these.

pub mod openai;

use std::path::PathBuf;

use quizdeck_core::board::PointsPolicy;
use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// with `QUIZDECK_`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,

  pub openai_api_key: String,
  #[serde(default = "default_model")]
  pub openai_model: String,
  /// Override for testing against a stub endpoint.
  #[serde(default = "default_base_url")]
  pub openai_base_url: String,

  /// Answer-grading acceptance threshold, 0-100.
  #[serde(default = "default_threshold")]
  pub grading_threshold: u8,
  #[serde(default = "default_token_ttl_days")]
  pub token_ttl_days: i64,
  #[serde(default)]
  pub points: PointsPolicy,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("quizdeck.db") }
fn default_model() -> String { "gpt-4o-mini".to_owned() }
fn default_base_url() -> String { "https://api.openai.com/v1".to_owned() }
fn default_threshold() -> u8 { quizdeck_core::grader::DEFAULT_THRESHOLD }
fn default_token_ttl_days() -> i64 { 30 }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minimal_config_fills_defaults() {
    let cfg: ServerConfig =
      serde_json::from_value(serde_json::json!({ "openai_api_key": "sk-test" }))
        .unwrap();

    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.openai_model, "gpt-4o-mini");
    assert_eq!(cfg.grading_threshold, 80);
    assert_eq!(cfg.token_ttl_days, 30);
    assert_eq!(cfg.points, PointsPolicy::Ascending { step: 100 });
  }

  #[test]
  fn points_policy_is_configurable() {
    let cfg: ServerConfig = serde_json::from_value(serde_json::json!({
      "openai_api_key": "sk-test",
      "points": { "mode": "provider_supplied", "fallback_step": 200 },
    }))
    .unwrap();
    assert_eq!(cfg.points, PointsPolicy::ProviderSupplied { fallback_step: 200 });
  }
}
