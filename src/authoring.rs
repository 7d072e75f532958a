//! Authoring export ("add" mode): the existing pool plus newly written
//! questions, and the domain's answer key updated with the answers marked as
//! correct while authoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::domain::Question;
use crate::error::{AnswerKeyError, SessionError};
use crate::generator::QuizGenerator;
use crate::pool::Pool;

/// One rendered answer option and whether the author ticked it.
#[derive(Clone, Debug, Deserialize)]
pub struct CollectedAnswer {
  pub value: String,
  #[serde(default)]
  pub checked: bool,
}

/// question id -> rendered options
pub type CollectedAnswers = BTreeMap<String, Vec<CollectedAnswer>>;

#[derive(Debug, Serialize)]
pub struct AuthoringExport {
  /// Contents of `questions.json`.
  pub questions: Vec<Question>,
  /// Contents of `answers.json`.
  pub answers: Map<String, Value>,
}

/// Single fetch of the answer key; no retries.
#[instrument(level = "info", skip(client))]
pub async fn fetch_answer_key(client: &reqwest::Client, url: &str) -> Result<Map<String, Value>, AnswerKeyError> {
  let value: Value = client.get(url).send().await?.error_for_status()?.json().await?;
  match value {
    Value::Object(map) => Ok(map),
    _ => Err(AnswerKeyError::NotAnObject),
  }
}

/// A single checked value is stored as a string, several as an array.
pub fn merge_answer_key(mut key: Map<String, Value>, collected: &CollectedAnswers) -> Map<String, Value> {
  for (id, options) in collected {
    let mut correct: Vec<Value> = options
      .iter()
      .filter(|o| o.checked)
      .map(|o| Value::String(o.value.clone()))
      .collect();
    let entry = if correct.len() == 1 { correct.remove(0) } else { Value::Array(correct) };
    key.insert(id.clone(), entry);
  }
  key
}

/// Pool followed by the authored questions (answers reduced to text). The
/// combined list must still be a valid pool.
pub fn build_export(
  pool: &Pool,
  authored: Vec<Question>,
  answer_key: Map<String, Value>,
  collected: &CollectedAnswers,
) -> Result<AuthoringExport, SessionError> {
  let questions: Vec<Question> = pool
    .questions()
    .iter()
    .cloned()
    .chain(authored.into_iter().map(Question::simplified))
    .collect();
  let checked = Pool::new(questions)?;
  Ok(AuthoringExport {
    questions: checked.questions().to_vec(),
    answers: merge_answer_key(answer_key, collected),
  })
}

pub async fn export_for(
  client: &reqwest::Client,
  generator: &QuizGenerator,
  authored: Vec<Question>,
  collected: &CollectedAnswers,
) -> Result<AuthoringExport, SessionError> {
  let url = generator
    .answers_url
    .as_deref()
    .ok_or_else(|| AnswerKeyError::NoUrl(generator.domain.clone()))?;
  let key = fetch_answer_key(client, url).await?;
  let authored_count = authored.len();
  let export = build_export(generator.pool(), authored, key, collected)?;
  info!(target: "quiz_runner", domain = %generator.domain, authored = authored_count, total = export.questions.len(), "Authoring export built");
  Ok(export)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::tiered_pool;

  fn opts(raw: &[(&str, bool)]) -> Vec<CollectedAnswer> {
    raw.iter().map(|(v, c)| CollectedAnswer { value: v.to_string(), checked: *c }).collect()
  }

  #[test]
  fn merge_keeps_existing_and_shapes_new_entries() {
    let mut key = Map::new();
    key.insert("1".into(), Value::String("let".into()));
    let mut collected = CollectedAnswers::new();
    collected.insert("11".into(), opts(&[("a", true), ("b", false)]));
    collected.insert("12".into(), opts(&[("a", true), ("b", true)]));
    collected.insert("13".into(), opts(&[("a", false)]));

    let merged = merge_answer_key(key, &collected);
    assert_eq!(merged["1"], "let");
    assert_eq!(merged["11"], "a");
    assert_eq!(merged["12"], serde_json::json!(["a", "b"]));
    assert_eq!(merged["13"], serde_json::json!([]));
  }

  #[test]
  fn export_appends_simplified_questions() {
    let pool = tiered_pool();
    let authored: Question = serde_json::from_value(serde_json::json!({
      "id": 11, "level": 3, "text": "new", "answers": [{"text": "x", "checked": true}]
    }))
    .unwrap();
    let export = build_export(&pool, vec![authored], Map::new(), &CollectedAnswers::new()).unwrap();
    assert_eq!(export.questions.len(), 11);
    let last = export.questions.last().unwrap();
    assert_eq!(last.answers, vec![Value::String("x".into())]);
  }

  #[test]
  fn export_rejects_colliding_ids() {
    let pool = tiered_pool();
    let dup = Question::new(3, 1, "dup");
    let err = build_export(&pool, vec![dup], Map::new(), &CollectedAnswers::new()).unwrap_err();
    assert!(matches!(err, SessionError::Pool(_)));
  }

  #[tokio::test]
  async fn generator_without_answer_key_url_fails() {
    let generator = QuizGenerator::new("js", "JS", tiered_pool());
    let client = reqwest::Client::new();
    let err = export_for(&client, &generator, vec![], &CollectedAnswers::new()).await.unwrap_err();
    assert!(matches!(err, SessionError::AnswerKey(AnswerKeyError::NoUrl(_))));
  }
}
