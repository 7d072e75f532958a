//! Domain models used by the backend: question identifiers and questions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Stable question identifier. Pools store them as integers or numeric strings;
/// both deserialize to the same textual form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
  pub fn new(id: impl Into<String>) -> Self {
    QuestionId(id.into().trim().to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Numeric value of the id, when it is one.
  pub fn as_number(&self) -> Option<u64> {
    self.0.parse().ok()
  }
}

impl fmt::Display for QuestionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<u64> for QuestionId {
  fn from(n: u64) -> Self { QuestionId(n.to_string()) }
}

impl From<&str> for QuestionId {
  fn from(s: &str) -> Self { QuestionId::new(s) }
}

impl From<String> for QuestionId {
  fn from(s: String) -> Self { QuestionId::new(s) }
}

impl<'de> Deserialize<'de> for QuestionId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      Number(u64),
      Text(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
      Raw::Number(n) => QuestionId::from(n),
      Raw::Text(s) => QuestionId::new(s),
    })
  }
}

fn default_level() -> u32 { 1 }

/// One catalogue entry. Only `id` and `level` are interpreted; everything else
/// is carried through untouched so exports write it back as it was loaded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
  pub id: QuestionId,
  #[serde(default = "default_level")]
  pub level: u32,
  #[serde(default)]
  pub text: String,
  #[serde(default)]
  pub answers: Vec<Value>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Question {
  pub fn new(id: impl Into<QuestionId>, level: u32, text: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      level,
      text: text.into(),
      answers: Vec::new(),
      extra: Map::new(),
    }
  }

  pub fn with_answers<I, S>(mut self, answers: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.answers = answers.into_iter().map(|a| Value::String(a.into())).collect();
    self
  }

  /// Rendered answers come back as objects (`{"text": .., "checked": ..}`);
  /// the stored catalogue keeps only their text.
  pub fn simplified(mut self) -> Self {
    self.answers = self
      .answers
      .into_iter()
      .map(|a| match a {
        Value::Object(ref obj) => match obj.get("text") {
          Some(Value::String(t)) => Value::String(t.clone()),
          _ => a,
        },
        other => other,
      })
      .collect();
    self
  }
}
