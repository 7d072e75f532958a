//! Question pool: the ordered, read-only catalogue of one domain.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::{Question, QuestionId};
use crate::error::PoolError;

#[derive(Clone, Debug, Default)]
pub struct Pool {
  questions: Vec<Question>,
  index_by_id: HashMap<QuestionId, usize>,
}

impl Pool {
  /// Build a pool, rejecting duplicate ids and ids that go backwards.
  pub fn new(questions: Vec<Question>) -> Result<Self, PoolError> {
    let mut index_by_id = HashMap::with_capacity(questions.len());
    // Last numeric id seen; non-numeric ids in between do not reset it.
    let mut last_numeric: Option<(u64, &QuestionId)> = None;
    for (idx, q) in questions.iter().enumerate() {
      if index_by_id.insert(q.id.clone(), idx).is_some() {
        return Err(PoolError::DuplicateId(q.id.clone()));
      }
      let Some(n) = q.id.as_number() else { continue };
      if let Some((prev, prev_id)) = last_numeric {
        if n < prev {
          return Err(PoolError::IdOutOfOrder { previous: prev_id.clone(), id: q.id.clone() });
        }
      }
      last_numeric = Some((n, &q.id));
    }
    Ok(Self { questions, index_by_id })
  }

  pub fn questions(&self) -> &[Question] {
    &self.questions
  }

  pub fn get(&self, idx: usize) -> Option<&Question> {
    self.questions.get(idx)
  }

  pub fn index_of(&self, id: &QuestionId) -> Option<usize> {
    self.index_by_id.get(id).copied()
  }

  pub fn len(&self) -> usize {
    self.questions.len()
  }

  #[allow(dead_code)]
  pub fn is_empty(&self) -> bool {
    self.questions.is_empty()
  }

  /// The id a newly authored question gets: one past the last entry.
  pub fn next_id(&self) -> u64 {
    self.questions
      .last()
      .and_then(|q| q.id.as_number())
      .unwrap_or(0)
      + 1
  }
}

/// Read a JSON array of questions (the format the authoring export writes).
#[instrument(level = "info")]
pub async fn load_questions_file(path: &str) -> Result<Vec<Question>, PoolError> {
  let raw = tokio::fs::read_to_string(path)
    .await
    .map_err(|source| PoolError::Read { path: path.to_string(), source })?;
  let questions: Vec<Question> = serde_json::from_str(&raw)
    .map_err(|source| PoolError::Parse { path: path.to_string(), source })?;
  debug!(target: "quiz_runner", %path, count = questions.len(), "Loaded questions file");
  Ok(questions)
}
