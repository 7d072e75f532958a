//! Index selection: which pool entries a request presents, and in what order.
//!
//! Two modes:
//!   - explicit ids, resolved in the caller's order and never truncated
//!   - level based, optionally shuffled, then truncated to the display limit

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Question, QuestionId};
use crate::error::SelectionError;
use crate::levels::select_by_level;
use crate::pool::Pool;

/// Presentation flags, passed by value into every selection call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionConfig {
  pub shuffle: bool,
  pub display_limit: Option<usize>,
  pub show_correct_answers: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionMode {
  Level(Option<u32>),
  Explicit(Vec<QuestionId>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionRequest {
  pub mode: SelectionMode,
  pub count: Option<usize>,
}

impl SelectionRequest {
  pub fn by_level(level: Option<u32>) -> Self {
    Self { mode: SelectionMode::Level(level), count: None }
  }

  pub fn explicit(ids: Vec<QuestionId>) -> Self {
    Self { mode: SelectionMode::Explicit(ids), count: None }
  }
}

/// Selection with the thread-local random source.
pub fn select_indexes(
  pool: &Pool,
  request: &SelectionRequest,
  config: SelectionConfig,
) -> Result<Vec<usize>, SelectionError> {
  select_indexes_with_rng(pool, request, config, &mut rand::thread_rng())
}

pub fn select_indexes_with_rng<R: Rng + ?Sized>(
  pool: &Pool,
  request: &SelectionRequest,
  config: SelectionConfig,
  rng: &mut R,
) -> Result<Vec<usize>, SelectionError> {
  match &request.mode {
    SelectionMode::Explicit(ids) => resolve_ids(pool, ids),
    SelectionMode::Level(level) => {
      // Pool ids are unique, so each selected question maps back to one index.
      let mut indexes: Vec<usize> = select_by_level(pool, *level)
        .into_iter()
        .filter_map(|q| pool.index_of(&q.id))
        .collect();
      if config.shuffle {
        indexes.shuffle(rng);
      }
      if let Some(limit) = request.count.or(config.display_limit) {
        indexes.truncate(limit);
      }
      debug!(target: "selection", level = ?level, count = indexes.len(), shuffled = config.shuffle, "Level selection");
      Ok(indexes)
    }
  }
}

/// Map ids to pool indexes in the given order. The first unknown id fails the
/// whole resolution.
pub fn resolve_ids(pool: &Pool, ids: &[QuestionId]) -> Result<Vec<usize>, SelectionError> {
  ids.iter()
    .map(|id| pool.index_of(id).ok_or_else(|| SelectionError::UnknownQuestionId(id.clone())))
    .collect()
}

/// Questions at the given indexes. Indexes come from `select_indexes` on the
/// same pool, so they are always in range.
pub fn questions_at(pool: &Pool, indexes: &[usize]) -> Vec<Question> {
  indexes.iter().filter_map(|idx| pool.get(*idx).cloned()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::{rngs::StdRng, SeedableRng};

  use crate::seeds::tiered_pool;

  fn ids(raw: &[&str]) -> Vec<QuestionId> {
    raw.iter().map(|s| QuestionId::from(*s)).collect()
  }

  fn with_count(request: SelectionRequest, count: usize) -> SelectionRequest {
    SelectionRequest { count: Some(count), ..request }
  }

  #[test]
  fn explicit_ids_keep_caller_order() {
    let pool = tiered_pool();
    let req = SelectionRequest::explicit(ids(&["7", "3", "9"]));
    let idx = select_indexes(&pool, &req, SelectionConfig::default()).unwrap();
    assert_eq!(idx, vec![6, 2, 8]);
  }

  #[test]
  fn unknown_id_fails_instead_of_dropping() {
    let pool = tiered_pool();
    let req = SelectionRequest::explicit(ids(&["7", "999"]));
    let err = select_indexes(&pool, &req, SelectionConfig::default()).unwrap_err();
    assert_eq!(err, SelectionError::UnknownQuestionId(QuestionId::from("999")));
  }

  #[test]
  fn explicit_ids_ignore_limit_and_shuffle() {
    let pool = tiered_pool();
    let config = SelectionConfig { shuffle: true, display_limit: Some(1), show_correct_answers: false };
    let req = with_count(SelectionRequest::explicit(ids(&["4", "5", "6"])), 1);
    let idx = select_indexes(&pool, &req, config).unwrap();
    assert_eq!(idx, vec![3, 4, 5]);
  }

  #[test]
  fn level_mode_truncates_after_ordering() {
    let pool = tiered_pool();
    let config = SelectionConfig { display_limit: Some(2), ..Default::default() };
    let idx = select_indexes(&pool, &SelectionRequest::by_level(Some(2)), config).unwrap();
    assert_eq!(idx, vec![3, 4]);

    let idx = select_indexes(&pool, &with_count(SelectionRequest::by_level(Some(2)), 3), config).unwrap();
    assert_eq!(idx, vec![3, 4, 5]);
  }

  #[test]
  fn shuffle_is_a_permutation_of_the_tier() {
    let pool = tiered_pool();
    let config = SelectionConfig { shuffle: true, ..Default::default() };
    let mut rng = StdRng::seed_from_u64(7);
    let mut idx = select_indexes_with_rng(&pool, &SelectionRequest::by_level(Some(2)), config, &mut rng).unwrap();
    idx.sort_unstable();
    assert_eq!(idx, vec![3, 4, 5, 6]);
  }

  #[test]
  fn seeded_shuffles_are_reproducible() {
    let pool = tiered_pool();
    let config = SelectionConfig { shuffle: true, ..Default::default() };
    let req = SelectionRequest::by_level(Some(2));
    let a = select_indexes_with_rng(&pool, &req, config, &mut StdRng::seed_from_u64(42)).unwrap();
    let b = select_indexes_with_rng(&pool, &req, config, &mut StdRng::seed_from_u64(42)).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn unmatched_level_selects_nothing() {
    let pool = tiered_pool();
    let idx = select_indexes(&pool, &SelectionRequest::by_level(Some(5)), SelectionConfig::default()).unwrap();
    assert!(idx.is_empty());
    assert!(questions_at(&pool, &idx).is_empty());
  }
}
