//! Level selection: which tier of a pool a requested level maps to.

use std::collections::BTreeSet;

use crate::domain::Question;
use crate::pool::Pool;

/// Parse the raw `level` request parameter. Anything that is not a positive
/// integer counts as "no level".
pub fn parse_level(raw: Option<&str>) -> Option<u32> {
  raw.and_then(|s| s.trim().parse::<u32>().ok()).filter(|l| *l > 0)
}

/// Distinct levels present in the pool, ascending.
pub fn tiers(pool: &Pool) -> Vec<u32> {
  pool.questions()
    .iter()
    .map(|q| q.level)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// The tier a request resolves to. `None` (or zero) falls back to the lowest tier.
pub fn resolve_level(pool: &Pool, level: Option<u32>) -> Option<u32> {
  match level.filter(|l| *l > 0) {
    Some(l) => Some(l),
    None => tiers(pool).first().copied(),
  }
}

/// Questions of the resolved tier, in pool order. An unmatched level gives an
/// empty list.
pub fn select_by_level(pool: &Pool, level: Option<u32>) -> Vec<&Question> {
  let Some(tier) = resolve_level(pool, level) else {
    return Vec::new();
  };
  pool.questions().iter().filter(|q| q.level == tier).collect()
}
