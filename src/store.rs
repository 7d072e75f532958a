//! Small string key-value store for remembered inputs (the last id list per
//! domain/type). Nothing here needs to outlive the process.

use std::{collections::HashMap, sync::RwLock};

/// Key under which the last explicit id list for a domain/type is kept.
pub fn last_ids_key(domain: &str, kind: &str) -> String {
  format!("quiz-{domain}-{kind}")
}

pub trait KeyValueStore: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&self, key: &str, value: String);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: RwLock<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Option<String> {
    let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
    entries.get(key).cloned()
  }

  fn set(&self, key: &str, value: String) {
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    entries.insert(key.to_string(), value);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn set_then_get() {
    let store = MemoryStore::default();
    let key = last_ids_key("js", "theoretical");
    assert_eq!(key, "quiz-js-theoretical");
    assert_eq!(store.get(&key), None);
    store.set(&key, "4, 5, 6".into());
    assert_eq!(store.get(&key).as_deref(), Some("4, 5, 6"));
  }
}
