//! Input collection for issuing links. The caller supplies the prompt (a UI
//! dialog, a request body, a test double); parsing of the answers lives here.

use crate::domain::QuestionId;

pub const DEFAULT_EXPIRE_MINUTES: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
  /// "Expire after (minutes)"
  ExpireMinutes,
  /// "Enter questions IDS (comma separated)"
  QuestionIds,
}

pub trait InputPrompt {
  /// `None` means the user dismissed the prompt.
  fn ask(&self, kind: PromptKind, default: &str) -> Option<String>;
}

/// Expiration in minutes; anything that is not a positive integer falls back
/// to `fallback`. Integers past `u32::MAX` saturate to it.
pub fn collect_expiration_minutes(prompt: &dyn InputPrompt, fallback: u32) -> u32 {
  let fallback = fallback.max(1);
  prompt
    .ask(PromptKind::ExpireMinutes, &fallback.to_string())
    .and_then(|raw| parse_minutes(&raw))
    .filter(|m| *m > 0)
    .unwrap_or(fallback)
}

fn parse_minutes(raw: &str) -> Option<u32> {
  let digits = raw.trim();
  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  // All digits, so the only parse failure left is overflow.
  Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}

/// Comma separated ids; a dismissed prompt yields the default list.
pub fn collect_question_ids(prompt: &dyn InputPrompt, default: &str) -> Vec<QuestionId> {
  let answer = prompt.ask(PromptKind::QuestionIds, default).unwrap_or_else(|| default.to_string());
  split_ids(&answer)
}

pub fn split_ids(raw: &str) -> Vec<QuestionId> {
  raw.split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(QuestionId::new)
    .collect()
}

pub fn join_ids(ids: &[QuestionId]) -> String {
  ids.iter().map(QuestionId::as_str).collect::<Vec<_>>().join(", ")
}

/// Prompt answered from values known up front (e.g. a request body).
#[derive(Clone, Debug, Default)]
pub struct PresetAnswers {
  pub expire_minutes: Option<String>,
  pub ids: Option<String>,
}

impl InputPrompt for PresetAnswers {
  fn ask(&self, kind: PromptKind, default: &str) -> Option<String> {
    let answer = match kind {
      PromptKind::ExpireMinutes => self.expire_minutes.clone(),
      PromptKind::QuestionIds => self.ids.clone(),
    };
    Some(answer.unwrap_or_else(|| default.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Dismissed;
  impl InputPrompt for Dismissed {
    fn ask(&self, _kind: PromptKind, _default: &str) -> Option<String> { None }
  }

  #[test]
  fn expiration_falls_back_on_junk() {
    let p = |m: &str| PresetAnswers { expire_minutes: Some(m.into()), ids: None };
    assert_eq!(collect_expiration_minutes(&p(" 12 "), 5), 12);
    assert_eq!(collect_expiration_minutes(&p("soon"), 5), 5);
    assert_eq!(collect_expiration_minutes(&p("0"), 5), 5);
    assert_eq!(collect_expiration_minutes(&Dismissed, 7), 7);
  }

  #[test]
  fn oversized_expiration_saturates() {
    let p = |m: &str| PresetAnswers { expire_minutes: Some(m.into()), ids: None };
    assert_eq!(collect_expiration_minutes(&p("4294967296"), 5), u32::MAX);
    assert_eq!(collect_expiration_minutes(&p("99999999999999999999999"), 5), u32::MAX);
    assert_eq!(collect_expiration_minutes(&p("-3"), 5), 5);
  }

  #[test]
  fn ids_split_on_commas_with_whitespace() {
    let p = PresetAnswers { expire_minutes: None, ids: Some(" 4 ,5,  6,, ".into()) };
    let ids = collect_question_ids(&p, "");
    assert_eq!(join_ids(&ids), "4, 5, 6");
  }

  #[test]
  fn dismissed_id_prompt_uses_default() {
    let ids = collect_question_ids(&Dismissed, "1, 2");
    assert_eq!(ids, vec![QuestionId::from("1"), QuestionId::from("2")]);
  }
}
