//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authoring::CollectedAnswers;
use crate::domain::{Question, QuestionId};
use crate::generator::QuizGenerator;
use crate::prompt::{join_ids, PresetAnswers};
use crate::test_link::TestToken;

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainOut {
    pub domain: String,
    pub title: String,
    pub tiers: Vec<u32>,
    pub questions: usize,
    pub next_id: u64,
    pub has_answer_key: bool,
}

impl From<&QuizGenerator> for DomainOut {
    fn from(g: &QuizGenerator) -> Self {
        Self {
            domain: g.domain.clone(),
            title: g.default_title.clone(),
            tiers: g.tiers(),
            questions: g.pool().len(),
            next_id: g.pool().next_id(),
            has_answer_key: g.answers_url.is_some(),
        }
    }
}

/// Ids as typed into the prompt ("4, 5, 6") or as a JSON list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IdsIn {
    List(Vec<QuestionId>),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MinutesIn {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLinkIn {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub ids: Option<IdsIn>,
    #[serde(default)]
    pub expire_minutes: Option<MinutesIn>,
}

impl IssueLinkIn {
    /// The body answers the issue-link prompts; missing fields take the defaults.
    pub fn answers(&self) -> PresetAnswers {
        PresetAnswers {
            expire_minutes: self.expire_minutes.as_ref().map(|m| match m {
                MinutesIn::Number(n) => n.to_string(),
                MinutesIn::Text(s) => s.clone(),
            }),
            ids: self.ids.as_ref().map(|ids| match ids {
                IdsIn::List(list) => join_ids(list),
                IdsIn::Text(s) => s.clone(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfoOut {
    pub token: TestToken,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
    pub remaining_seconds: i64,
}

impl TokenInfoOut {
    pub fn new(token: TestToken, now: DateTime<Utc>) -> Self {
        Self {
            expires_at: token.expires_at(),
            expired: token.is_expired_at(now),
            remaining_seconds: token.remaining(now).num_seconds(),
            token,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthoringExportIn {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub answers: CollectedAnswers,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{collect_expiration_minutes, InputPrompt, PromptKind};

    #[test]
    fn issue_body_accepts_lists_and_text() {
        let body: IssueLinkIn = serde_json::from_str(r#"{"ids": [4, "5"], "expireMinutes": 10}"#).unwrap();
        let answers = body.answers();
        assert_eq!(answers.ask(PromptKind::QuestionIds, "").as_deref(), Some("4, 5"));
        assert_eq!(answers.ask(PromptKind::ExpireMinutes, "5").as_deref(), Some("10"));

        let body: IssueLinkIn = serde_json::from_str(r#"{"type": "practice", "ids": "7, 3"}"#).unwrap();
        assert_eq!(body.kind.as_deref(), Some("practice"));
        assert_eq!(body.answers().ask(PromptKind::QuestionIds, "").as_deref(), Some("7, 3"));
        assert_eq!(body.answers().ask(PromptKind::ExpireMinutes, "5").as_deref(), Some("5"));
    }

    #[test]
    fn oversized_minutes_keep_the_longest_window() {
        let body: IssueLinkIn = serde_json::from_str(r#"{"ids": "1", "expireMinutes": 10000000000}"#).unwrap();
        assert_eq!(collect_expiration_minutes(&body.answers(), 5), u32::MAX);
    }
}
