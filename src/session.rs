//! Session driver: turns incoming request parameters into the question list a
//! page should render, and issues public test links.
//!
//! Flow on `start`:
//!   1) `test` present -> decode -> resolve the token's ids in the token's domain
//!   2) otherwise      -> resolve the level and select from that tier
//! Every call starts from scratch; nothing is carried between calls.

use chrono::{DateTime, Utc};
use rand::{seq::SliceRandom, Rng};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::domain::{Question, QuestionId};
use crate::error::SessionError;
use crate::generator::{GeneratorRegistry, QuizGenerator};
use crate::levels::{parse_level, resolve_level};
use crate::prompt::{collect_expiration_minutes, collect_question_ids, join_ids, InputPrompt};
use crate::selection::{questions_at, resolve_ids, select_indexes, SelectionConfig, SelectionRequest};
use crate::store::{last_ids_key, KeyValueStore};
use crate::test_link::{decode, encode, encode_at, parse};

pub const DEFAULT_KIND: &str = "theoretical";

/// Raw query parameters, exactly as the page sends them.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RequestParams {
    pub domain: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub level: Option<String>,
    pub limit: Option<String>,
    pub shuffle: Option<String>,
    pub correct: Option<String>,
    pub add: Option<String>,
    pub index: Option<String>,
    pub test: Option<String>,
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "1")
}

impl RequestParams {
    pub fn is_authoring(&self) -> bool {
        self.add.as_deref().map(str::trim) == Some("true")
    }

    pub fn shows_ids(&self) -> bool {
        self.index.as_deref().map(str::trim) == Some("id")
    }

    /// Request flags layered over the generator defaults. Authoring always
    /// presents questions in pool order.
    pub fn selection_config(&self, defaults: SelectionConfig) -> SelectionConfig {
        let display_limit = self
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<usize>().ok())
            .filter(|l| *l > 0)
            .or(defaults.display_limit);
        let shuffle = self.shuffle.as_deref().map(is_truthy).unwrap_or(defaults.shuffle);
        let show_correct_answers = self.correct.as_deref().map(is_truthy).unwrap_or(false)
            || defaults.show_correct_answers;
        SelectionConfig {
            shuffle: shuffle && !self.is_authoring(),
            display_limit,
            show_correct_answers,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionMode {
    /// Fixed question set from a test link; no level selector.
    PublicTest {
        #[serde(rename = "expiresAt")]
        expires_at: DateTime<Utc>,
        #[serde(rename = "remainingSeconds")]
        remaining_seconds: i64,
    },
    /// Level based quiz; `tiers` feeds the level selector.
    Level { level: Option<u32>, tiers: Vec<u32> },
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub domain: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub mode: SessionMode,
    pub questions: Vec<Question>,
    pub config: SelectionConfig,
    pub authoring: bool,
    pub show_ids: bool,
    /// Id the next authored question gets (authoring mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<u64>,
}

/// Parameters the page should switch to after issuing a link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LinkParams {
    pub domain: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub test: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedLink {
    pub token: String,
    pub params: LinkParams,
    pub url: String,
    pub ids: Vec<QuestionId>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct SessionDriver {
    registry: GeneratorRegistry,
    default_domain: String,
    default_expire_minutes: u32,
    public_base_url: Url,
}

impl SessionDriver {
    pub fn new(
        registry: GeneratorRegistry,
        default_domain: impl Into<String>,
        default_expire_minutes: u32,
        public_base_url: Url,
    ) -> Self {
        Self {
            registry,
            default_domain: default_domain.into(),
            default_expire_minutes: default_expire_minutes.max(1),
            public_base_url,
        }
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    pub fn generator(&self, domain: Option<&str>) -> Result<std::sync::Arc<QuizGenerator>, SessionError> {
        self.registry.get(self.domain_or_default(domain))
    }

    fn domain_or_default<'a>(&'a self, domain: Option<&'a str>) -> &'a str {
        match domain.map(str::trim) {
            Some(d) if !d.is_empty() => d,
            _ => &self.default_domain,
        }
    }

    pub fn start(&self, params: &RequestParams, now: DateTime<Utc>) -> Result<SessionView, SessionError> {
        self.start_with_rng(params, now, &mut rand::thread_rng())
    }

    #[instrument(level = "info", skip(self, rng), fields(domain = ?params.domain, has_test = params.test.is_some()))]
    pub fn start_with_rng<R: Rng + ?Sized>(
        &self,
        params: &RequestParams,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<SessionView, SessionError> {
        let authoring = params.is_authoring();
        let show_ids = params.shows_ids();

        if let Some(token) = params.test.as_deref().filter(|t| !t.trim().is_empty()) {
            let decoded = decode(token, now).map_err(|e| {
                warn!(target: "test_link", error = %e, "Rejected test link");
                e
            })?;
            let generator = self.registry.get(&decoded.domain)?;
            let config = params.selection_config(generator.defaults);
            let request = SelectionRequest::explicit(decoded.ordered_ids.clone());
            let indexes = select_indexes(generator.pool(), &request, config)?;
            let mut questions = questions_at(generator.pool(), &indexes);
            if config.shuffle {
                questions.shuffle(rng);
            }
            info!(target: "quiz_runner", domain = %decoded.domain, kind = %decoded.kind, questions = questions.len(), "Public test session");
            return Ok(SessionView {
                domain: decoded.domain.clone(),
                kind: decoded.kind.clone(),
                title: generator.default_title.clone(),
                mode: SessionMode::PublicTest {
                    expires_at: decoded.expires_at(),
                    remaining_seconds: decoded.remaining(now).num_seconds(),
                },
                questions,
                config,
                authoring,
                show_ids,
                next_id: authoring.then(|| generator.pool().next_id()),
            });
        }

        let domain = self.domain_or_default(params.domain.as_deref()).to_string();
        let generator = self.registry.get(&domain)?;
        let config = params.selection_config(generator.defaults);
        let requested = parse_level(params.level.as_deref());
        let questions = generator.generate_questions(requested, config, rng);
        info!(target: "quiz_runner", %domain, level = ?requested, questions = questions.len(), "Level session");

        Ok(SessionView {
            domain,
            kind: params
                .kind
                .clone()
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_KIND.to_string()),
            title: generator.default_title.clone(),
            mode: SessionMode::Level {
                level: resolve_level(generator.pool(), requested),
                tiers: generator.tiers(),
            },
            questions,
            config,
            authoring,
            show_ids,
            next_id: authoring.then(|| generator.pool().next_id()),
        })
    }

    /// Issue a link for ids chosen by the caller, stamped with `now`. The ids
    /// must exist in the domain's pool so the link always resolves.
    #[instrument(level = "info", skip(self, ids), fields(ids = ids.len()))]
    pub fn issue_link(
        &self,
        domain: Option<&str>,
        kind: Option<&str>,
        ids: &[QuestionId],
        expires_after_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<IssuedLink, SessionError> {
        let (domain, kind) = self.link_target(domain, kind, ids)?;
        let token = encode_at(&domain, &kind, ids, expires_after_minutes, now)?;
        self.finish_link(domain, kind, ids, token)
    }

    /// Collect expiration and ids through `prompt`, remembering the id list per
    /// domain/type, then issue the link at the current time.
    pub fn issue_link_with_prompt(
        &self,
        domain: Option<&str>,
        kind: Option<&str>,
        prompt: &dyn InputPrompt,
        store: &dyn KeyValueStore,
    ) -> Result<IssuedLink, SessionError> {
        let resolved_domain = self.domain_or_default(domain).to_string();
        let resolved_kind = kind.map(str::trim).filter(|k| !k.is_empty()).unwrap_or(DEFAULT_KIND);
        let key = last_ids_key(&resolved_domain, resolved_kind);
        let remembered = store.get(&key).unwrap_or_default();

        let minutes = collect_expiration_minutes(prompt, self.default_expire_minutes);
        let ids = collect_question_ids(prompt, &remembered);
        store.set(&key, join_ids(&ids));

        let (domain, kind) = self.link_target(Some(&resolved_domain), Some(resolved_kind), &ids)?;
        let token = encode(&domain, &kind, &ids, minutes)?;
        self.finish_link(domain, kind, &ids, token)
    }

    fn link_target(
        &self,
        domain: Option<&str>,
        kind: Option<&str>,
        ids: &[QuestionId],
    ) -> Result<(String, String), SessionError> {
        let domain = self.domain_or_default(domain).to_string();
        let kind = kind
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(DEFAULT_KIND)
            .to_string();
        let generator = self.registry.get(&domain)?;
        resolve_ids(generator.pool(), ids)?;
        Ok((domain, kind))
    }

    /// Expiry is read back from the token, whose issue time has whole-second
    /// resolution.
    fn finish_link(
        &self,
        domain: String,
        kind: String,
        ids: &[QuestionId],
        token: String,
    ) -> Result<IssuedLink, SessionError> {
        let issued = parse(&token)?;
        let mut url = self.public_base_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("domain", &domain)
            .append_pair("type", &kind)
            .append_pair("test", &token);

        info!(target: "test_link", %domain, %kind, ids = %join_ids(ids), expires_after_minutes = issued.expires_after_minutes, "Issued test link");
        Ok(IssuedLink {
            params: LinkParams { domain, kind, test: token.clone() },
            token,
            url: url.to_string(),
            ids: ids.to_vec(),
            expires_at: issued.expires_at(),
        })
    }
}
