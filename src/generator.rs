//! Generators (one per domain) and the registry the session looks them up in.

use std::{collections::HashMap, sync::Arc};

use rand::Rng;
use tracing::{info, warn};

use crate::domain::Question;
use crate::error::SessionError;
use crate::levels::tiers;
use crate::pool::Pool;
use crate::selection::{questions_at, select_indexes_with_rng, SelectionConfig, SelectionRequest};

/// Pool provider for one domain.
#[derive(Clone, Debug)]
pub struct QuizGenerator {
    pub domain: String,
    pub default_title: String,
    pub answers_url: Option<String>,
    /// Flags used when the request does not override them.
    pub defaults: SelectionConfig,
    pool: Pool,
}

impl QuizGenerator {
    pub fn new(domain: impl Into<String>, default_title: impl Into<String>, pool: Pool) -> Self {
        Self {
            domain: domain.into(),
            default_title: default_title.into(),
            answers_url: None,
            defaults: SelectionConfig::default(),
            pool,
        }
    }

    pub fn with_answers_url(mut self, url: Option<String>) -> Self {
        self.answers_url = url;
        self
    }

    pub fn with_defaults(mut self, defaults: SelectionConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn tiers(&self) -> Vec<u32> {
        tiers(&self.pool)
    }

    /// Fresh level-based selection; every call starts from scratch.
    pub fn generate_questions<R: Rng + ?Sized>(
        &self,
        level: Option<u32>,
        config: SelectionConfig,
        rng: &mut R,
    ) -> Vec<Question> {
        let request = SelectionRequest::by_level(level);
        // Level mode never fails; only explicit ids can be unknown.
        let indexes = select_indexes_with_rng(&self.pool, &request, config, rng).unwrap_or_default();
        questions_at(&self.pool, &indexes)
    }
}

/// domain -> generator, built once at startup.
#[derive(Clone, Debug, Default)]
pub struct GeneratorRegistry {
    by_domain: HashMap<String, Arc<QuizGenerator>>,
}

impl GeneratorRegistry {
    /// Later entries replace earlier ones with the same domain, so configured
    /// generators override seeds.
    pub fn from_generators(generators: impl IntoIterator<Item = QuizGenerator>) -> Self {
        let mut by_domain = HashMap::new();
        for g in generators {
            let domain = g.domain.clone();
            if by_domain.insert(domain.clone(), Arc::new(g)).is_some() {
                warn!(target: "quiz_runner", %domain, "Generator replaced by a later definition");
            }
        }
        for g in by_domain.values() {
            info!(target: "quiz_runner", domain = %g.domain, questions = g.pool().len(), tiers = ?g.tiers(), "Generator ready");
        }
        Self { by_domain }
    }

    pub fn get(&self, domain: &str) -> Result<Arc<QuizGenerator>, SessionError> {
        self.by_domain
            .get(domain)
            .cloned()
            .ok_or_else(|| SessionError::UnknownDomain(domain.to_string()))
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.by_domain.contains_key(domain)
    }

    pub fn is_empty(&self) -> bool {
        self.by_domain.is_empty()
    }

    /// Generators sorted by domain.
    pub fn generators(&self) -> Vec<Arc<QuizGenerator>> {
        let mut all: Vec<_> = self.by_domain.values().cloned().collect();
        all.sort_by(|a, b| a.domain.cmp(&b.domain));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::{seed_generators, tiered_pool};

    #[test]
    fn unknown_domain_fails_fast() {
        let reg = GeneratorRegistry::from_generators(seed_generators());
        assert!(reg.get("js").is_ok());
        assert!(matches!(reg.get("chemistry"), Err(SessionError::UnknownDomain(d)) if d == "chemistry"));
    }

    #[test]
    fn later_generator_overrides_earlier() {
        let custom = QuizGenerator::new("js", "Custom JS", Pool::default());
        let reg = GeneratorRegistry::from_generators(seed_generators().into_iter().chain([custom]));
        assert_eq!(reg.get("js").map(|g| g.default_title.clone()).ok().as_deref(), Some("Custom JS"));
        assert_eq!(reg.generators().len(), 4);
    }

    #[test]
    fn generate_questions_restarts_each_time() {
        let g = QuizGenerator::new("js", "JS", tiered_pool());
        let mut rng = rand::thread_rng();
        let first = g.generate_questions(Some(3), SelectionConfig::default(), &mut rng);
        let again = g.generate_questions(Some(3), SelectionConfig::default(), &mut rng);
        assert_eq!(first, again);
        assert_eq!(first.len(), 3);
    }
}
