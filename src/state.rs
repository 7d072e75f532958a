//! Application state: generator registry (inside the session driver), the
//! remembered-input store and the HTTP client for answer keys.
//!
//! Generators come from the built-in seeds, overridden per domain by the
//! TOML configuration. The registry is validated once here; after that it is
//! read-only and shared without locks.

use std::{collections::HashSet, sync::Arc};

use tracing::{info, instrument};

use crate::config::{load_runner_config_from_env, RunnerConfig};
use crate::error::StartupError;
use crate::generator::{GeneratorRegistry, QuizGenerator};
use crate::seeds::seed_generators;
use crate::session::SessionDriver;
use crate::store::{KeyValueStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub driver: SessionDriver,
    pub store: Arc<dyn KeyValueStore>,
    pub http: reqwest::Client,
}

impl AppState {
    /// Build state from env: load config, load configured pools, merge with seeds.
    #[instrument(level = "info", skip_all)]
    pub async fn from_env() -> Result<Self, StartupError> {
        let cfg = load_runner_config_from_env().unwrap_or_default();
        let configured = cfg.load_generators().await;
        Self::build(&cfg, configured)
    }

    /// Seeds first, then configured generators, so configuration wins per domain.
    /// Two configured generators for one domain fail startup.
    pub fn build(cfg: &RunnerConfig, configured: Vec<QuizGenerator>) -> Result<Self, StartupError> {
        let mut seen = HashSet::new();
        if let Some(dup) = configured.iter().find(|g| !seen.insert(g.domain.as_str())) {
            return Err(StartupError::DuplicateDomain(dup.domain.clone()));
        }
        let registry = GeneratorRegistry::from_generators(seed_generators().into_iter().chain(configured));
        if registry.is_empty() {
            return Err(StartupError::NoGenerators);
        }
        if !registry.contains(&cfg.default_domain) {
            return Err(StartupError::UnknownDefaultDomain(cfg.default_domain.clone()));
        }
        let base_url = cfg.base_url().ok_or(StartupError::InvalidBaseUrl)?;
        info!(target: "quiz_runner", default_domain = %cfg.default_domain, %base_url, "Session driver ready");

        Ok(Self {
            driver: SessionDriver::new(registry, cfg.default_domain.clone(), cfg.default_expire_minutes, base_url),
            store: Arc::new(MemoryStore::default()),
            http: reqwest::Client::new(),
        })
    }
}
