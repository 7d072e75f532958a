//! Loading runner configuration (defaults + generators) from TOML.
//!
//! See `RunnerConfig` and `GeneratorCfg` for expected schema.

use reqwest::Url;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::Question;
use crate::generator::QuizGenerator;
use crate::pool::{load_questions_file, Pool};
use crate::prompt::DEFAULT_EXPIRE_MINUTES;
use crate::selection::SelectionConfig;

const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

#[derive(Clone, Debug, Deserialize)]
pub struct RunnerConfig {
  #[serde(default = "default_domain")]
  pub default_domain: String,
  #[serde(default = "default_expire_minutes")]
  pub default_expire_minutes: u32,
  #[serde(default = "default_base_url")]
  pub public_base_url: String,
  #[serde(default)]
  pub generators: Vec<GeneratorCfg>,
}

fn default_domain() -> String { "js".into() }
fn default_expire_minutes() -> u32 { DEFAULT_EXPIRE_MINUTES }
fn default_base_url() -> String { DEFAULT_BASE_URL.into() }

impl Default for RunnerConfig {
  fn default() -> Self {
    Self {
      default_domain: default_domain(),
      default_expire_minutes: default_expire_minutes(),
      public_base_url: default_base_url(),
      generators: Vec::new(),
    }
  }
}

/// Generator entry accepted in TOML configuration.
/// Questions come either inline or from `questions_path` (a JSON array).
#[derive(Clone, Debug, Deserialize)]
pub struct GeneratorCfg {
  pub domain: String,
  #[serde(default)] pub title: Option<String>,
  #[serde(default)] pub answers_url: Option<String>,
  #[serde(default)] pub questions_path: Option<String>,
  #[serde(default)] pub questions: Vec<Question>,
  #[serde(default)] pub shuffle: bool,
  #[serde(default)] pub display_limit: Option<usize>,
}

impl RunnerConfig {
  /// Base URL for issued links; an unparsable value falls back to the default.
  pub fn base_url(&self) -> Option<Url> {
    Url::parse(&self.public_base_url)
      .or_else(|e| {
        error!(target: "quiz_runner", url = %self.public_base_url, error = %e, "Invalid public_base_url; using default");
        Url::parse(DEFAULT_BASE_URL)
      })
      .ok()
  }

  /// Build generators from config. Entries whose pool cannot be loaded are
  /// skipped with an error log.
  pub async fn load_generators(&self) -> Vec<QuizGenerator> {
    let mut out = Vec::with_capacity(self.generators.len());
    for cfg in &self.generators {
      let mut questions = cfg.questions.clone();
      if let Some(path) = &cfg.questions_path {
        match load_questions_file(path).await {
          Ok(loaded) => questions.extend(loaded),
          Err(e) => {
            error!(target: "quiz_runner", domain = %cfg.domain, error = %e, "Skipping generator: questions file unavailable");
            continue;
          }
        }
      }
      if questions.is_empty() {
        warn!(target: "quiz_runner", domain = %cfg.domain, "Generator has no questions");
      }
      let pool = match Pool::new(questions) {
        Ok(p) => p,
        Err(e) => {
          error!(target: "quiz_runner", domain = %cfg.domain, error = %e, "Skipping generator: invalid pool");
          continue;
        }
      };
      let title = cfg.title.clone().unwrap_or_else(|| format!("{} quiz", cfg.domain));
      out.push(
        QuizGenerator::new(cfg.domain.clone(), title, pool)
          .with_answers_url(cfg.answers_url.clone())
          .with_defaults(SelectionConfig {
            shuffle: cfg.shuffle,
            display_limit: cfg.display_limit,
            show_correct_answers: false,
          }),
      );
    }
    out
  }
}

pub fn parse_config(raw: &str) -> Result<RunnerConfig, toml::de::Error> {
  toml::from_str::<RunnerConfig>(raw)
}

/// Attempt to load `RunnerConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_runner_config_from_env() -> Option<RunnerConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "quiz_runner", %path, generators = cfg.generators.len(), "Loaded runner config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quiz_runner", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quiz_runner", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
