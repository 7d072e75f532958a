//! Error taxonomy for pools, selection, test links, sessions and the answer key.
//!
//! Empty selections are not errors: a level that matches nothing yields an
//! empty list and the caller decides how to present it.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::QuestionId;

/// Problems found while loading a pool.
#[derive(Debug, Error)]
pub enum PoolError {
  #[error("duplicate question id {0} in pool")]
  DuplicateId(QuestionId),
  #[error("question id {id} follows {previous}; ids must not decrease")]
  IdOutOfOrder { previous: QuestionId, id: QuestionId },
  #[error("failed to read questions file {path}: {source}")]
  Read { path: String, source: std::io::Error },
  #[error("failed to parse questions file {path}: {source}")]
  Parse { path: String, source: serde_json::Error },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
  #[error("unknown question id: {0}")]
  UnknownQuestionId(QuestionId),
}

/// Why a token could not be issued.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
  #[error("a test link needs at least one question id")]
  NoQuestions,
  #[error("expiration must be at least one minute")]
  ZeroExpiration,
  #[error("invalid question id {0:?} for a test link")]
  InvalidId(String),
  #[error("invalid {field} {value:?} for a test link")]
  InvalidField { field: &'static str, value: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
  #[error("malformed test link: {0}")]
  Malformed(String),
  #[error("test link expired at {expired_at}")]
  Expired { expired_at: DateTime<Utc> },
}

#[derive(Debug, Error)]
pub enum AnswerKeyError {
  #[error("generator {0} has no answer key url")]
  NoUrl(String),
  #[error("answer key request failed: {0}")]
  Request(#[from] reqwest::Error),
  #[error("answer key is not a JSON object")]
  NotAnObject,
}

/// Everything a session can fail with, surfaced to the caller as a tagged result.
#[derive(Debug, Error)]
pub enum SessionError {
  #[error("unknown domain: {0}")]
  UnknownDomain(String),
  #[error(transparent)]
  Decode(#[from] DecodeError),
  #[error(transparent)]
  Encode(#[from] EncodeError),
  #[error(transparent)]
  Selection(#[from] SelectionError),
  #[error(transparent)]
  AnswerKey(#[from] AnswerKeyError),
  #[error(transparent)]
  Pool(#[from] PoolError),
}

/// Startup validation of the generator registry.
#[derive(Debug, Error)]
pub enum StartupError {
  #[error("no generators configured")]
  NoGenerators,
  #[error("domain {0} is configured more than once")]
  DuplicateDomain(String),
  #[error("default domain {0} has no generator")]
  UnknownDefaultDomain(String),
  #[error("public base url is invalid")]
  InvalidBaseUrl,
}
