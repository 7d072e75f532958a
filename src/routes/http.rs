//! HTTP endpoint handlers. These are thin wrappers that forward to the session
//! driver. Each handler is instrumented; failures become `{error, message}`.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::authoring::export_for;
use crate::error::{DecodeError, SessionError};
use crate::protocol::*;
use crate::session::RequestParams;
use crate::state::AppState;
use crate::test_link::parse;

impl IntoResponse for SessionError {
  fn into_response(self) -> Response {
    let (status, code) = match &self {
      SessionError::UnknownDomain(_) => (StatusCode::NOT_FOUND, "unknown_domain"),
      SessionError::Decode(DecodeError::Malformed(_)) => (StatusCode::BAD_REQUEST, "malformed_token"),
      SessionError::Decode(DecodeError::Expired { .. }) => (StatusCode::GONE, "expired_token"),
      SessionError::Selection(_) => (StatusCode::UNPROCESSABLE_ENTITY, "unknown_question_id"),
      SessionError::Encode(_) => (StatusCode::BAD_REQUEST, "invalid_link"),
      SessionError::Pool(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_questions"),
      SessionError::AnswerKey(_) => (StatusCode::BAD_GATEWAY, "answer_key"),
    };
    warn!(target: "quiz_runner", error = %self, %code, "Request failed");
    (status, Json(ErrorOut { error: code, message: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_domains(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let domains: Vec<DomainOut> = state.driver.registry().generators().iter().map(|g| DomainOut::from(g.as_ref())).collect();
  Json(domains)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  Query(params): Query<RequestParams>,
) -> Result<impl IntoResponse, SessionError> {
  let view = state.driver.start(&params, Utc::now())?;
  info!(target: "quiz_runner", domain = %view.domain, questions = view.questions.len(), "HTTP quiz served");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state, body), fields(domain = ?body.domain))]
pub async fn http_post_test_link(
  State(state): State<Arc<AppState>>,
  Json(body): Json<IssueLinkIn>,
) -> Result<impl IntoResponse, SessionError> {
  let answers = body.answers();
  let link = state.driver.issue_link_with_prompt(
    body.domain.as_deref(),
    body.kind.as_deref(),
    &answers,
    state.store.as_ref(),
  )?;
  Ok((StatusCode::CREATED, Json(link)))
}

#[instrument(level = "info", skip(token), fields(token_len = token.len()))]
pub async fn http_get_test_link(Path(token): Path<String>) -> Result<impl IntoResponse, SessionError> {
  let parsed = parse(&token)?;
  Ok(Json(TokenInfoOut::new(parsed, Utc::now())))
}

#[instrument(level = "info", skip(state, body), fields(domain = ?body.domain, authored = body.questions.len()))]
pub async fn http_post_authoring_export(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AuthoringExportIn>,
) -> Result<impl IntoResponse, SessionError> {
  let generator = state.driver.generator(body.domain.as_deref())?;
  let export = export_for(&state.http, &generator, body.questions, &body.answers).await?;
  Ok(Json(export))
}
