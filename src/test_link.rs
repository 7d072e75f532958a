//! Public test links: a self-contained token carrying domain, type, the ordered
//! question ids, issue time and expiration window.
//!
//! Wire format (before base64url, no padding):
//!   v1|<domain>|<type>|<id>,<id>,...|<issued unix seconds>|<minutes>
//!
//! Tokens carry no checksum. Decoding only checks structure and the clock;
//! resolving ids against a pool happens later, in the session.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::domain::QuestionId;
use crate::error::{DecodeError, EncodeError};

const VERSION: &str = "v1";
const FIELD_SEP: char = '|';
const ID_SEP: char = ',';
const FIELD_COUNT: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestToken {
  pub domain: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub ordered_ids: Vec<QuestionId>,
  pub issued_at: DateTime<Utc>,
  pub expires_after_minutes: u32,
}

impl TestToken {
  /// Last instant at which the token is still accepted.
  pub fn expires_at(&self) -> DateTime<Utc> {
    self.issued_at + Duration::minutes(i64::from(self.expires_after_minutes))
  }

  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    now > self.expires_at()
  }

  /// Time left before expiry; zero once expired.
  pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
    (self.expires_at() - now).max(Duration::zero())
  }
}

/// Issue a token stamped with the current time.
pub fn encode(domain: &str, kind: &str, ids: &[QuestionId], expires_after_minutes: u32) -> Result<String, EncodeError> {
  encode_at(domain, kind, ids, expires_after_minutes, Utc::now())
}

pub fn encode_at(
  domain: &str,
  kind: &str,
  ids: &[QuestionId],
  expires_after_minutes: u32,
  issued_at: DateTime<Utc>,
) -> Result<String, EncodeError> {
  if ids.is_empty() {
    return Err(EncodeError::NoQuestions);
  }
  if expires_after_minutes == 0 {
    return Err(EncodeError::ZeroExpiration);
  }
  check_field("domain", domain)?;
  check_field("type", kind)?;
  for id in ids {
    if !is_valid_id(id.as_str()) {
      return Err(EncodeError::InvalidId(id.to_string()));
    }
  }

  let joined = ids.iter().map(QuestionId::as_str).collect::<Vec<_>>().join(",");
  let payload = format!(
    "{VERSION}{s}{domain}{s}{kind}{s}{joined}{s}{issued}{s}{expires_after_minutes}",
    s = FIELD_SEP,
    issued = issued_at.timestamp(),
  );
  debug!(target: "test_link", %domain, %kind, ids = ids.len(), expires_after_minutes, "Encoded test link");
  Ok(URL_SAFE_NO_PAD.encode(payload.as_bytes()))
}

/// Parse and check expiration against `now`. Pure: the same token and clock
/// always give the same answer.
pub fn decode(token: &str, now: DateTime<Utc>) -> Result<TestToken, DecodeError> {
  let parsed = parse(token)?;
  if parsed.is_expired_at(now) {
    debug!(target: "test_link", domain = %parsed.domain, expired_at = %parsed.expires_at(), %now, "Expired test link");
    return Err(DecodeError::Expired { expired_at: parsed.expires_at() });
  }
  Ok(parsed)
}

/// Structure-only parse, without looking at the clock.
pub fn parse(token: &str) -> Result<TestToken, DecodeError> {
  let trimmed = token.trim().trim_end_matches('=');
  if trimmed.is_empty() {
    return Err(malformed("empty token"));
  }
  let bytes = URL_SAFE_NO_PAD
    .decode(trimmed)
    .map_err(|e| malformed(format!("not base64url: {e}")))?;
  let payload = String::from_utf8(bytes).map_err(|_| malformed("payload is not UTF-8"))?;

  let fields: Vec<&str> = payload.split(FIELD_SEP).collect();
  if fields.len() != FIELD_COUNT {
    return Err(malformed(format!("expected {FIELD_COUNT} fields, got {}", fields.len())));
  }
  if fields[0] != VERSION {
    return Err(malformed(format!("unsupported version {:?}", fields[0])));
  }

  let domain = fields[1];
  let kind = fields[2];
  if domain.is_empty() || kind.is_empty() {
    return Err(malformed("empty domain or type"));
  }

  let ordered_ids = fields[3]
    .split(ID_SEP)
    .map(|raw| {
      if is_valid_id(raw) { Ok(QuestionId::new(raw)) } else { Err(malformed(format!("invalid id {raw:?}"))) }
    })
    .collect::<Result<Vec<_>, _>>()?;

  let issued_secs: i64 = fields[4].parse().map_err(|_| malformed("issued time is not a number"))?;
  let issued_at = DateTime::from_timestamp(issued_secs, 0).ok_or_else(|| malformed("issued time out of range"))?;

  let expires_after_minutes: u32 = fields[5].parse().map_err(|_| malformed("expiration is not a number"))?;
  if expires_after_minutes == 0 {
    return Err(malformed("expiration must be positive"));
  }
  if issued_at
    .checked_add_signed(Duration::minutes(i64::from(expires_after_minutes)))
    .is_none()
  {
    return Err(malformed("expiration out of range"));
  }

  Ok(TestToken {
    domain: domain.to_string(),
    kind: kind.to_string(),
    ordered_ids,
    issued_at,
    expires_after_minutes,
  })
}

fn malformed(reason: impl Into<String>) -> DecodeError {
  DecodeError::Malformed(reason.into())
}

fn is_valid_id(raw: &str) -> bool {
  !raw.is_empty() && !raw.contains(|c: char| c == ID_SEP || c == FIELD_SEP || c.is_whitespace())
}

fn check_field(field: &'static str, value: &str) -> Result<(), EncodeError> {
  if value.is_empty() || value.contains(FIELD_SEP) {
    return Err(EncodeError::InvalidField { field, value: value.to_string() });
  }
  Ok(())
}
