//! Access tokens issued by the backend's authentication call.

use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MappingError;

/// Whether a gateway currently holds a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No token is held; requests go out without an `Authorization` header.
    NoToken,
    /// A token is held and attached to every request.
    Authenticated,
}

/// An opaque access token plus its optional expiry facts.
///
/// The `id` is sent verbatim as the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Token identifier.
    pub id: String,
    /// Time to live in seconds, if the backend reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    /// Issue time, normalized to local time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Local>>,
    /// Identifier of the authenticated user.
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AccessToken {
    /// Creates a token with no expiry information.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ttl: None,
            created: None,
            user_id: None,
        }
    }

    /// The instant the token stops being valid, when both `created` and `ttl` are known.
    pub fn expires_at(&self) -> Option<DateTime<Local>> {
        let created = self.created?;
        let ttl = i64::try_from(self.ttl?).ok()?;
        created.checked_add_signed(TimeDelta::try_seconds(ttl)?)
    }

    /// Returns `true` if the token is known to have expired at `now`.
    ///
    /// Tokens without expiry facts never report as expired.
    pub fn is_expired(&self, now: DateTime<Local>) -> bool {
        self.expires_at().is_some_and(|at| now >= at)
    }
}

impl TryFrom<Value> for AccessToken {
    type Error = MappingError;

    /// Converts a login response envelope into a token.
    ///
    /// The envelope must be an object with a non-empty string `id`. `ttl` must
    /// be a non-negative integer when present, `created` an RFC 3339 timestamp,
    /// and `userId` a string or number.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(MappingError::InvalidToken(format!(
                "expected an object, got {value}"
            )));
        };

        let id = match map.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(other) => {
                return Err(MappingError::InvalidToken(format!(
                    "'id' must be a non-empty string, got {other}"
                )));
            }
            None => return Err(MappingError::InvalidToken("missing 'id'".to_string())),
        };

        let ttl = match map.get("ttl") {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_u64().ok_or_else(|| {
                MappingError::InvalidToken(format!("'ttl' must be a non-negative integer, got {v}"))
            })?),
        };

        let created = match map.get("created") {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| MappingError::InvalidToken(format!("'created': {e}")))?
                    .with_timezone(&Local),
            ),
            Some(other) => {
                return Err(MappingError::InvalidToken(format!(
                    "'created' must be a timestamp string, got {other}"
                )));
            }
        };

        let user_id = match map.get("userId") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(other) => {
                return Err(MappingError::InvalidToken(format!(
                    "'userId' must be a string or number, got {other}"
                )));
            }
        };

        Ok(Self {
            id,
            ttl,
            created,
            user_id,
        })
    }
}
