//! Response conversion helpers used by the gateway and by generated models.
//!
//! - [`decode`] / [`from_value`] turn response bodies into typed values,
//!   mapping failures to [`RequestError::Decode`]
//! - [`to_body`] / [`to_query`] encode request bodies and arguments
//! - [`null_as_default`] lets non-nullable fields accept an explicit `null`
//! - [`local_datetime`] normalizes timestamps to local time; the
//!   [`nullable_local_datetime`], [`local_datetime_vec`] and
//!   [`nullable_local_datetime_vec`] adapters apply it to the other date shapes
//! - [`unwrap_envelope`], [`envelope_u64`] and [`envelope_bool`] extract
//!   scalars from envelopes such as `{"count": 7}`

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{MappingError, RequestError};

/// Parses a response body. An empty body decodes as `null`.
///
/// ## Errors
///
/// Returns [`RequestError::Decode`] if the body is not valid JSON.
pub fn decode(body: &[u8]) -> Result<Value, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| RequestError::Decode {
        message: e.to_string(),
    })
}

/// Deserializes a parsed body into `T`.
///
/// ## Errors
///
/// Returns [`RequestError::Decode`] if the value does not match `T`.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, RequestError> {
    serde_json::from_value(value).map_err(|e| RequestError::Decode {
        message: e.to_string(),
    })
}

/// Serializes a request body.
///
/// ## Errors
///
/// Returns [`RequestError::Encode`] if serialization fails.
pub fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, RequestError> {
    serde_json::to_value(body).map_err(|e| RequestError::Encode(e.to_string()))
}

/// Encodes a path or query argument.
///
/// Strings are used as-is; every other value is sent as its JSON text, so a
/// filter object becomes `{"where":...}` and a date becomes its RFC 3339 form.
///
/// ## Errors
///
/// Returns [`RequestError::Encode`] if serialization fails.
pub fn to_query<T: Serialize + ?Sized>(value: &T) -> Result<String, RequestError> {
    match to_body(value)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// Deserializer for non-nullable fields: an explicit `null` yields `T::default()`.
///
/// Used as `#[serde(default, deserialize_with = "sdkgen_runtime::convert::null_as_default")]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde adapter for `DateTime<Local>` fields.
///
/// Accepts RFC 3339 strings with any offset, naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// strings (read as UTC) and integer epoch milliseconds; every form is
/// converted to local time. `null` yields the default timestamp.
/// Serializes as RFC 3339 with the local offset.
pub mod local_datetime {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// Serializes as RFC 3339.
    pub fn serialize<S: Serializer>(value: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    /// Deserializes any supported timestamp form into local time.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Local>, D::Error> {
        from_json(Value::deserialize(deserializer)?).map_err(D::Error::custom)
    }

    pub(crate) fn from_json(value: Value) -> Result<DateTime<Local>, String> {
        match value {
            Value::Null => Ok(DateTime::<Local>::default()),
            Value::String(raw) => parse(&raw),
            Value::Number(n) => n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .map(|utc| utc.with_timezone(&Local))
                .ok_or_else(|| format!("timestamp out of range: {n}")),
            other => Err(format!("expected a timestamp, got {other}")),
        }
    }

    pub(crate) fn list_from_json(value: Value) -> Result<Vec<DateTime<Local>>, String> {
        match value {
            Value::Array(items) => items.into_iter().map(from_json).collect(),
            other => Err(format!("expected a list of timestamps, got {other}")),
        }
    }

    /// Parses a timestamp string into local time.
    pub fn parse(raw: &str) -> Result<DateTime<Local>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Local));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Utc.from_utc_datetime(&naive).with_timezone(&Local))
            .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
    }
}

/// `Nullable<DateTime<Local>>` fields: `null` stays [`Nullable::Null`],
/// every other value is read like [`local_datetime`].
///
/// [`Nullable::Null`]: crate::Nullable::Null
pub mod nullable_local_datetime {
    use chrono::{DateTime, Local};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use crate::Nullable;

    /// Serializes a value as RFC 3339 and anything else as `null`.
    pub fn serialize<S: Serializer>(value: &Nullable<DateTime<Local>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Nullable::Value(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Nullable::Absent | Nullable::Null => serializer.serialize_none(),
        }
    }

    /// Deserializes a present key; a missing key is left to `#[serde(default)]`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Nullable<DateTime<Local>>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Nullable::Null),
            other => super::local_datetime::from_json(other)
                .map(Nullable::Value)
                .map_err(D::Error::custom),
        }
    }
}

/// `Vec<DateTime<Local>>` fields. `null` yields an empty list.
pub mod local_datetime_vec {
    use chrono::{DateTime, Local};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &[DateTime<Local>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(value.iter().map(|dt| dt.to_rfc3339()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<DateTime<Local>>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Vec::new()),
            other => super::local_datetime::list_from_json(other).map_err(D::Error::custom),
        }
    }
}

/// `Nullable<Vec<DateTime<Local>>>` fields.
pub mod nullable_local_datetime_vec {
    use chrono::{DateTime, Local};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use crate::Nullable;

    pub fn serialize<S: Serializer>(
        value: &Nullable<Vec<DateTime<Local>>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Nullable::Value(list) => serializer.collect_seq(list.iter().map(|dt| dt.to_rfc3339())),
            Nullable::Absent | Nullable::Null => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Nullable<Vec<DateTime<Local>>>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Nullable::Null),
            other => super::local_datetime::list_from_json(other)
                .map(Nullable::Value)
                .map_err(D::Error::custom),
        }
    }
}

/// Extracts the value stored under `key` in a response envelope.
///
/// Other keys in the envelope are ignored.
///
/// ## Errors
///
/// Returns [`MappingError::UnexpectedEnvelope`] if `envelope` is not an
/// object or has no `key` entry.
pub fn unwrap_envelope(envelope: Value, key: &str, operation: &str) -> Result<Value, MappingError> {
    match envelope {
        Value::Object(mut map) => match map.remove(key) {
            Some(value) => Ok(value),
            None => Err(unexpected_envelope(&Value::Object(map), key, operation)),
        },
        other => Err(unexpected_envelope(&other, key, operation)),
    }
}

fn unexpected_envelope(found: &Value, key: &str, operation: &str) -> MappingError {
    MappingError::UnexpectedEnvelope {
        operation: operation.to_string(),
        expected: key.to_string(),
        found: found.to_string(),
    }
}

/// Unwraps an integer scalar from `{ key: n }`.
///
/// ## Errors
///
/// Returns a [`MappingError`] if the envelope or scalar has the wrong shape.
pub fn envelope_u64(envelope: Value, key: &str, operation: &str) -> Result<u64, MappingError> {
    let value = unwrap_envelope(envelope, key, operation)?;
    value.as_u64().ok_or_else(|| MappingError::UnexpectedScalar {
        operation: operation.to_string(),
        expected: "integer",
        found: value.to_string(),
    })
}

/// Unwraps a boolean scalar from `{ key: b }`.
///
/// ## Errors
///
/// Returns a [`MappingError`] if the envelope or scalar has the wrong shape.
pub fn envelope_bool(envelope: Value, key: &str, operation: &str) -> Result<bool, MappingError> {
    let value = unwrap_envelope(envelope, key, operation)?;
    value.as_bool().ok_or_else(|| MappingError::UnexpectedScalar {
        operation: operation.to_string(),
        expected: "boolean",
        found: value.to_string(),
    })
}
