//! Tri-state field values that keep "absent" and "null" apart.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A nullable model field.
///
/// JSON distinguishes a key that is missing from a key set to `null`;
/// `Option<T>` collapses the two. Generated models declare nullable fields as
/// `Nullable<T>` with `#[serde(default, skip_serializing_if = "Nullable::is_absent")]`
/// so both states survive a round trip.
///
/// ## Examples
///
/// ```
/// use sdkgen_runtime::Nullable;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Default)]
/// struct Customer {
///     #[serde(default, skip_serializing_if = "Nullable::is_absent")]
///     age: Nullable<i64>,
/// }
///
/// let absent: Customer = serde_json::from_str("{}").unwrap();
/// let null: Customer = serde_json::from_str(r#"{"age":null}"#).unwrap();
/// assert!(absent.age.is_absent());
/// assert!(null.age.is_null());
/// assert_eq!(serde_json::to_string(&absent).unwrap(), "{}");
/// assert_eq!(serde_json::to_string(&null).unwrap(), r#"{"age":null}"#);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullable<T> {
    /// The key is not present on the wire.
    Absent,
    /// The key is present with an explicit `null`.
    Null,
    /// The key carries a value.
    Value(T),
}

impl<T> Nullable<T> {
    /// Returns `true` if the field was omitted.
    pub fn is_absent(&self) -> bool {
        matches!(self, Nullable::Absent)
    }

    /// Returns `true` if the field was an explicit `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    /// Returns the value, if any.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Nullable::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Converts into an `Option`, folding absent and null together.
    pub fn into_option(self) -> Option<T> {
        match self {
            Nullable::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Nullable::Absent
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Nullable::Value(v),
            None => Nullable::Null,
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullable::Value(v) => serializer.serialize_some(v),
            // Absent fields are skipped by the containing struct.
            Nullable::Absent | Nullable::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only reached when the key is present; missing keys use `Default`.
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(default, skip_serializing_if = "Nullable::is_absent")]
        value: Nullable<String>,
    }

    #[test]
    fn three_states_round_trip() {
        for raw in [r#"{}"#, r#"{"value":null}"#, r#"{"value":"x"}"#] {
            let sample: Sample = serde_json::from_str(raw).unwrap();
            assert_eq!(serde_json::to_string(&sample).unwrap(), raw);
        }
    }

    #[test]
    fn value_state_exposes_value() {
        let sample: Sample = serde_json::from_str(r#"{"value":"x"}"#).unwrap();
        assert_eq!(sample.value.as_value().map(String::as_str), Some("x"));
        assert_eq!(sample.value.into_option(), Some("x".to_string()));
    }

    #[test]
    fn conversions() {
        assert_eq!(Nullable::from(Some(3)), Nullable::Value(3));
        assert_eq!(Nullable::<i32>::from(None), Nullable::Null);
        assert_eq!(Nullable::<i32>::default(), Nullable::Absent);
    }
}
