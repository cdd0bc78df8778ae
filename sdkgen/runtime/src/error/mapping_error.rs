//! Response-shape and path mapping errors.

use thiserror::Error;

/// A value could not be mapped onto the shape an operation expects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    /// A scalar-returning operation received an envelope without the expected key.
    #[error("unexpected response envelope for {operation}: expected key '{expected}', got {found}")]
    UnexpectedEnvelope {
        /// Entity and operation, e.g. `Customer.count`.
        operation: String,
        /// The envelope key the operation unwraps.
        expected: String,
        /// The payload actually received.
        found: String,
    },

    /// The envelope key was present but its value has the wrong type.
    #[error("unexpected {expected} value for {operation}: {found}")]
    UnexpectedScalar {
        /// Entity and operation.
        operation: String,
        /// Expected scalar kind (`boolean`, `integer`).
        expected: &'static str,
        /// The value actually received.
        found: String,
    },

    /// A path template still contains a placeholder after substitution.
    #[error("unresolved placeholder ':{placeholder}' in path '{template}'")]
    UnresolvedPlaceholder {
        /// The template being resolved.
        template: String,
        /// The placeholder name without the leading colon.
        placeholder: String,
    },

    /// A placeholder value cannot stand as a single path segment.
    #[error("value '{value}' for ':{placeholder}' in path '{template}' is not a valid path segment")]
    InvalidSegment {
        /// The template being resolved.
        template: String,
        /// The placeholder name without the leading colon.
        placeholder: String,
        /// The rejected value.
        value: String,
    },

    /// An authentication response could not be converted into an access token.
    #[error("invalid access token envelope: {0}")]
    InvalidToken(String),
}
