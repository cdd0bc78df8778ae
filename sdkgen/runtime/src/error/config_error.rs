//! Gateway configuration errors.

use thiserror::Error;

/// Errors raised while building or overlaying a [`crate::GatewayConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL is not an absolute URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An environment variable held an unparseable value.
    #[error("invalid value '{value}' for {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
