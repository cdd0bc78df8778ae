//! Top-level runtime error type.

use thiserror::Error;

use super::{ConfigError, MappingError, RequestError};

/// Error returned by gateway and repository operations.
///
/// ## Examples
///
/// ```rust,ignore
/// match repo.count("").await {
///     Ok(n) => println!("{n} customers"),
///     Err(SdkError::Request(e)) if e.is_timeout() => eprintln!("backend too slow"),
///     Err(SdkError::Mapping(e)) => eprintln!("unexpected payload: {e}"),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum SdkError {
    /// Network, status, timeout or deserialization failure.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The response or path could not be mapped onto the expected shape.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The gateway configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SdkError {
    /// HTTP status associated with the failure, or 0 when none is recoverable.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Request(e) => e.status_code(),
            _ => 0,
        }
    }
}
