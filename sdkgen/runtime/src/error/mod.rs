//! Error types for the runtime gateway and dispatcher.
//!
//! - [`RequestError`] - transport, status, timeout and decode failures
//! - [`MappingError`] - unexpected response envelopes and unresolved path placeholders
//! - [`ConfigError`] - invalid gateway configuration
//! - [`SdkError`] - the aggregate returned by every generated repository call

mod config_error;
mod mapping_error;
mod request_error;
mod sdk_error;

pub use config_error::ConfigError;
pub use mapping_error::MappingError;
pub use request_error::{RequestError, status_from_text};
pub use sdk_error::SdkError;
