//! Transport-level request errors.

use thiserror::Error;

/// A request failed on the wire, at the server, or while decoding.
///
/// Every variant resolves to a status code through [`RequestError::status_code`]:
/// the HTTP status when the server answered, a code recovered from the
/// transport error text when one is present, and 0 otherwise.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The transport failed (connection refused, TLS, protocol error).
    #[error("request failed: {message}")]
    Transport {
        /// Status recovered from the error text, or 0.
        status: u16,
        /// The transport error text.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The per-call deadline expired before a response arrived.
    #[error("request timed out after {duration_ms}ms")]
    Timeout {
        /// The deadline that expired, in milliseconds.
        duration_ms: u64,
    },

    /// The response body could not be deserialized into the target type.
    #[error("failed to decode response: {message}")]
    Decode {
        /// Deserializer message.
        message: String,
    },

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// The base URL and path did not form a valid URL.
    #[error("invalid request URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL that failed to parse.
        url: String,
        /// Parser message.
        reason: String,
    },
}

impl RequestError {
    /// Returns the HTTP status code, or 0 when none is recoverable.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Transport { status, .. } | Self::Status { status, .. } => *status,
            _ => 0,
        }
    }

    /// Returns `true` if the call was abandoned because its deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        let message = err.to_string();
        let status = err.status().map(|s| s.as_u16()).unwrap_or_else(|| {
            // The request URL is part of the message; its host and path must not read as a status.
            let text = match err.url() {
                Some(url) => message.replace(url.as_str(), ""),
                None => message.clone(),
            };
            status_from_text(&text)
        });
        Self::Transport { status, message }
    }
}

/// Recovers an HTTP status code from free-form error text.
///
/// Returns the first whitespace-separated word that is exactly three digits
/// in the 100..=599 range, ignoring surrounding brackets and punctuation.
/// Digits inside a larger word (addresses, ports, paths) never count, and
/// neither does an `os error` number.
///
/// ```
/// use sdkgen_runtime::error::status_from_text;
///
/// assert_eq!(status_from_text("Response status code does not indicate success: 404 (Not Found)"), 404);
/// assert_eq!(status_from_text("connection reset by peer"), 0);
/// assert_eq!(status_from_text("port 30001 refused"), 0);
/// assert_eq!(status_from_text("tcp connect to 127.0.0.1:9 refused"), 0);
/// ```
pub fn status_from_text(text: &str) -> u16 {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .collect();

    words
        .iter()
        .enumerate()
        .filter(|(i, _)| !(*i >= 2 && words[i - 2].eq_ignore_ascii_case("os") && words[i - 1] == "error"))
        .map(|(_, word)| *word)
        .filter(|word| word.len() == 3 && word.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|word| word.parse::<u16>().ok())
        .find(|code| (100..=599).contains(code))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_for_each_variant() {
        let status = RequestError::Status {
            status: 500,
            body: String::new(),
        };
        assert_eq!(status.status_code(), 500);

        let transport = RequestError::Transport {
            status: 0,
            message: "connection refused".to_string(),
        };
        assert_eq!(transport.status_code(), 0);

        assert_eq!(RequestError::Timeout { duration_ms: 50 }.status_code(), 0);
        assert_eq!(
            RequestError::Decode {
                message: "eof".to_string()
            }
            .status_code(),
            0
        );
    }

    #[test]
    fn timeout_is_distinguishable() {
        assert!(RequestError::Timeout { duration_ms: 50 }.is_timeout());
        assert!(!RequestError::Encode("bad".to_string()).is_timeout());
    }

    #[test]
    fn status_from_text_skips_out_of_range_numbers() {
        assert_eq!(status_from_text("code 999 then 503"), 503);
        assert_eq!(status_from_text("HTTP 401"), 401);
        assert_eq!(status_from_text(""), 0);
        assert_eq!(status_from_text("failed (503)"), 503);
    }

    #[test]
    fn status_from_text_ignores_addresses_and_paths() {
        let text = "error sending request for url (http://127.0.0.1:9/api/Customers/404): \
                    tcp connect error: Connection refused (os error 111)";
        assert_eq!(status_from_text(text), 0);
        assert_eq!(status_from_text("connect to 10.200.1.250:8080 failed"), 0);
        assert_eq!(status_from_text("GET /Orders/204 failed"), 0);
    }

    #[test]
    fn timeout_display_mentions_duration() {
        let err = RequestError::Timeout { duration_ms: 6000 };
        assert_eq!(err.to_string(), "request timed out after 6000ms");
    }
}
