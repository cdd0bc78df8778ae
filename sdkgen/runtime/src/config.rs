//! Gateway configuration.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Default base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Default per-call timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 6000;

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "SDKGEN_BASE_URL";
/// Environment variable overriding the timeout, in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "SDKGEN_TIMEOUT_MS";
/// Environment variable enabling debug logging (`1`, `true`, `yes`, `on`).
pub const ENV_DEBUG: &str = "SDKGEN_DEBUG";

/// Connection settings read by a [`crate::Gateway`] at the start of each call.
///
/// ## Examples
///
/// ```
/// use std::time::Duration;
/// use sdkgen_runtime::GatewayConfig;
///
/// let config = GatewayConfig::default()
///     .with_base_url("https://shop.example.com/api")
///     .with_timeout(Duration::from_secs(2))
///     .with_debug(true);
///
/// assert_eq!(config.base_url, "https://shop.example.com/api");
/// assert!(config.debug);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL every request path is appended to.
    pub base_url: String,
    /// Deadline applied to each call from issuance to completion.
    pub timeout: Duration,
    /// Log request and response details at `info` instead of `debug`.
    pub debug: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            debug: false,
        }
    }
}

impl GatewayConfig {
    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables debug logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builds a configuration from defaults overlaid with `SDKGEN_*` environment variables.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] when a variable is set but unparseable,
    /// and [`ConfigError::InvalidBaseUrl`] when the resulting base URL is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().overlay(|var| std::env::var(var).ok())
    }

    /// Applies overrides from a variable lookup function.
    fn overlay(mut self, lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_TIMEOUT_MS,
                value: raw.clone(),
            })?;
            self.timeout = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup(ENV_DEBUG) {
            self.debug = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: ENV_DEBUG,
                        value: raw,
                    });
                }
            };
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks that the base URL is absolute.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL does not parse or has no host.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !parsed.has_host() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "URL has no host".to_string(),
            });
        }
        Ok(())
    }
}
