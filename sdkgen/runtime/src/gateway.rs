//! Request execution shared by every repository of a generated client.
//!
//! A [`Gateway`] owns the HTTP client, the connection settings and the held
//! access token. It is a cheap `Arc` handle: repositories clone it, and
//! independent gateways never observe each other's configuration or token.
//!
//! Each call reads the configuration and token once at issuance and owns its
//! own [`Deadline`]; concurrent calls never reset each other's deadline.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Local;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{Span, debug, info, instrument, warn};
use url::Url;

use crate::config::GatewayConfig;
use crate::convert;
use crate::error::{ConfigError, RequestError, SdkError};
use crate::route::Route;
use crate::token::{AccessToken, AuthState};
use crate::verb::Verb;

/// Emits at `info` when the gateway is in debug mode, `debug` otherwise.
macro_rules! gateway_log {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            info!($($arg)+)
        } else {
            debug!($($arg)+)
        }
    };
}

/// A deadline owned by a single call from issuance to completion.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    fn start(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    fn budget_ms(&self) -> u64 {
        u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug)]
struct Inner {
    client: reqwest::Client,
    config: RwLock<GatewayConfig>,
    token: RwLock<Option<AccessToken>>,
}

/// Executes REST calls for generated repositories.
///
/// ## Examples
///
/// ```rust,ignore
/// use sdkgen_runtime::{Gateway, Route, Verb};
///
/// let gateway = Gateway::with_base_url("http://localhost:3000/api")?;
/// let route = Route::new(Verb::Get, "/Customers/:id");
/// let customer: serde_json::Value = gateway.invoke(&route, &[("id", "7")], None, &[]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Gateway {
    inner: Arc<Inner>,
}

impl Gateway {
    /// Creates a gateway with the given configuration.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base URL is not absolute,
    /// or [`ConfigError::Client`] if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                config: RwLock::new(config),
                token: RwLock::new(None),
            }),
        })
    }

    /// Creates a gateway with default settings and the given base URL.
    ///
    /// ## Errors
    ///
    /// See [`Gateway::new`].
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(GatewayConfig::default().with_base_url(base_url))
    }

    /// Creates a gateway configured from `SDKGEN_*` environment variables.
    ///
    /// ## Errors
    ///
    /// See [`GatewayConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(GatewayConfig::from_env()?)
    }

    /// Returns a snapshot of the current configuration.
    pub fn config(&self) -> GatewayConfig {
        self.inner
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_config(&self, apply: impl FnOnce(&mut GatewayConfig)) {
        let mut config = self
            .inner
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        apply(&mut config);
    }

    /// Sets the base URL used by the next request.
    pub fn set_base_url(&self, base_url: impl Into<String>) {
        let base_url = base_url.into();
        self.update_config(|c| c.base_url = base_url);
    }

    /// Enables or disables debug logging for subsequent requests.
    pub fn set_debug_mode(&self, debug: bool) {
        self.update_config(|c| c.debug = debug);
    }

    /// Sets the per-call timeout for subsequent requests.
    pub fn set_timeout(&self, timeout: Duration) {
        self.update_config(|c| c.timeout = timeout);
    }

    /// Stores a token; subsequent requests carry it as `Authorization`.
    pub fn set_access_token(&self, token: AccessToken) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Drops the held token. Calling this with no token held is a no-op.
    pub fn reset_access_token(&self) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Returns a copy of the held token.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a token is currently held.
    pub fn auth_state(&self) -> AuthState {
        match self.access_token() {
            Some(_) => AuthState::Authenticated,
            None => AuthState::NoToken,
        }
    }

    /// Requests the base URL. Any transport error, timeout or non-success
    /// status yields `false`.
    #[instrument(name = "gateway_connectivity", skip(self))]
    pub async fn check_connectivity(&self, timeout: Duration) -> bool {
        let config = self.config();
        let Ok(url) = Url::parse(&config.base_url) else {
            return false;
        };

        match tokio::time::timeout(timeout, self.inner.client.get(url).send()).await {
            Ok(Ok(response)) => {
                let reachable = response.status().is_success();
                gateway_log!(config.debug, status = response.status().as_u16(), reachable, "connectivity check");
                reachable
            }
            Ok(Err(e)) => {
                gateway_log!(config.debug, error = %e, "connectivity check failed");
                false
            }
            Err(_) => {
                gateway_log!(config.debug, "connectivity check timed out");
                false
            }
        }
    }

    /// Sends one request and returns the decoded response body.
    ///
    /// The configuration and token are read once at issuance. Query pairs with
    /// empty values are dropped; `body` is only sent for mutating verbs.
    ///
    /// ## Errors
    ///
    /// Returns a [`RequestError`] on transport failure, non-success status,
    /// deadline expiry or an undecodable body.
    #[instrument(
        name = "gateway_request",
        skip(self, body, query),
        fields(
            http.method = %verb,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub async fn perform_request(
        &self,
        path: &str,
        verb: Verb,
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<Value, RequestError> {
        let config = self.config();
        let deadline = Deadline::start(config.timeout);
        let token = self.access_token();

        let url = build_url(&config.base_url, path, query)?;
        Span::current().record("http.url", url.as_str());

        let mut request = self.inner.client.request(verb.to_reqwest(), url.clone());

        if let Some(token) = &token {
            if token.is_expired(Local::now()) {
                warn!("attaching an access token that has passed its ttl");
            }
            let value = HeaderValue::from_str(&token.id).map_err(|e| RequestError::Encode(format!(
                "access token is not a valid header value: {e}"
            )))?;
            request = request.header(AUTHORIZATION, value);
        }

        match body {
            Some(body) if verb.is_mutating() => {
                gateway_log!(config.debug, %verb, %url, body = %body, "sending request");
                request = request.json(&body);
            }
            Some(_) => {
                debug!(%verb, "dropping body on non-mutating request");
                gateway_log!(config.debug, %verb, %url, "sending request");
            }
            None => gateway_log!(config.debug, %verb, %url, "sending request"),
        }

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| RequestError::from_transport(&e))?;
            let status = response.status();
            let bytes = response
                .bytes()
                .await
                .map_err(|e| RequestError::from_transport(&e))?;
            Ok::<_, RequestError>((status, bytes))
        };

        let (status, bytes) = match tokio::time::timeout_at(deadline.at, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(%url, timeout_ms = deadline.budget_ms(), "request deadline expired");
                return Err(RequestError::Timeout {
                    duration_ms: deadline.budget_ms(),
                });
            }
        };

        Span::current().record("http.status_code", status.as_u16());

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            gateway_log!(config.debug, status = status.as_u16(), body = %body, "request failed");
            return Err(RequestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        gateway_log!(config.debug, status = status.as_u16(), bytes = bytes.len(), "response received");
        convert::decode(&bytes)
    }

    /// Resolves `route`, sends the request and returns the raw decoded body.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Mapping`] for unresolved placeholders and
    /// [`SdkError::Request`] for request failures.
    pub async fn invoke_value(
        &self,
        route: &Route,
        params: &[(&str, &str)],
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<Value, SdkError> {
        let path = route.resolve(params)?;
        Ok(self.perform_request(&path, route.verb, body, query).await?)
    }

    /// Like [`Gateway::invoke_value`], deserializing the body into `T`.
    ///
    /// ## Errors
    ///
    /// Additionally returns [`SdkError::Request`] with a decode error if the
    /// body does not match `T`.
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        route: &Route,
        params: &[(&str, &str)],
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<T, SdkError> {
        let value = self.invoke_value(route, params, body, query).await?;
        Ok(convert::from_value(value)?)
    }

    /// Like [`Gateway::invoke_value`], discarding the body.
    ///
    /// ## Errors
    ///
    /// See [`Gateway::invoke_value`].
    pub async fn invoke_unit(
        &self,
        route: &Route,
        params: &[(&str, &str)],
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<(), SdkError> {
        self.invoke_value(route, params, body, query).await?;
        Ok(())
    }

    /// Calls an authentication route and stores the returned token.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Mapping`] if the response is not a token envelope;
    /// the held token is left unchanged on any failure.
    pub async fn authenticate(
        &self,
        route: &Route,
        params: &[(&str, &str)],
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<AccessToken, SdkError> {
        let envelope = self.invoke_value(route, params, body, query).await?;
        let token = AccessToken::try_from(envelope)?;
        self.set_access_token(token.clone());
        info!(user_id = ?token.user_id, "authenticated");
        Ok(token)
    }

    /// Calls a logout route and clears the held token once it succeeds.
    ///
    /// ## Errors
    ///
    /// See [`Gateway::invoke_value`]; the token is kept if the call fails.
    pub async fn end_session(
        &self,
        route: &Route,
        params: &[(&str, &str)],
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<(), SdkError> {
        self.invoke_unit(route, params, body, query).await?;
        self.reset_access_token();
        info!("session ended");
        Ok(())
    }
}

/// Joins base URL and path, appending non-empty query pairs.
fn build_url(base_url: &str, path: &str, query: &[(&str, &str)]) -> Result<Url, RequestError> {
    let raw = format!("{}{}", base_url.trim_end_matches('/'), path);
    let mut url = Url::parse(&raw).map_err(|e| RequestError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })?;

    let mut pairs = query.iter().filter(|(_, value)| !value.is_empty()).peekable();
    if pairs.peek().is_some() {
        let mut serializer = url.query_pairs_mut();
        for (key, value) in pairs {
            serializer.append_pair(key, value);
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_without_double_slash() {
        let url = build_url("http://localhost:3000/api/", "/Customers", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/Customers");
    }

    #[test]
    fn build_url_skips_empty_query_values() {
        let url = build_url(
            "http://localhost:3000/api",
            "/Customers",
            &[("filter", ""), ("where", "{\"age\":3}")],
        )
        .unwrap();
        assert_eq!(url.query_pairs().count(), 1);
        assert_eq!(url.query_pairs().next().unwrap().0, "where");
    }

    #[test]
    fn build_url_without_query_has_no_question_mark() {
        let url = build_url("http://h/api", "/X", &[("filter", "")]).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn build_url_rejects_relative_base() {
        let err = build_url("api", "/X", &[]).unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl { .. }));
    }

    #[test]
    fn reset_is_idempotent() {
        let gateway = Gateway::new(GatewayConfig::default()).unwrap();
        gateway.set_access_token(AccessToken::new("t"));
        assert_eq!(gateway.auth_state(), AuthState::Authenticated);

        gateway.reset_access_token();
        let once = gateway.auth_state();
        gateway.reset_access_token();
        assert_eq!(once, AuthState::NoToken);
        assert_eq!(gateway.auth_state(), once);
        assert_eq!(gateway.access_token(), None);
    }

    #[test]
    fn configuration_setters_take_effect() {
        let gateway = Gateway::new(GatewayConfig::default()).unwrap();
        gateway.set_base_url("http://example.test/api");
        gateway.set_timeout(Duration::from_millis(50));
        gateway.set_debug_mode(true);

        let config = gateway.config();
        assert_eq!(config.base_url, "http://example.test/api");
        assert_eq!(config.timeout, Duration::from_millis(50));
        assert!(config.debug);
    }

    #[test]
    fn clones_share_state_but_separate_gateways_do_not() {
        let a = Gateway::new(GatewayConfig::default()).unwrap();
        let a2 = a.clone();
        let b = Gateway::new(GatewayConfig::default()).unwrap();

        a.set_access_token(AccessToken::new("a"));
        assert_eq!(a2.auth_state(), AuthState::Authenticated);
        assert_eq!(b.auth_state(), AuthState::NoToken);
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let err = Gateway::with_base_url("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn debug_mode_logs_requests() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let gateway = Gateway::with_base_url(format!("{}/api", server.uri())).unwrap();
        gateway.set_debug_mode(true);
        gateway
            .perform_request("/Ping", Verb::Get, None, &[])
            .await
            .unwrap();

        assert!(logs_contain("sending request"));
        assert!(logs_contain("response received"));
    }
}
