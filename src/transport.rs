//! Authenticated JSON transport over HTTP
//!
//! [`HttpTransport`] owns one pooled `reqwest::Client` with the Basic auth
//! header baked in. Each call is validated at two levels: the HTTP status must
//! be a success, and the body's `status_code` must be in the accepted set for
//! that call type. Either failure counts as a failed attempt and is retried
//! under the call type's [`RetryConfig`].
//!
//! Submission and polling talk to the transport through the [`TaskApi`] trait,
//! so they can be driven by a scripted implementation in tests.

use crate::config::{ClientConfig, Credentials, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::with_retry;
use crate::types::{GET_ACCEPTED, POST_ACCEPTED, TaskPayload};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

/// The two API calls the task client needs
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// POST `payload` to `path` and return the accepted response
    async fn post(&self, path: &str, payload: &Value) -> Result<TaskPayload>;

    /// GET `path` and return the accepted response
    async fn get(&self, path: &str) -> Result<TaskPayload>;
}

/// HTTP implementation of [`TaskApi`]
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    post_retry: RetryConfig,
    get_retry: RetryConfig,
}

impl HttpTransport {
    /// Build a transport for the given credentials and configuration
    ///
    /// Fails with [`Error::Config`] if the credentials are blank, the base URL
    /// does not parse, or the HTTP client cannot be constructed.
    pub fn new(credentials: &Credentials, config: &ClientConfig) -> Result<Self> {
        credentials.validate()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)
            .map_err(|e| Error::config(format!("invalid base URL {base_url:?}: {e}"), "base_url"))?;

        let encoded = STANDARD.encode(format!("{}:{}", credentials.login, credentials.password));
        let mut auth = HeaderValue::from_str(&format!("Basic {encoded}"))
            .map_err(|e| Error::config(format!("invalid credentials: {e}"), "credentials"))?;
        auth.set_sensitive(true);

        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| Error::config(format!("invalid user agent: {e}"), "user_agent"))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, user_agent);

        // No total deadline: a body that keeps arriving is never cut off.
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}"), "http"))?;

        Ok(Self {
            http,
            base_url,
            post_retry: config.submit_retry.clone(),
            get_retry: config.poll_retry.clone(),
        })
    }

    /// API root this transport talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_once(&self, url: &str, payload: &Value) -> Result<TaskPayload> {
        tracing::debug!(url, "POST");
        let response = self.http.post(url).json(payload).send().await?;
        let body: Value = response.error_for_status()?.json().await?;
        check_status(TaskPayload::new(body), POST_ACCEPTED)
    }

    async fn get_once(&self, url: &str) -> Result<TaskPayload> {
        tracing::debug!(url, "GET");
        let response = self.http.get(url).send().await?;
        let body: Value = response.error_for_status()?.json().await?;
        check_status(TaskPayload::new(body), GET_ACCEPTED)
    }
}

#[async_trait]
impl TaskApi for HttpTransport {
    async fn post(&self, path: &str, payload: &Value) -> Result<TaskPayload> {
        let url = self.url(path);
        with_retry(&self.post_retry, || self.post_once(&url, payload)).await
    }

    async fn get(&self, path: &str) -> Result<TaskPayload> {
        let url = self.url(path);
        with_retry(&self.get_retry, || self.get_once(&url)).await
    }
}

/// Reject a response whose `status_code` is outside `accepted`
pub fn check_status(payload: TaskPayload, accepted: &[i64]) -> Result<TaskPayload> {
    match payload.status_code() {
        Some(code) if accepted.contains(&code) => Ok(payload),
        status_code => Err(Error::ApiStatus {
            status_code,
            status_message: payload.status_message().map(str::to_string),
        }),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials::new("user@example.com", "secret").unwrap()
    }

    #[test]
    fn post_accepts_pending_and_partial_codes() {
        for code in [20000, 20100, 40500] {
            let payload = TaskPayload::new(json!({"status_code": code}));
            assert!(check_status(payload, POST_ACCEPTED).is_ok(), "code {code}");
        }
    }

    #[test]
    fn get_accepts_only_success() {
        assert!(check_status(TaskPayload::new(json!({"status_code": 20000})), GET_ACCEPTED).is_ok());

        for code in [20100, 40500, 40100, 50000] {
            let err = check_status(
                TaskPayload::new(json!({"status_code": code, "status_message": "nope"})),
                GET_ACCEPTED,
            )
            .unwrap_err();
            match err {
                Error::ApiStatus {
                    status_code,
                    status_message,
                } => {
                    assert_eq!(status_code, Some(code));
                    assert_eq!(status_message.as_deref(), Some("nope"));
                }
                other => panic!("expected ApiStatus, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_status_code_is_rejected() {
        let err = check_status(TaskPayload::new(json!({"tasks": []})), POST_ACCEPTED).unwrap_err();
        assert!(matches!(
            err,
            Error::ApiStatus {
                status_code: None,
                ..
            }
        ));
    }

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let config = ClientConfig {
            base_url: "https://api.example.com/v3/".to_string(),
            ..ClientConfig::default()
        };
        let transport = HttpTransport::new(&credentials(), &config).unwrap();
        assert_eq!(transport.base_url(), "https://api.example.com/v3");
        assert_eq!(
            transport.url("/merchant/google/products/task_post"),
            "https://api.example.com/v3/merchant/google/products/task_post"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        let err = HttpTransport::new(&credentials(), &config).unwrap_err();
        assert!(matches!(err, Error::Config { ref key, .. } if key.as_deref() == Some("base_url")));
    }

    #[test]
    fn blank_credentials_are_rejected_at_construction() {
        let credentials = Credentials {
            login: String::new(),
            password: "secret".to_string(),
        };
        let err = HttpTransport::new(&credentials, &ClientConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
