//! Configuration types for shopping-serp

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the API login
pub const LOGIN_ENV: &str = "DATAFORSEO_LOGIN";
/// Environment variable holding the API password
pub const PASSWORD_ENV: &str = "DATAFORSEO_PASSWORD";

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.dataforseo.com/v3";

/// API login/password pair
///
/// Both values are mandatory; the client refuses to start with either one
/// missing or blank. Deserialize-only: the password is never serialized.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// API login (usually the account e-mail)
    pub login: String,
    /// API password
    pub password: String,
}

impl Credentials {
    /// Create a credential pair, rejecting blank values
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let credentials = Self {
            login: login.into(),
            password: password.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Load credentials from `DATAFORSEO_LOGIN` / `DATAFORSEO_PASSWORD`
    pub fn from_env() -> Result<Self> {
        let login = std::env::var(LOGIN_ENV)
            .map_err(|_| Error::config(format!("{LOGIN_ENV} not set in environment"), LOGIN_ENV))?;
        let password = std::env::var(PASSWORD_ENV).map_err(|_| {
            Error::config(format!("{PASSWORD_ENV} not set in environment"), PASSWORD_ENV)
        })?;
        Self::new(login, password)
    }

    /// Check that neither value is blank
    pub fn validate(&self) -> Result<()> {
        if self.login.trim().is_empty() {
            return Err(Error::config("missing API login", LOGIN_ENV));
        }
        if self.password.trim().is_empty() {
            return Err(Error::config("missing API password", PASSWORD_ENV));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"****")
            .finish()
    }
}

/// Client configuration
///
/// Every field has a default, so `ClientConfig::default()` talks to the
/// production API with the stock timeouts and retry ceilings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root without trailing slash (default: "https://api.dataforseo.com/v3")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// TCP connect timeout (default: 10 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Longest wait for each read from the socket (default: 60 seconds)
    ///
    /// Bounds silence, not the total transfer time.
    #[serde(default = "default_read_timeout", with = "duration_serde")]
    pub read_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Retry policy for task submission calls (default: 5 attempts)
    #[serde(default = "default_submit_retry")]
    pub submit_retry: RetryConfig,

    /// Retry policy for task status calls (default: 7 attempts)
    #[serde(default = "default_poll_retry")]
    pub poll_retry: RetryConfig,

    /// Poll deadline and interval used by the high-level operations
    #[serde(default)]
    pub poll: PollConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
            user_agent: default_user_agent(),
            submit_retry: default_submit_retry(),
            poll_retry: default_poll_retry(),
            poll: PollConfig::default(),
        }
    }
}

/// Retry configuration for transient failures
///
/// `max_attempts` is the total number of calls, the first one included.
/// Delays start at `initial_delay`, grow by `backoff_multiplier` after every
/// failed attempt and never exceed `max_delay`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempt ceiling including the first call (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between attempts (default: 8 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl RetryConfig {
    /// Policy with the stock backoff and the given attempt ceiling
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Poll loop timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Budget for the whole poll sequence (default: 180 seconds)
    ///
    /// Compared in whole seconds.
    #[serde(default = "default_max_wait", with = "duration_serde")]
    pub max_wait: Duration,

    /// Pause between status checks (default: 2.0 seconds)
    #[serde(default = "default_poll_interval", with = "fractional_duration_serde")]
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_wait: default_max_wait(),
            interval: default_poll_interval(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    format!("shopping-serp/{}", env!("CARGO_PKG_VERSION"))
}

fn default_submit_retry() -> RetryConfig {
    RetryConfig::with_max_attempts(5)
}

fn default_poll_retry() -> RetryConfig {
    RetryConfig::with_max_attempts(7)
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(8)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_wait() -> Duration {
    Duration::from_secs(180)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (fractional seconds)
mod fractional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
