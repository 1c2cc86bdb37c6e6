//! Error types for shopping-serp
//!
//! Every fallible operation in the crate returns [`Error`]. Variants map onto
//! the failure kinds the client distinguishes:
//! - configuration problems detected at construction (never retried)
//! - transport failures and unacceptable API status codes (retried)
//! - contract violations in an otherwise accepted response (never retried)
//! - poll deadline exhaustion (never retried)

use thiserror::Error;

/// Result type alias for shopping-serp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for shopping-serp
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "DATAFORSEO_LOGIN")
        key: Option<String>,
    },

    /// Network error: connect failure, timeout, HTTP error status or undecodable body
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered, but with a status code outside the accepted set for the call
    #[error("API status: {} {}", display_code(.status_code), .status_message.as_deref().unwrap_or(""))]
    ApiStatus {
        /// Top-level `status_code` of the response, if present
        status_code: Option<i64>,
        /// Top-level `status_message` of the response, if present
        status_message: Option<String>,
    },

    /// Response passed status validation but lacks a field the client depends on
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),

    /// Poll deadline exceeded before the task produced a result
    #[error("timed out waiting for task result after {max_wait_secs}s")]
    Timeout {
        /// The poll budget, in whole seconds, that was exhausted
        max_wait_secs: u64,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a specific key
    pub(crate) fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

fn display_code(code: &Option<i64>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "None".to_string(),
    }
}
