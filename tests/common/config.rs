//! Test configuration helpers for mock servers and live credentials

use shopping_serp::{ClientConfig, Credentials, PollConfig, RetryConfig, ShoppingClient};
use std::time::Duration;

/// Login used against mock servers
pub const TEST_LOGIN: &str = "analyst@example.com";
/// Password used against mock servers
pub const TEST_PASSWORD: &str = "s3cret";

/// Retry policy with the stock shape but millisecond delays
pub fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(40),
        backoff_multiplier: 2.0,
        jitter: false,
    }
}

/// Client configuration pointed at a mock server, with fast retries and polls
pub fn mock_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_string(),
        connect_timeout: Duration::from_secs(2),
        read_timeout: Duration::from_secs(5),
        submit_retry: fast_retry(5),
        poll_retry: fast_retry(7),
        poll: PollConfig {
            max_wait: Duration::from_secs(5),
            interval: Duration::from_millis(10),
        },
        ..ClientConfig::default()
    }
}

/// HTTP client against a mock server
pub fn mock_client(base_url: &str) -> ShoppingClient {
    mock_client_with(mock_config(base_url))
}

/// HTTP client with a custom configuration
pub fn mock_client_with(config: ClientConfig) -> ShoppingClient {
    let credentials = Credentials::new(TEST_LOGIN, TEST_PASSWORD).expect("test credentials");
    ShoppingClient::new(credentials, config).expect("client should build")
}

/// Check whether live API credentials are configured
pub fn has_live_credentials() -> bool {
    dotenvy::dotenv().ok();
    std::env::var(shopping_serp::config::LOGIN_ENV).is_ok()
        && std::env::var(shopping_serp::config::PASSWORD_ENV).is_ok()
}
