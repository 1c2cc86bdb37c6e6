//! # shopping-serp
//!
//! Async client for the DataForSEO Google Shopping task API, plus the
//! normalization and competitor-analysis helpers that sit on top of it.
//!
//! ## How a query runs
//!
//! 1. The request is posted once as a batch of one, and the API answers with
//!    a task id.
//! 2. The task is polled until its first result set appears or the poll
//!    budget runs out. Progress is reported to an optional observer.
//! 3. The completed response comes back verbatim as a [`TaskPayload`], ready
//!    for [`normalize::parse_shopping_results`] and
//!    [`analysis::analyze_competitors`].
//!
//! Every HTTP call retries transient failures with capped exponential backoff:
//! up to 5 attempts for submissions and 7 for status checks.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shopping_serp::{ClientConfig, SearchRequest, ShoppingClient};
//! use shopping_serp::analysis::analyze_competitors;
//! use shopping_serp::normalize::parse_shopping_results;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ShoppingClient::from_env(ClientConfig::default())?;
//!
//!     let payload = client
//!         .search_products(&SearchRequest::new("running shoes"), None)
//!         .await?;
//!
//!     let rows = parse_shopping_results(&payload);
//!     if let Some(analysis) = analyze_competitors(&rows, &["nike.com".to_string()]) {
//!         println!("{} products from {} domains", analysis.total_products, analysis.unique_domains);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Competitor analysis and title scoring
pub mod analysis;
/// Task submission and high-level operations
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Result normalization into product rows
pub mod normalize;
/// Task poll loop and progress reporting
pub mod poller;
/// Retry logic with exponential backoff
pub mod retry;
/// Authenticated HTTP transport
pub mod transport;
/// Core request and response types
pub mod types;

// Re-export commonly used types
pub use client::ShoppingClient;
pub use config::{ClientConfig, Credentials, PollConfig, RetryConfig};
pub use error::{Error, Result};
pub use poller::{PollState, ProgressObserver};
pub use transport::{HttpTransport, TaskApi};
pub use types::{
    ProductInfoRequest, SearchRequest, TaskHandle, TaskKind, TaskPayload, TaskRequest,
};
