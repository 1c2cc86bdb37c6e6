//! Shopping task client
//!
//! [`ShoppingClient`] ties the pieces together: it submits a task once through
//! the transport, then hands the returned handle to the poll loop. Submission
//! never waits for completion.
//!
//! ```no_run
//! use shopping_serp::{ClientConfig, Credentials, SearchRequest, ShoppingClient};
//! use shopping_serp::normalize::parse_shopping_results;
//!
//! # async fn example() -> shopping_serp::Result<()> {
//! let client = ShoppingClient::new(Credentials::from_env()?, ClientConfig::default())?;
//! let on_tick = |elapsed: u64, max: u64| eprintln!("waiting {elapsed}/{max}s");
//! let payload = client
//!     .search_products(&SearchRequest::new("running shoes"), Some(&on_tick))
//!     .await?;
//! let rows = parse_shopping_results(&payload);
//! println!("{} products", rows.len());
//! # Ok(())
//! # }
//! ```

use crate::config::{ClientConfig, Credentials, PollConfig};
use crate::error::{Error, Result};
use crate::poller::{ProgressObserver, poll_until_ready};
use crate::transport::{HttpTransport, TaskApi};
use crate::types::{ProductInfoRequest, SearchRequest, TaskHandle, TaskKind, TaskPayload, TaskRequest};
use std::time::Duration;

/// Client for the merchant task endpoints
///
/// Generic over the [`TaskApi`] it talks through; production code uses the
/// default [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct ShoppingClient<A = HttpTransport> {
    api: A,
    poll: PollConfig,
}

impl ShoppingClient<HttpTransport> {
    /// Build a client over HTTP
    ///
    /// Fails with [`Error::Config`] for blank credentials or an invalid base URL.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let api = HttpTransport::new(&credentials, &config)?;
        Ok(Self::with_api(api, config.poll))
    }

    /// Build a client from `DATAFORSEO_LOGIN` / `DATAFORSEO_PASSWORD`
    pub fn from_env(config: ClientConfig) -> Result<Self> {
        Self::new(Credentials::from_env()?, config)
    }
}

impl<A: TaskApi> ShoppingClient<A> {
    /// Build a client over any [`TaskApi`] implementation
    pub fn with_api(api: A, poll: PollConfig) -> Self {
        Self { api, poll }
    }

    /// Poll defaults used by the high-level operations
    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Submit a task and return its handle
    ///
    /// The request is posted exactly once at this level; only the underlying
    /// HTTP call is retried. A response without `tasks[0].id` is a contract
    /// violation and fails with [`Error::UnexpectedResponse`].
    pub async fn submit(&self, request: &TaskRequest) -> Result<TaskHandle> {
        let kind = request.kind();
        let response = self.api.post(&kind.post_path(), &request.to_body()).await?;

        let id = response.task_id().ok_or_else(|| {
            Error::UnexpectedResponse(format!(
                "{kind} task_post response has no tasks[0].id (status {:?})",
                response.status_code()
            ))
        })?;

        let handle = TaskHandle::new(id);
        tracing::info!(kind = %kind, task_id = %handle, "Task submitted");
        Ok(handle)
    }

    /// Wait for a submitted task to produce its result
    pub async fn poll(
        &self,
        kind: TaskKind,
        handle: &TaskHandle,
        max_wait: Duration,
        interval: Duration,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<TaskPayload> {
        let payload =
            poll_until_ready(&self.api, &kind.get_path(handle), max_wait, interval, observer)
                .await?;
        tracing::info!(
            kind = %kind,
            task_id = %handle,
            items = payload.items().len(),
            "Task completed"
        );
        Ok(payload)
    }

    /// Submit a task and poll it with the configured defaults
    pub async fn run(
        &self,
        request: &TaskRequest,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<TaskPayload> {
        let handle = self.submit(request).await?;
        self.poll(
            request.kind(),
            &handle,
            self.poll.max_wait,
            self.poll.interval,
            observer,
        )
        .await
    }

    /// Search shopping listings for a keyword
    ///
    /// Returns the completed task response verbatim.
    pub async fn search_products(
        &self,
        request: &SearchRequest,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<TaskPayload> {
        self.run(&TaskRequest::Search(request.clone()), observer).await
    }

    /// Fetch details for one product
    ///
    /// Returns the completed task response verbatim.
    pub async fn get_product_info(
        &self,
        request: &ProductInfoRequest,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<TaskPayload> {
        self.run(&TaskRequest::ProductInfo(request.clone()), observer)
            .await
    }

    /// Run several keyword searches one after another
    ///
    /// Each search is submitted only after the previous one has finished
    /// polling. Stops at the first error.
    pub async fn search_batch(
        &self,
        requests: &[SearchRequest],
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<Vec<TaskPayload>> {
        let mut payloads = Vec::with_capacity(requests.len());
        for request in requests {
            payloads.push(self.search_products(request, observer).await?);
        }
        Ok(payloads)
    }
}
