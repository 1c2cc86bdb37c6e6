//! Core types for shopping-serp
//!
//! Request records, the opaque task handle, and [`TaskPayload`], a thin wrapper
//! over the raw JSON the API returns. The payload keeps the response verbatim
//! and exposes optional accessors for the few levels the client and the
//! normalizer care about; a missing or mistyped level reads as absent rather
//! than failing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status code for a fully successful call
pub const STATUS_OK: i64 = 20000;
/// Status code for a task that was created and is pending
pub const STATUS_TASK_CREATED: i64 = 20100;
/// Status code the API uses for partially accepted batches
pub const STATUS_PARTIAL: i64 = 40500;

/// Status codes accepted on task submission
pub const POST_ACCEPTED: &[i64] = &[STATUS_OK, STATUS_TASK_CREATED, STATUS_PARTIAL];
/// Status codes accepted on task status checks
pub const GET_ACCEPTED: &[i64] = &[STATUS_OK];

/// Smallest depth the search endpoint is asked for
pub const MIN_DEPTH: u32 = 10;
/// Largest depth the search endpoint is asked for
pub const MAX_DEPTH: u32 = 100;

/// Clamp a requested search depth into [`MIN_DEPTH`]..=[`MAX_DEPTH`]
pub fn clamp_depth(depth: u32) -> u32 {
    depth.clamp(MIN_DEPTH, MAX_DEPTH)
}

/// Location code for the United Kingdom, the default market
pub const DEFAULT_LOCATION_CODE: i64 = 2826;
/// Default language code
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// Which family of merchant endpoints a task belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Keyword search over shopping listings
    ProductSearch,
    /// Detail lookup for one product
    ProductInfo,
}

impl TaskKind {
    fn endpoint(&self) -> &'static str {
        match self {
            TaskKind::ProductSearch => "/merchant/google/products",
            TaskKind::ProductInfo => "/merchant/google/product_info",
        }
    }

    /// Path used to submit a task of this kind
    pub fn post_path(&self) -> String {
        format!("{}/task_post", self.endpoint())
    }

    /// Path used to fetch the advanced result of a task of this kind
    pub fn get_path(&self, handle: &TaskHandle) -> String {
        format!(
            "{}/task_get/advanced/{}",
            self.endpoint(),
            urlencoding::encode(handle.as_str())
        )
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::ProductSearch => write!(f, "product_search"),
            TaskKind::ProductInfo => write!(f, "product_info"),
        }
    }
}

/// Opaque identifier of a submitted task
///
/// Only ever used as a lookup key for polling.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    /// Wrap an identifier returned by the API
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keyword search request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Search keyword
    pub keyword: String,
    /// Geographic location code (default: 2826, United Kingdom)
    #[serde(default = "default_location_code")]
    pub location_code: i64,
    /// Language code (default: "en")
    #[serde(default = "default_language_code")]
    pub language_code: String,
    /// Maximum number of result items, clamped to 10..=100 on submission (default: 100)
    #[serde(default = "default_depth")]
    pub depth: u32,
}

impl SearchRequest {
    /// Search for `keyword` with the default market and depth
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            location_code: DEFAULT_LOCATION_CODE,
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            depth: MAX_DEPTH,
        }
    }
}

/// Product detail request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductInfoRequest {
    /// Product identifier as reported by a search result
    pub product_id: String,
    /// Geographic location code (default: 2826, United Kingdom)
    #[serde(default = "default_location_code")]
    pub location_code: i64,
    /// Language code (default: "en")
    #[serde(default = "default_language_code")]
    pub language_code: String,
}

impl ProductInfoRequest {
    /// Look up `product_id` in the default market
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            location_code: DEFAULT_LOCATION_CODE,
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
        }
    }
}

/// A task to submit, one of the two request shapes
#[derive(Clone, Debug, PartialEq)]
pub enum TaskRequest {
    /// Keyword search
    Search(SearchRequest),
    /// Product detail lookup
    ProductInfo(ProductInfoRequest),
}

impl TaskRequest {
    /// Endpoint family for this request
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskRequest::Search(_) => TaskKind::ProductSearch,
            TaskRequest::ProductInfo(_) => TaskKind::ProductInfo,
        }
    }

    /// Build the one-element request list the API expects
    ///
    /// Search depth is clamped here.
    pub fn to_body(&self) -> Value {
        let task = match self {
            TaskRequest::Search(req) => serde_json::json!({
                "keyword": req.keyword,
                "location_code": req.location_code,
                "language_code": req.language_code,
                "depth": clamp_depth(req.depth),
            }),
            TaskRequest::ProductInfo(req) => serde_json::json!({
                "product_id": req.product_id,
                "location_code": req.location_code,
                "language_code": req.language_code,
            }),
        };
        Value::Array(vec![task])
    }
}

impl From<SearchRequest> for TaskRequest {
    fn from(req: SearchRequest) -> Self {
        TaskRequest::Search(req)
    }
}

impl From<ProductInfoRequest> for TaskRequest {
    fn from(req: ProductInfoRequest) -> Self {
        TaskRequest::ProductInfo(req)
    }
}

/// Raw API response with optional accessors
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskPayload(Value);

impl TaskPayload {
    /// Wrap a parsed JSON response
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the response exactly as received
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Take the response exactly as received
    pub fn into_raw(self) -> Value {
        self.0
    }

    /// Top-level `status_code`
    pub fn status_code(&self) -> Option<i64> {
        self.0.get("status_code").and_then(Value::as_i64)
    }

    /// Top-level `status_message`
    pub fn status_message(&self) -> Option<&str> {
        self.0.get("status_message").and_then(Value::as_str)
    }

    /// Entries of `tasks`; empty when absent
    pub fn tasks(&self) -> &[Value] {
        self.0
            .get("tasks")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First entry of `tasks`
    pub fn first_task(&self) -> Option<&Value> {
        self.tasks().first()
    }

    /// `tasks[0].id`
    pub fn task_id(&self) -> Option<&str> {
        self.first_task()?.get("id")?.as_str()
    }

    /// `tasks[0].status_code`, the per-task status
    pub fn task_status_code(&self) -> Option<i64> {
        self.first_task()?.get("status_code")?.as_i64()
    }

    /// `tasks[0].result`; empty when absent or null
    pub fn results(&self) -> &[Value] {
        self.first_task()
            .and_then(|task| task.get("result"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the first task carries a non-empty result
    ///
    /// This is the only completion signal the API gives.
    pub fn is_ready(&self) -> bool {
        match self.first_task().and_then(|task| task.get("result")) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::Array(results)) => !results.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// `tasks[0].result[0].items`; empty when any level is missing
    pub fn items(&self) -> &[Value] {
        self.results()
            .first()
            .and_then(|result| result.get("items"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl From<Value> for TaskPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn default_location_code() -> i64 {
    DEFAULT_LOCATION_CODE
}

fn default_language_code() -> String {
    DEFAULT_LANGUAGE_CODE.to_string()
}

fn default_depth() -> u32 {
    MAX_DEPTH
}
