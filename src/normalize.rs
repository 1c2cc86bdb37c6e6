//! Result normalizer
//!
//! Flattens the items of a completed search payload into [`ProductRow`]s.
//! The API is loose about field names across item types, so every column is
//! read from the first of several candidate keys. Missing data is a `None`,
//! never an error.

use crate::types::TaskPayload;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Item `type` values that describe a shopping listing
pub const PRODUCT_ITEM_TYPES: &[&str] = &[
    "google_shopping_product",
    "shopping_product",
    "product",
    "google_shopping_serp",
];

/// One shopping listing
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    /// Absolute rank on the results page
    pub position: Option<i64>,
    /// Listing title
    pub title: Option<String>,
    /// Seller domain, without scheme or path
    pub domain: Option<String>,
    /// Current price
    pub price: Option<f64>,
    /// Price currency
    pub currency: Option<String>,
    /// Average rating
    pub rating: Option<f64>,
    /// Number of reviews or votes
    pub reviews: Option<i64>,
    /// Product identifier usable for a product info task
    pub product_id: Option<String>,
    /// Listing URL
    pub url: Option<String>,
    /// Number of product images
    pub images_count: usize,
    /// Whether the listing carries a description
    pub has_description: bool,
    /// Whether the listing carries highlights or features
    pub has_highlights: bool,
}

/// Extract listing rows from a completed search payload
///
/// Reads `tasks[0].result[0].items`; a missing level yields no rows. Items of
/// other types are skipped. Rows come back ordered by position, with
/// unranked rows last in their original order.
pub fn parse_shopping_results(payload: &TaskPayload) -> Vec<ProductRow> {
    let mut rows: Vec<ProductRow> = payload
        .items()
        .iter()
        .filter(|item| is_product_item(item))
        .map(parse_item)
        .collect();

    rows.sort_by_key(|row| (row.position.is_none(), row.position));
    rows
}

fn is_product_item(item: &Value) -> bool {
    item.get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| PRODUCT_ITEM_TYPES.contains(&t))
}

/// Build a row from one raw item
pub fn parse_item(item: &Value) -> ProductRow {
    let (price, currency) = extract_price(item);

    ProductRow {
        position: item.get("rank_absolute").and_then(Value::as_i64),
        title: first_str(item, &["title"]),
        domain: first_str(item, &["domain", "seller", "shop_name"]).map(|d| clean_domain(&d)),
        price,
        currency,
        rating: item
            .get("product_rating")
            .and_then(|r| r.get("value"))
            .and_then(Value::as_f64),
        reviews: first_present(item, &["votes_count", "reviews_count"]).and_then(Value::as_i64),
        product_id: first_present(item, &["product_id", "data_docid", "gid"]).and_then(as_text),
        url: first_str(item, &["url", "shopping_url"]),
        images_count: first_present(item, &["product_images", "images"])
            .and_then(Value::as_array)
            .map_or(0, Vec::len),
        has_description: first_present(item, &["description", "product_description"]).is_some(),
        has_highlights: first_present(item, &["product_highlights", "highlights", "features"])
            .is_some(),
    }
}

/// Price and currency of an item
///
/// A `price` object carries its own `current`/`currency`; a bare number uses
/// the item-level `currency`.
fn extract_price(item: &Value) -> (Option<f64>, Option<String>) {
    let item_currency = || item.get("currency").and_then(Value::as_str).map(str::to_string);

    match item.get("price") {
        Some(Value::Object(price)) => (
            price.get("current").and_then(Value::as_f64),
            price.get("currency").and_then(Value::as_str).map(str::to_string),
        ),
        Some(Value::Number(n)) => (n.as_f64(), item_currency()),
        _ => (None, item_currency()),
    }
}

/// Strip the scheme and anything after the host
pub fn clean_domain(raw: &str) -> String {
    static SCHEME: OnceLock<Option<Regex>> = OnceLock::new();
    let without_scheme = match SCHEME.get_or_init(|| compile_pattern(r"^https?://")) {
        Some(scheme) => scheme.replace(raw, ""),
        None => raw.into(),
    };
    without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Compile a pattern, logging and skipping it when invalid
fn compile_pattern(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|e| {
            tracing::warn!("Invalid normalization pattern '{}': {}", pattern, e);
        })
        .ok()
}

/// First key whose value is present and truthy
fn first_present<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find(|value| is_truthy(value))
}

fn first_str(item: &Value, keys: &[&str]) -> Option<String> {
    first_present(item, keys).and_then(as_text)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
