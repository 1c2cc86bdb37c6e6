//! API response fixtures

use serde_json::{Value, json};

/// Path of the product search submission endpoint
pub const SEARCH_POST: &str = "/merchant/google/products/task_post";
/// Path of the product info submission endpoint
pub const INFO_POST: &str = "/merchant/google/product_info/task_post";

/// Status path for a search task
pub fn search_get(id: &str) -> String {
    format!("/merchant/google/products/task_get/advanced/{id}")
}

/// Status path for a product info task
pub fn info_get(id: &str) -> String {
    format!("/merchant/google/product_info/task_get/advanced/{id}")
}

/// Submission response announcing a created task
pub fn task_created(id: &str) -> Value {
    json!({
        "version": "0.1.20240801",
        "status_code": 20100,
        "status_message": "Task Created.",
        "tasks_count": 1,
        "tasks": [{"id": id, "status_code": 20100, "status_message": "Task Created."}]
    })
}

/// Status response for a task still in the queue
pub fn task_pending() -> Value {
    json!({"status_code": 20000, "tasks": [{"result": null}]})
}

/// Status response with a small completed search result
pub fn search_ready() -> Value {
    json!({
        "status_code": 20000,
        "tasks": [{"result": [{"items": [
            {"type": "product", "rank_absolute": 1, "title": "X", "price": 9.99}
        ]}]}]
    })
}

/// Completed search with a realistic mix of item shapes
pub fn search_ready_mixed() -> Value {
    json!({
        "status_code": 20000,
        "status_message": "Ok.",
        "tasks": [{
            "id": "mixed-1",
            "status_code": 20000,
            "result": [{
                "keyword": "electric kettle",
                "items": [
                    {
                        "type": "google_shopping_serp",
                        "rank_absolute": 2,
                        "title": "Russell Hobbs Electric Kettle 1.7 Litre Rapid Boil, Stainless Steel, Colour Silver",
                        "domain": "https://www.argos.co.uk/product/123",
                        "price": {"current": 24.99, "currency": "GBP"},
                        "product_rating": {"value": 4.7},
                        "reviews_count": 532,
                        "product_id": "111",
                        "url": "https://www.argos.co.uk/product/123",
                        "product_images": ["a.jpg", "b.jpg", "c.jpg"],
                        "description": "Rapid boil kettle"
                    },
                    {
                        "type": "google_shopping_product",
                        "rank_absolute": 1,
                        "title": "Kettle",
                        "seller": "amazon.co.uk",
                        "price": 19.5,
                        "currency": "GBP"
                    },
                    {"type": "related_searches", "items": ["kettle white"]},
                    {
                        "type": "shopping_product",
                        "rank_absolute": 3,
                        "title": "Cordless Kettle",
                        "shop_name": "Amazon.co.uk",
                        "price": {"current": 30.0, "currency": "GBP"}
                    }
                ]
            }]
        }]
    })
}
