mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{response_json, TestApp};

#[tokio::test]
async fn item_lifecycle() {
    let app = TestApp::new().await;

    // First POST creates the item with the given quantity
    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({"name": "Sticker", "quantity": 10})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["name"], "Sticker");
    assert_eq!(body["quantity"], 10);
    let sticker_id = body["id"].as_i64().expect("item id");

    // A second POST for the same name adds the delta to existing stock
    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({"name": "Sticker", "quantity": 5})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["id"].as_i64(), Some(sticker_id));
    assert_eq!(body["quantity"], 15);

    // Set an absolute quantity through the id-addressed route
    let uri = format!("/api/v1/items/{}", sticker_id);
    let response = app
        .request(Method::PUT, &uri, Some(json!({"quantity": 2})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["name"], "Sticker");
    assert_eq!(body["quantity"], 2);

    // Delete through the id-addressed route
    let response = app.request(Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Item deleted successfully");

    let response = app.request(Method::GET, "/api/v1/items", None).await;
    let body = response_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn list_is_sorted_by_name() {
    let app = TestApp::new().await;

    for (name, quantity) in [("Tote Bag", 3), ("Badge", 7), ("Sticker", 10)] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/items",
                Some(json!({"name": name, "quantity": quantity})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.request(Method::GET, "/api/v1/items", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    let names: Vec<&str> = body
        .as_array()
        .expect("item array")
        .iter()
        .map(|item| item["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["Badge", "Sticker", "Tote Bag"]);
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::PUT,
            "/api/v1/items/9999",
            Some(json!({"quantity": 4})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.request(Method::DELETE, "/api/v1/items/9999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejects_invalid_input() {
    let app = TestApp::new().await;

    // Empty and whitespace-only names never reach the store
    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({"name": "", "quantity": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Validation error: Item name is required");

    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({"name": "   ", "quantity": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Negative quantities are rejected at the boundary for add and update
    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({"name": "Sticker", "quantity": -1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({"name": "Sticker", "quantity": 3})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let id = body["id"].as_i64().expect("item id");

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/items/{}", id),
            Some(json!({"quantity": -5})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn trims_names_before_storing() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({"name": "  Lanyard  ", "quantity": 4})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["name"], "Lanyard");

    // The trimmed name is the business key
    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({"name": "Lanyard", "quantity": 1})),
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["quantity"], 5);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
}
