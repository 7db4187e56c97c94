mod common;

use axum::http::{Method, StatusCode};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use swagtrackr_api::entities::checkout;

use common::{response_json, TestApp};

async fn checkout_row_count(app: &TestApp) -> u64 {
    checkout::Entity::find()
        .count(app.state.db.as_ref())
        .await
        .expect("count checkout rows")
}

#[tokio::test]
async fn checkout_flow() {
    let app = TestApp::new().await;

    // Stock up
    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({"name": "Sticker", "quantity": 10})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let sticker_id = body["id"].as_i64().expect("item id");

    // Successful checkout decrements and reports what left stock
    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(json!({"name": "Sticker", "amount": 3, "recipient": "alice"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["id"].as_i64(), Some(sticker_id));
    assert_eq!(body["quantity"], 7);
    assert_eq!(body["checked_out"], 3);

    // Exactly one audit row was appended
    assert_eq!(checkout_row_count(&app).await, 1);
    let record = checkout::Entity::find()
        .one(app.state.db.as_ref())
        .await
        .expect("load checkout row")
        .expect("one checkout row");
    assert_eq!(record.amount, 3);
    assert_eq!(record.recipient.as_deref(), Some("alice"));

    // Over-draw fails with insufficient stock and changes nothing
    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(json!({"name": "Sticker", "amount": 100})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("Insufficient stock"));
    assert_eq!(checkout_row_count(&app).await, 1);

    let response = app.request(Method::GET, "/api/v1/items", None).await;
    let body = response_json(response).await;
    assert_eq!(body[0]["quantity"], 7);

    // Deleting the item cascades to its checkout records
    let response = app
        .request(Method::DELETE, &format!("/api/v1/items/{}", sticker_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(checkout_row_count(&app).await, 0);
}

#[tokio::test]
async fn checkout_failures_are_client_errors_with_distinct_messages() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({"name": "Poster", "quantity": 2})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Non-positive amounts are rejected at the boundary, before the store
    for amount in [0, -2] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/checkout",
                Some(json!({"name": "Poster", "amount": amount})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert!(body["message"]
            .as_str()
            .expect("message")
            .contains("amount must be positive"));
    }

    // Unknown item is a client error on this route, not a 404
    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(json!({"name": "Ghost", "amount": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"].as_str().expect("message").contains("not found"));

    // Missing name never reaches the store
    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(json!({"name": "  ", "amount": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Validation error: Item name is required");

    // Nothing was written along the way
    assert_eq!(checkout_row_count(&app).await, 0);
}

#[tokio::test]
async fn checkout_recipient_is_optional_and_trimmed() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({"name": "Tee", "quantity": 5})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Blank recipient is stored as absent
    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(json!({"name": "Tee", "amount": 1, "recipient": "   "})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let record = checkout::Entity::find()
        .one(app.state.db.as_ref())
        .await
        .expect("load checkout row")
        .expect("one checkout row");
    assert_eq!(record.recipient, None);
}
