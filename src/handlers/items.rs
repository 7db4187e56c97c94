use crate::{
    entities::item,
    errors::{ErrorResponse, ServiceError},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Item as exposed over the API. Timestamps stay internal.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemResponse {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
}

impl From<item::Model> for ItemResponse {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            quantity: model.quantity,
        }
    }
}

/// Create-or-adjust request: `quantity` is a delta added to existing stock.
#[derive(Debug, Deserialize)]
pub struct UpsertItemRequest {
    pub name: String,
    #[serde(default)]
    pub quantity: i32,
}

/// Absolute quantity overwrite for the id-addressed update route.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub name: String,
    pub amount: i32,
    pub recipient: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    pub checked_out: i32,
}

/// Create the items router
pub fn items_router() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(upsert_item))
        .route("/items/:id", put(set_item_quantity).delete(delete_item))
        .route("/checkout", post(checkout))
}

/// List all items sorted by name
pub async fn list_items(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let items = state.inventory.list().await?;
    let items: Vec<ItemResponse> = items.into_iter().map(Into::into).collect();

    Ok(Json(items))
}

/// Add stock to an item, creating it on first sight
pub async fn upsert_item(
    State(state): State<AppState>,
    Json(payload): Json<UpsertItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ServiceError::ValidationError(
            "Item name is required".to_string(),
        ));
    }
    if payload.quantity < 0 {
        return Err(ServiceError::ValidationError(
            "Quantity must be non-negative".to_string(),
        ));
    }

    let (id, quantity) = state.inventory.create_or_adjust(name, payload.quantity).await?;

    Ok(Json(ItemResponse {
        id,
        name: name.to_string(),
        quantity,
    }))
}

/// Overwrite an item's quantity, addressed by numeric id
pub async fn set_item_quantity(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SetQuantityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if payload.quantity < 0 {
        return Err(ServiceError::ValidationError(
            "Quantity must be non-negative".to_string(),
        ));
    }

    let name = resolve_name_by_id(&state, id).await?;
    let (id, quantity) = state.inventory.set_quantity(&name, payload.quantity).await?;

    Ok(Json(ItemResponse { id, name, quantity }))
}

/// Delete an item, addressed by numeric id
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let name = resolve_name_by_id(&state, id).await?;

    if !state.inventory.delete(&name).await? {
        // The item vanished between the lookup and the delete.
        return Err(ServiceError::NotFound(format!("item {} not found", id)));
    }

    Ok(Json(json!({ "message": "Item deleted successfully" })))
}

/// Check out stock: decrement plus one audit record
pub async fn checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Response, ServiceError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ServiceError::ValidationError(
            "Item name is required".to_string(),
        ));
    }
    if payload.amount <= 0 {
        return Err(ServiceError::ValidationError(
            "Checkout amount must be positive".to_string(),
        ));
    }
    let recipient = payload
        .recipient
        .as_deref()
        .map(str::trim)
        .filter(|recipient| !recipient.is_empty())
        .map(str::to_string);

    match state.inventory.checkout(name, payload.amount, recipient).await {
        Ok((id, quantity)) => Ok(Json(CheckoutResponse {
            id,
            name: name.to_string(),
            quantity,
            checked_out: payload.amount,
        })
        .into_response()),
        // The checkout route reports every store-side refusal as a client
        // error, keeping the three causes distinguishable by message.
        Err(
            err @ (ServiceError::InvalidAmount(_)
            | ServiceError::NotFound(_)
            | ServiceError::InsufficientStock(_)),
        ) => Ok((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                StatusCode::BAD_REQUEST,
                err.response_message(),
            )),
        )
            .into_response()),
        Err(err) => Err(err),
    }
}

/// The id exists only for URL addressing; mutations are keyed by name, so
/// id-addressed routes resolve the name through a full listing first.
async fn resolve_name_by_id(state: &AppState, id: i32) -> Result<String, ServiceError> {
    let items = state.inventory.list().await?;

    items
        .into_iter()
        .find(|item| item.id == id)
        .map(|item| item.name)
        .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", id)))
}
