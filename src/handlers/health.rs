use crate::{db, errors::ServiceError, AppState};
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

/// Liveness plus a database ping.
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    db::check_connection(&state.db).await?;

    Ok(Json(json!({ "status": "ok" })))
}
