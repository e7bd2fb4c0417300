//! Handlers for the `/characters` resource.
//!
//! Each handler goes straight to the record store; the store reloads the
//! backing file on every call.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use friends_core::record::{JsonFields, Record};
use friends_core::types::RecordId;

use crate::error::{AppError, AppResult};
use crate::response::MessageResponse;
use crate::state::AppState;

/// GET /characters
///
/// Responds with `{"message": "No data available"}` when the table is empty.
pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let records = state.store.list().await?;
    if records.is_empty() {
        return Ok(Json(MessageResponse::new("No data available")).into_response());
    }
    Ok(Json(records).into_response())
}

/// GET /characters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<Json<Record>> {
    let record = state.store.get(id).await?;
    Ok(Json(record))
}

/// POST /characters
///
/// Columns missing from the body are stored empty; unknown keys and `id`
/// are ignored whatever their value.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<JsonFields>,
) -> AppResult<(StatusCode, Json<Record>)> {
    if body.is_empty() {
        return Err(AppError::BadRequest(
            "request body must contain at least one field".into(),
        ));
    }
    let record = state.store.create(&body).await?;
    tracing::info!(id = ?record.id(), "Character created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /characters/{id}
///
/// Partial update: only the columns named in the body change.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(body): Json<JsonFields>,
) -> AppResult<Json<Record>> {
    let record = state.store.update(id, &body).await?;
    Ok(Json(record))
}

/// DELETE /characters/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<Json<MessageResponse>> {
    state.store.delete(id).await?;
    tracing::info!(id, "Character deleted");
    Ok(Json(MessageResponse::new("Item deleted successfully.")))
}
