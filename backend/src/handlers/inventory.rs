//! Inventory HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::services::inventory::{CreateItemInput, InventoryService, MarkSoldInput, UpdateItemInput};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub status: Option<String>,
}

/// List inventory items, optionally filtered by status label
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> impl IntoResponse {
    let service = InventoryService::new(state.db.clone());

    match service.list_items(query.status.as_deref()).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = InventoryService::new(state.db.clone());

    match service.get_item(item_id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a purchased item
pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<CreateItemInput>,
) -> impl IntoResponse {
    let service = InventoryService::new(state.db.clone());

    match service.create_item(input).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(input): Json<UpdateItemInput>,
) -> impl IntoResponse {
    let service = InventoryService::new(state.db.clone());

    match service.update_item(item_id, input).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a sale for an item
pub async fn mark_sold(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(input): Json<MarkSoldInput>,
) -> impl IntoResponse {
    let service = InventoryService::new(state.db.clone());

    match service.mark_sold(item_id, input).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Move a sold item into the return flow
pub async fn mark_returned(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = InventoryService::new(state.db.clone());

    match service.mark_returned(item_id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}
