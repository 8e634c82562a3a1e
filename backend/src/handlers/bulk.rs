//! Bulk purchase and sale HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::bulk::{BulkService, CreatePurchaseInput, RecordSaleInput, UpdateSaleInput};
use crate::AppState;

/// List lots with their draw-down state
pub async fn list_purchases(State(state): State<AppState>) -> impl IntoResponse {
    let service = BulkService::new(state.db.clone());

    match service.list_purchases().await {
        Ok(purchases) => (
            StatusCode::OK,
            Json(serde_json::json!({ "purchases": purchases })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BulkService::new(state.db.clone());

    match service.get_purchase(purchase_id).await {
        Ok(purchase) => (StatusCode::OK, Json(purchase)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a purchased lot
pub async fn create_purchase(
    State(state): State<AppState>,
    Json(input): Json<CreatePurchaseInput>,
) -> impl IntoResponse {
    let service = BulkService::new(state.db.clone());

    match service.create_purchase(input).await {
        Ok(purchase) => (StatusCode::CREATED, Json(purchase)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a sale out of a lot
pub async fn record_sale(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
    Json(input): Json<RecordSaleInput>,
) -> impl IntoResponse {
    let service = BulkService::new(state.db.clone());

    match service.record_sale(purchase_id, input).await {
        Ok(sale) => (StatusCode::CREATED, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Finalize or correct a recorded disposal sale
pub async fn update_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<UpdateSaleInput>,
) -> impl IntoResponse {
    let service = BulkService::new(state.db.clone());

    match service.update_sale(sale_id, input).await {
        Ok(sale) => (StatusCode::OK, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List sale events for one lot
pub async fn list_sales(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BulkService::new(state.db.clone());

    match service.list_sales(purchase_id).await {
        Ok(sales) => (StatusCode::OK, Json(serde_json::json!({ "sales": sales }))).into_response(),
        Err(e) => e.into_response(),
    }
}
