//! Manual sale HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::services::manual::{CreateManualSaleInput, ManualSaleService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CostRecoveredInput {
    pub cost_recovered: bool,
}

pub async fn list_manual_sales(State(state): State<AppState>) -> impl IntoResponse {
    let service = ManualSaleService::new(state.db.clone());

    match service.list_sales().await {
        Ok(sales) => (StatusCode::OK, Json(serde_json::json!({ "sales": sales }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_manual_sale(
    State(state): State<AppState>,
    Json(input): Json<CreateManualSaleInput>,
) -> impl IntoResponse {
    let service = ManualSaleService::new(state.db.clone());

    match service.create_sale(input).await {
        Ok(sale) => (StatusCode::CREATED, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Toggle the cost-recovered flag on a manual sale
pub async fn set_cost_recovered(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<CostRecoveredInput>,
) -> impl IntoResponse {
    let service = ManualSaleService::new(state.db.clone());

    match service.set_cost_recovered(sale_id, input.cost_recovered).await {
        Ok(sale) => (StatusCode::OK, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}
