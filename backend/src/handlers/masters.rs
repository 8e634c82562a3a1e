//! Master-data HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::masters::{GoalInput, MasterService, PlatformInput, SupplierInput};
use crate::AppState;

pub async fn list_platforms(State(state): State<AppState>) -> impl IntoResponse {
    let service = MasterService::new(state.db.clone());

    match service.list_platforms().await {
        Ok(platforms) => (
            StatusCode::OK,
            Json(serde_json::json!({ "platforms": platforms })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_platform(
    State(state): State<AppState>,
    Json(input): Json<PlatformInput>,
) -> impl IntoResponse {
    let service = MasterService::new(state.db.clone());

    match service.create_platform(input).await {
        Ok(platform) => (StatusCode::CREATED, Json(platform)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_platform(
    State(state): State<AppState>,
    Path(platform_id): Path<Uuid>,
    Json(input): Json<PlatformInput>,
) -> impl IntoResponse {
    let service = MasterService::new(state.db.clone());

    match service.update_platform(platform_id, input).await {
        Ok(platform) => (StatusCode::OK, Json(platform)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_suppliers(State(state): State<AppState>) -> impl IntoResponse {
    let service = MasterService::new(state.db.clone());

    match service.list_suppliers().await {
        Ok(suppliers) => (
            StatusCode::OK,
            Json(serde_json::json!({ "suppliers": suppliers })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<SupplierInput>,
) -> impl IntoResponse {
    let service = MasterService::new(state.db.clone());

    match service.create_supplier(input).await {
        Ok(supplier) => (StatusCode::CREATED, Json(supplier)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<SupplierInput>,
) -> impl IntoResponse {
    let service = MasterService::new(state.db.clone());

    match service.update_supplier(supplier_id, input).await {
        Ok(supplier) => (StatusCode::OK, Json(supplier)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_goals(State(state): State<AppState>) -> impl IntoResponse {
    let service = MasterService::new(state.db.clone());

    match service.list_goals().await {
        Ok(goals) => (StatusCode::OK, Json(serde_json::json!({ "goals": goals }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Set the goals for a month
pub async fn upsert_goal(
    State(state): State<AppState>,
    Json(input): Json<GoalInput>,
) -> impl IntoResponse {
    let service = MasterService::new(state.db.clone());

    match service.upsert_goal(input).await {
        Ok(goal) => (StatusCode::OK, Json(goal)).into_response(),
        Err(e) => e.into_response(),
    }
}
