//! Sales-summary HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::services::SummaryService;
use crate::AppState;

pub async fn list_summary(State(state): State<AppState>) -> impl IntoResponse {
    let service = SummaryService::new(state.db.clone());

    match service.list_summary().await {
        Ok(records) => (
            StatusCode::OK,
            Json(serde_json::json!({ "records": records })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Run one reconciliation pass and report the counts
pub async fn reconcile(State(state): State<AppState>) -> impl IntoResponse {
    let service = SummaryService::new(state.db.clone());

    match service.reconcile().await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => e.into_response(),
    }
}
