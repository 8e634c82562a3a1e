//! Monthly report HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Datelike;
use serde::Deserialize;

use crate::services::ReportService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub year: Option<i32>,
}

/// Monthly totals and goal achievement for a year (defaults to the
/// current year)
pub async fn monthly_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let service = ReportService::new(state.db.clone());
    let year = query.year.unwrap_or_else(|| chrono::Utc::now().year());

    match service.monthly_report(year).await {
        Ok(months) => (
            StatusCode::OK,
            Json(serde_json::json!({ "year": year, "months": months })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
