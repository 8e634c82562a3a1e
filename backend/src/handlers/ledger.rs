//! Regulatory ledger HTTP handlers

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::services::ledger::{LedgerPeriod, LedgerService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl LedgerQuery {
    fn period(&self) -> LedgerPeriod {
        LedgerPeriod {
            year: self.year,
            month: self.month,
        }
    }
}

/// View the assembled ledger rows for a period
pub async fn view_ledger(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> impl IntoResponse {
    let service = LedgerService::new(state.db.clone());

    match service.ledger_rows(query.period()).await {
        Ok(rows) => (StatusCode::OK, Json(serde_json::json!({ "rows": rows }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Download the ledger for a period as a CSV attachment
pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> impl IntoResponse {
    let service = LedgerService::new(state.db.clone());

    match service.export_csv(query.period()).await {
        Ok(csv) => {
            let filename = match (query.year, query.month) {
                (Some(y), Some(m)) => format!("古物台帳_{y}年{m}月.csv"),
                (Some(y), None) => format!("古物台帳_{y}年.csv"),
                _ => "古物台帳.csv".to_string(),
            };
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        // RFC 5987 encoding for the non-ASCII filename
                        format!("attachment; filename*=UTF-8''{}", urlencoding::encode(&filename)),
                    ),
                ],
                csv,
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}
