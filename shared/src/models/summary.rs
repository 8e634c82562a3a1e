//! Denormalized sales-summary read model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted sales-summary row
///
/// Keyed by `(source_type, source_id)`; the table carries a UNIQUE
/// constraint on that pair, which is the only hard consistency constraint
/// in the system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalesSummaryRecord {
    pub id: Uuid,
    pub source_type: String,
    pub source_id: Uuid,
    pub inventory_number: Option<String>,
    pub product_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub purchase_source: Option<String>,
    pub sale_destination: Option<String>,
    pub sale_price: i64,
    pub commission: i64,
    pub shipping_cost: i64,
    pub other_cost: i64,
    pub photography_fee: i64,
    pub purchase_price: i64,
    pub purchase_cost: i64,
    pub deposit_amount: i64,
    pub profit: i64,
    pub profit_rate: i64,
    pub purchase_date: Option<String>,
    pub listing_date: Option<String>,
    pub sale_date: Option<String>,
    pub turnover_days: Option<i32>,
    pub memo: Option<String>,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl SalesSummaryRecord {
    pub fn key(&self) -> String {
        format!("{}:{}", self.source_type, self.source_id)
    }
}

/// A summary row computed by the reconciler but not yet persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSummaryRecord {
    pub source_type: String,
    pub source_id: Uuid,
    pub inventory_number: Option<String>,
    pub product_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub purchase_source: Option<String>,
    pub sale_destination: Option<String>,
    pub sale_price: i64,
    pub commission: i64,
    pub shipping_cost: i64,
    pub other_cost: i64,
    pub photography_fee: i64,
    pub purchase_price: i64,
    pub purchase_cost: i64,
    pub deposit_amount: i64,
    pub profit: i64,
    pub profit_rate: i64,
    pub purchase_date: Option<String>,
    pub listing_date: Option<String>,
    pub sale_date: Option<String>,
    pub turnover_days: Option<i32>,
    pub memo: Option<String>,
    pub quantity: i64,
}

impl NewSummaryRecord {
    pub fn key(&self) -> String {
        format!("{}:{}", self.source_type, self.source_id)
    }
}
