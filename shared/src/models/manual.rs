//! Manually entered sales

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A sale entered free-form outside the structured inventory flow
///
/// `profit` and `profit_rate` are optional operator overrides; when absent
/// they are derived from the economic fields. `cost_recovered` marks a row
/// whose cost was already expensed elsewhere, so the row must not
/// contribute profit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ManualSale {
    pub id: Uuid,
    pub inventory_number: Option<String>,
    pub product_name: Option<String>,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub purchase_source: Option<String>,
    pub sale_destination: Option<String>,
    pub sale_price: Option<i64>,
    pub commission: Option<i64>,
    pub shipping_cost: Option<i64>,
    pub other_cost: Option<i64>,
    pub photography_fee: Option<i64>,
    pub purchase_total: Option<i64>,
    pub profit: Option<i64>,
    pub profit_rate: Option<i64>,
    pub purchase_date: Option<String>,
    pub listing_date: Option<String>,
    pub sale_date: Option<String>,
    pub memo: Option<String>,
    pub cost_recovered: Option<bool>,
    pub created_at: DateTime<Utc>,
}
