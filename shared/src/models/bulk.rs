//! Bulk-lot purchases and their disposal sales

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A lot of goods bought as one group under a single paid total
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BulkPurchase {
    pub id: Uuid,
    pub genre: String,
    pub purchase_date: String,
    pub purchase_source: Option<String>,
    pub total_amount: i64,
    pub total_quantity: i64,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BulkPurchase {
    /// Per-unit acquisition cost, rounded to whole yen.
    /// Lots recorded without a quantity cost nothing per unit.
    pub fn unit_cost(&self) -> i64 {
        if self.total_quantity > 0 {
            (self.total_amount as f64 / self.total_quantity as f64).round() as i64
        } else {
            0
        }
    }
}

/// One disposal event against a bulk lot
///
/// `purchase_price` left null means cost-recovery mode: the disposal is
/// treated as a return of capital and reports zero profit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BulkSale {
    pub id: Uuid,
    pub bulk_purchase_id: Uuid,
    pub sale_date: String,
    pub sale_destination: Option<String>,
    pub quantity: i64,
    pub sale_amount: i64,
    pub commission: i64,
    pub shipping_cost: i64,
    pub other_cost: Option<i64>,
    pub photography_fee: Option<i64>,
    pub deposit_amount: Option<i64>,
    pub purchase_price: Option<i64>,
    pub product_name: Option<String>,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub listing_date: Option<String>,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BulkSale {
    /// Whether the seller recorded per-item product detail on this disposal
    pub fn has_product_details(&self) -> bool {
        self.product_name.is_some() || self.brand_name.is_some() || self.category.is_some()
    }
}
