//! Single-item inventory records
//!
//! One row per purchased item. Items are created at purchase entry and
//! mutated as they move through listing, sale, and returns; they are never
//! deleted. All money columns are integral yen. Date columns are free text
//! and must go through `dates::parse_business_date` before arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single purchased item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: Uuid,
    pub inventory_number: Option<String>,
    pub product_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub saved_image_url: Option<String>,
    pub purchase_price: Option<i64>,
    pub purchase_total: Option<i64>,
    pub sale_price: Option<i64>,
    pub commission: Option<i64>,
    pub shipping_cost: Option<i64>,
    pub other_cost: Option<i64>,
    pub photography_fee: Option<i64>,
    pub deposit_amount: Option<i64>,
    pub status: String,
    pub purchase_date: Option<String>,
    pub listing_date: Option<String>,
    pub sale_date: Option<String>,
    pub purchase_source: Option<String>,
    pub sale_destination: Option<String>,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Preferred display image: the archived copy wins over the source URL
    pub fn display_image_url(&self) -> Option<&str> {
        self.saved_image_url
            .as_deref()
            .or(self.image_url.as_deref())
    }
}
