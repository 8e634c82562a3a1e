//! Inventory service for single-item purchase and sale tracking
//!
//! Items are created at purchase entry and move through listing, sale, and
//! returns by status changes. Rows are never deleted; a return flips the
//! item back into the refund flow instead.

use serde::Deserialize;
use shared::models::InventoryItem;
use shared::types::{InventoryStatus, RETURNED_LABEL};
use shared::validation;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const ITEM_COLUMNS: &str = "id, inventory_number, product_name, brand_name, category, image_url, \
     saved_image_url, purchase_price, purchase_total, sale_price, commission, shipping_cost, \
     other_cost, photography_fee, deposit_amount, status, purchase_date, listing_date, \
     sale_date, purchase_source, sale_destination, memo, created_at";

/// Inventory service owning the inventory table
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Input for registering a purchased item
#[derive(Debug, Deserialize)]
pub struct CreateItemInput {
    pub inventory_number: Option<String>,
    pub product_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub purchase_price: Option<i64>,
    pub purchase_total: Option<i64>,
    pub other_cost: Option<i64>,
    pub purchase_date: Option<String>,
    pub purchase_source: Option<String>,
    pub memo: Option<String>,
}

/// Partial update of a stored item
#[derive(Debug, Deserialize)]
pub struct UpdateItemInput {
    pub product_name: Option<String>,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub purchase_price: Option<i64>,
    pub purchase_total: Option<i64>,
    pub other_cost: Option<i64>,
    pub listing_date: Option<String>,
    pub memo: Option<String>,
}

/// Sale details recorded when an item is sold
#[derive(Debug, Deserialize)]
pub struct MarkSoldInput {
    pub sale_price: i64,
    pub commission: Option<i64>,
    pub shipping_cost: Option<i64>,
    pub photography_fee: Option<i64>,
    pub deposit_amount: Option<i64>,
    pub sale_date: String,
    pub sale_destination: String,
}

impl InventoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a purchased item
    pub async fn create_item(&self, input: CreateItemInput) -> AppResult<InventoryItem> {
        if input.product_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "product_name".to_string(),
                message: "Product name is required".to_string(),
                message_ja: "商品名は必須です".to_string(),
            });
        }
        validate_amounts(&[
            ("purchase_price", input.purchase_price),
            ("purchase_total", input.purchase_total),
            ("other_cost", input.other_cost),
        ])?;
        validate_date(&input.purchase_date, "purchase_date")?;

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            INSERT INTO inventory (
                inventory_number, product_name, brand_name, category, image_url,
                purchase_price, purchase_total, other_cost, status,
                purchase_date, purchase_source, memo
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(&input.inventory_number)
        .bind(&input.product_name)
        .bind(&input.brand_name)
        .bind(&input.category)
        .bind(&input.image_url)
        .bind(input.purchase_price)
        .bind(input.purchase_total)
        .bind(input.other_cost)
        .bind(InventoryStatus::InStock.label())
        .bind(&input.purchase_date)
        .bind(&input.purchase_source)
        .bind(&input.memo)
        .fetch_one(&self.db)
        .await?;

        Ok(item)
    }

    /// List items, newest first, optionally filtered by status label
    pub async fn list_items(&self, status: Option<&str>) -> AppResult<Vec<InventoryItem>> {
        let items = match status {
            Some(status) => {
                sqlx::query_as::<_, InventoryItem>(&format!(
                    "SELECT {ITEM_COLUMNS} FROM inventory WHERE status = $1 ORDER BY created_at DESC"
                ))
                .bind(status)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, InventoryItem>(&format!(
                    "SELECT {ITEM_COLUMNS} FROM inventory ORDER BY created_at DESC"
                ))
                .fetch_all(&self.db)
                .await?
            }
        };
        Ok(items)
    }

    pub async fn get_item(&self, item_id: Uuid) -> AppResult<InventoryItem> {
        sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE id = $1"
        ))
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    /// Apply a partial update, keeping stored values for absent fields
    pub async fn update_item(
        &self,
        item_id: Uuid,
        input: UpdateItemInput,
    ) -> AppResult<InventoryItem> {
        let existing = self.get_item(item_id).await?;

        validate_amounts(&[
            ("purchase_price", input.purchase_price),
            ("purchase_total", input.purchase_total),
            ("other_cost", input.other_cost),
        ])?;
        validate_date(&input.listing_date, "listing_date")?;

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory
            SET product_name = $1, brand_name = $2, category = $3, purchase_price = $4,
                purchase_total = $5, other_cost = $6, listing_date = $7, memo = $8
            WHERE id = $9
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(input.product_name.unwrap_or(existing.product_name))
        .bind(input.brand_name.or(existing.brand_name))
        .bind(input.category.or(existing.category))
        .bind(input.purchase_price.or(existing.purchase_price))
        .bind(input.purchase_total.or(existing.purchase_total))
        .bind(input.other_cost.or(existing.other_cost))
        .bind(input.listing_date.or(existing.listing_date))
        .bind(input.memo.or(existing.memo))
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        Ok(item)
    }

    /// Record a sale, flipping the item to sold status
    pub async fn mark_sold(&self, item_id: Uuid, input: MarkSoldInput) -> AppResult<InventoryItem> {
        let existing = self.get_item(item_id).await?;
        if existing.status == InventoryStatus::Sold.label() {
            return Err(AppError::InvalidStateTransition(
                "Item is already sold".to_string(),
            ));
        }

        validate_amounts(&[
            ("sale_price", Some(input.sale_price)),
            ("commission", input.commission),
            ("shipping_cost", input.shipping_cost),
            ("photography_fee", input.photography_fee),
            ("deposit_amount", input.deposit_amount),
        ])?;
        if let Err(msg) = validation::validate_date_text(&input.sale_date) {
            return Err(AppError::Validation {
                field: "sale_date".to_string(),
                message: msg.to_string(),
                message_ja: "売却日はYYYY-MM-DD形式で入力してください".to_string(),
            });
        }
        if input.sale_destination.trim().is_empty() {
            return Err(AppError::Validation {
                field: "sale_destination".to_string(),
                message: "Sale destination is required".to_string(),
                message_ja: "販売先は必須です".to_string(),
            });
        }

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory
            SET status = $1, sale_price = $2, commission = $3, shipping_cost = $4,
                photography_fee = $5, deposit_amount = $6, sale_date = $7, sale_destination = $8
            WHERE id = $9
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(InventoryStatus::Sold.label())
        .bind(input.sale_price)
        .bind(input.commission.unwrap_or(0))
        .bind(input.shipping_cost.unwrap_or(0))
        .bind(input.photography_fee)
        .bind(input.deposit_amount)
        .bind(&input.sale_date)
        .bind(&input.sale_destination)
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        Ok(item)
    }

    /// Flag a sold item as returned: the row keeps its sale economics for
    /// audit but drops out of summary eligibility and enters the refund flow
    pub async fn mark_returned(&self, item_id: Uuid) -> AppResult<InventoryItem> {
        let existing = self.get_item(item_id).await?;
        if existing.status != InventoryStatus::Sold.label() {
            return Err(AppError::InvalidStateTransition(
                "Only sold items can be returned".to_string(),
            ));
        }

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory
            SET status = $1, sale_destination = $2
            WHERE id = $3
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(InventoryStatus::RefundPending.label())
        .bind(RETURNED_LABEL)
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        Ok(item)
    }
}

fn validate_amounts(fields: &[(&str, Option<i64>)]) -> AppResult<()> {
    for (field, value) in fields {
        if validation::validate_optional_amount(*value).is_err() {
            return Err(AppError::Validation {
                field: field.to_string(),
                message: format!("{} must not be negative", field),
                message_ja: format!("{}は0以上で入力してください", field),
            });
        }
    }
    Ok(())
}

fn validate_date(value: &Option<String>, field: &str) -> AppResult<()> {
    if validation::validate_optional_date_text(value.as_deref()).is_err() {
        return Err(AppError::Validation {
            field: field.to_string(),
            message: format!("{} must be YYYY-MM-DD", field),
            message_ja: format!("{}はYYYY-MM-DD形式で入力してください", field),
        });
    }
    Ok(())
}
