//! Bulk-lot bookkeeping: whole-lot purchases and per-lot sale events
//!
//! A bulk purchase is one row for the entire lot. Individual sales draw
//! down its remaining quantity, and the remainder is never allowed to go
//! negative.

use serde::{Deserialize, Serialize};
use shared::models::{BulkPurchase, BulkSale};
use shared::validation;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const PURCHASE_COLUMNS: &str =
    "id, genre, purchase_date, purchase_source, total_amount, total_quantity, memo, created_at";

const SALE_COLUMNS: &str = "id, bulk_purchase_id, sale_date, sale_destination, quantity, \
     sale_amount, commission, shipping_cost, other_cost, photography_fee, deposit_amount, \
     purchase_price, product_name, brand_name, category, image_url, listing_date, memo, created_at";

/// Bulk purchase and sale service
#[derive(Clone)]
pub struct BulkService {
    db: PgPool,
}

/// Input for registering a purchased lot
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseInput {
    pub genre: String,
    pub purchase_date: String,
    pub purchase_source: Option<String>,
    pub total_amount: i64,
    pub total_quantity: i64,
    pub memo: Option<String>,
}

/// Input for recording a sale out of a lot
#[derive(Debug, Deserialize)]
pub struct RecordSaleInput {
    pub sale_date: String,
    pub sale_destination: Option<String>,
    pub quantity: i64,
    pub sale_amount: i64,
    pub commission: Option<i64>,
    pub shipping_cost: Option<i64>,
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
}

/// Partial update of a recorded disposal sale, for finalizing destination,
/// amounts, attributed cost, and per-item product detail after the fact
#[derive(Debug, Deserialize)]
pub struct UpdateSaleInput {
    pub sale_date: Option<String>,
    pub sale_destination: Option<String>,
    pub quantity: Option<i64>,
    pub sale_amount: Option<i64>,
    pub commission: Option<i64>,
    pub shipping_cost: Option<i64>,
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
}

/// A lot together with its draw-down state
#[derive(Debug, Serialize)]
pub struct LotOverview {
    #[serde(flatten)]
    pub purchase: BulkPurchase,
    pub unit_cost: i64,
    pub quantity_sold: i64,
    pub quantity_remaining: i64,
}

impl BulkService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a purchased lot
    pub async fn create_purchase(&self, input: CreatePurchaseInput) -> AppResult<BulkPurchase> {
        if input.genre.trim().is_empty() {
            return Err(AppError::Validation {
                field: "genre".to_string(),
                message: "Genre is required".to_string(),
                message_ja: "ジャンルは必須です".to_string(),
            });
        }
        if validation::validate_date_text(&input.purchase_date).is_err() {
            return Err(AppError::Validation {
                field: "purchase_date".to_string(),
                message: "purchase_date must be YYYY-MM-DD".to_string(),
                message_ja: "仕入日はYYYY-MM-DD形式で入力してください".to_string(),
            });
        }
        if validation::validate_amount(input.total_amount).is_err() {
            return Err(AppError::Validation {
                field: "total_amount".to_string(),
                message: "total_amount must not be negative".to_string(),
                message_ja: "仕入総額は0以上で入力してください".to_string(),
            });
        }
        if validation::validate_quantity(input.total_quantity).is_err() {
            return Err(AppError::Validation {
                field: "total_quantity".to_string(),
                message: "total_quantity must be at least 1".to_string(),
                message_ja: "仕入点数は1以上で入力してください".to_string(),
            });
        }

        let purchase = sqlx::query_as::<_, BulkPurchase>(&format!(
            r#"
            INSERT INTO bulk_purchases (genre, purchase_date, purchase_source, total_amount,
                                        total_quantity, memo)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PURCHASE_COLUMNS}
            "#
        ))
        .bind(&input.genre)
        .bind(&input.purchase_date)
        .bind(&input.purchase_source)
        .bind(input.total_amount)
        .bind(input.total_quantity)
        .bind(&input.memo)
        .fetch_one(&self.db)
        .await?;

        Ok(purchase)
    }

    /// List lots, newest first, each with unit cost and draw-down counts
    pub async fn list_purchases(&self) -> AppResult<Vec<LotOverview>> {
        let purchases = sqlx::query_as::<_, BulkPurchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM bulk_purchases ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        let sold: Vec<(Uuid, Option<i64>)> = sqlx::query_as(
            "SELECT bulk_purchase_id, SUM(quantity) FROM bulk_sales GROUP BY bulk_purchase_id",
        )
        .fetch_all(&self.db)
        .await?;

        let overview = purchases
            .into_iter()
            .map(|purchase| {
                let quantity_sold = sold
                    .iter()
                    .find(|(id, _)| *id == purchase.id)
                    .and_then(|(_, n)| *n)
                    .unwrap_or(0);
                LotOverview {
                    unit_cost: purchase.unit_cost(),
                    quantity_sold,
                    quantity_remaining: purchase.total_quantity - quantity_sold,
                    purchase,
                }
            })
            .collect();

        Ok(overview)
    }

    pub async fn get_purchase(&self, purchase_id: Uuid) -> AppResult<BulkPurchase> {
        sqlx::query_as::<_, BulkPurchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM bulk_purchases WHERE id = $1"
        ))
        .bind(purchase_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bulk purchase".to_string()))
    }

    /// Record a sale out of a lot, rejecting quantities past the remainder
    pub async fn record_sale(
        &self,
        purchase_id: Uuid,
        input: RecordSaleInput,
    ) -> AppResult<BulkSale> {
        let purchase = self.get_purchase(purchase_id).await?;

        if validation::validate_date_text(&input.sale_date).is_err() {
            return Err(AppError::Validation {
                field: "sale_date".to_string(),
                message: "sale_date must be YYYY-MM-DD".to_string(),
                message_ja: "売却日はYYYY-MM-DD形式で入力してください".to_string(),
            });
        }
        if validation::validate_quantity(input.quantity).is_err() {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "quantity must be at least 1".to_string(),
                message_ja: "数量は1以上で入力してください".to_string(),
            });
        }
        if validation::validate_amount(input.sale_amount).is_err() {
            return Err(AppError::Validation {
                field: "sale_amount".to_string(),
                message: "sale_amount must not be negative".to_string(),
                message_ja: "売却額は0以上で入力してください".to_string(),
            });
        }

        let already_sold: Option<i64> =
            sqlx::query_scalar("SELECT SUM(quantity) FROM bulk_sales WHERE bulk_purchase_id = $1")
                .bind(purchase_id)
                .fetch_one(&self.db)
                .await?;
        check_lot_capacity(
            purchase.total_quantity,
            already_sold.unwrap_or(0),
            input.quantity,
        )?;

        let sale = sqlx::query_as::<_, BulkSale>(&format!(
            r#"
            INSERT INTO bulk_sales (bulk_purchase_id, sale_date, sale_destination, quantity,
                                    sale_amount, commission, shipping_cost, other_cost,
                                    photography_fee, deposit_amount, purchase_price, product_name,
                                    brand_name, category, image_url, listing_date, memo)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(purchase_id)
        .bind(&input.sale_date)
        .bind(&input.sale_destination)
        .bind(input.quantity)
        .bind(input.sale_amount)
        .bind(input.commission.unwrap_or(0))
        .bind(input.shipping_cost.unwrap_or(0))
        .bind(input.other_cost)
        .bind(input.photography_fee)
        .bind(input.deposit_amount)
        .bind(input.purchase_price)
        .bind(&input.product_name)
        .bind(&input.brand_name)
        .bind(&input.category)
        .bind(&input.image_url)
        .bind(&input.listing_date)
        .bind(&input.memo)
        .fetch_one(&self.db)
        .await?;

        Ok(sale)
    }

    /// List sale events for one lot, newest first
    pub async fn list_sales(&self, purchase_id: Uuid) -> AppResult<Vec<BulkSale>> {
        let sales = sqlx::query_as::<_, BulkSale>(&format!(
            "SELECT {SALE_COLUMNS} FROM bulk_sales WHERE bulk_purchase_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(purchase_id)
        .fetch_all(&self.db)
        .await?;
        Ok(sales)
    }

    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<BulkSale> {
        sqlx::query_as::<_, BulkSale>(&format!(
            "SELECT {SALE_COLUMNS} FROM bulk_sales WHERE id = $1"
        ))
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bulk sale".to_string()))
    }

    /// Finalize or correct a recorded disposal sale.
    ///
    /// A changed quantity is re-checked against the lot remainder, counting
    /// only the other disposals of the same lot.
    pub async fn update_sale(&self, sale_id: Uuid, input: UpdateSaleInput) -> AppResult<BulkSale> {
        let existing = self.get_sale(sale_id).await?;
        let purchase = self.get_purchase(existing.bulk_purchase_id).await?;

        if let Some(sale_date) = input.sale_date.as_deref() {
            if validation::validate_date_text(sale_date).is_err() {
                return Err(AppError::Validation {
                    field: "sale_date".to_string(),
                    message: "sale_date must be YYYY-MM-DD".to_string(),
                    message_ja: "売却日はYYYY-MM-DD形式で入力してください".to_string(),
                });
            }
        }
        if let Some(quantity) = input.quantity {
            if validation::validate_quantity(quantity).is_err() {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "quantity must be at least 1".to_string(),
                    message_ja: "数量は1以上で入力してください".to_string(),
                });
            }
        }
        for (field, value, label_ja) in [
            ("sale_amount", input.sale_amount, "売却額"),
            ("commission", input.commission, "手数料"),
            ("shipping_cost", input.shipping_cost, "送料"),
            ("other_cost", input.other_cost, "その他費用"),
            ("photography_fee", input.photography_fee, "撮影料"),
            ("deposit_amount", input.deposit_amount, "入金額"),
            ("purchase_price", input.purchase_price, "仕入額"),
        ] {
            if validation::validate_optional_amount(value).is_err() {
                return Err(AppError::Validation {
                    field: field.to_string(),
                    message: format!("{} must not be negative", field),
                    message_ja: format!("{}は0以上で入力してください", label_ja),
                });
            }
        }

        let quantity = input.quantity.unwrap_or(existing.quantity);
        let sold_by_others: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(quantity) FROM bulk_sales WHERE bulk_purchase_id = $1 AND id <> $2",
        )
        .bind(existing.bulk_purchase_id)
        .bind(sale_id)
        .fetch_one(&self.db)
        .await?;
        check_lot_capacity(purchase.total_quantity, sold_by_others.unwrap_or(0), quantity)?;

        let sale = sqlx::query_as::<_, BulkSale>(&format!(
            r#"
            UPDATE bulk_sales
            SET sale_date = $1, sale_destination = $2, quantity = $3, sale_amount = $4,
                commission = $5, shipping_cost = $6, other_cost = $7, photography_fee = $8,
                deposit_amount = $9, purchase_price = $10, product_name = $11, brand_name = $12,
                category = $13, image_url = $14, listing_date = $15, memo = $16
            WHERE id = $17
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(input.sale_date.unwrap_or(existing.sale_date))
        .bind(input.sale_destination.or(existing.sale_destination))
        .bind(quantity)
        .bind(input.sale_amount.unwrap_or(existing.sale_amount))
        .bind(input.commission.unwrap_or(existing.commission))
        .bind(input.shipping_cost.unwrap_or(existing.shipping_cost))
        .bind(input.other_cost.or(existing.other_cost))
        .bind(input.photography_fee.or(existing.photography_fee))
        .bind(input.deposit_amount.or(existing.deposit_amount))
        .bind(input.purchase_price.or(existing.purchase_price))
        .bind(input.product_name.or(existing.product_name))
        .bind(input.brand_name.or(existing.brand_name))
        .bind(input.category.or(existing.category))
        .bind(input.image_url.or(existing.image_url))
        .bind(input.listing_date.or(existing.listing_date))
        .bind(input.memo.or(existing.memo))
        .bind(sale_id)
        .fetch_one(&self.db)
        .await?;

        Ok(sale)
    }
}

/// A disposal may not push the lot's total sold quantity past what was
/// purchased; `sold_elsewhere` excludes the disposal being written.
fn check_lot_capacity(total_quantity: i64, sold_elsewhere: i64, requested: i64) -> AppResult<()> {
    let remaining = total_quantity - sold_elsewhere;
    if requested > remaining {
        return Err(AppError::InsufficientLotQuantity(format!(
            "requested {} but only {} left in the lot",
            requested, remaining
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_allows_up_to_remainder() {
        assert!(check_lot_capacity(10, 8, 2).is_ok());
        assert!(check_lot_capacity(10, 0, 10).is_ok());
    }

    #[test]
    fn test_capacity_rejects_past_remainder() {
        assert!(check_lot_capacity(10, 8, 3).is_err());
        assert!(check_lot_capacity(10, 10, 1).is_err());
    }

    #[test]
    fn test_capacity_excluding_own_quantity_lets_a_sale_keep_its_size() {
        // lot of 10, this sale holds 4 and the others hold 6: resaving the
        // same quantity or shrinking it is fine, growing it is not
        assert!(check_lot_capacity(10, 6, 4).is_ok());
        assert!(check_lot_capacity(10, 6, 3).is_ok());
        assert!(check_lot_capacity(10, 6, 5).is_err());
    }
}
