//! Manually entered sales, for transactions outside the inventory flow
//!
//! Almost every field is optional; rows from spreadsheet imports are often
//! partial. Profit and profit rate may be stored explicitly to override the
//! derived values, and `cost_recovered` excludes a row from the summary.

use serde::Deserialize;
use shared::models::ManualSale;
use shared::validation;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const SALE_COLUMNS: &str = "id, inventory_number, product_name, brand_name, category, \
     purchase_source, sale_destination, sale_price, commission, shipping_cost, other_cost, \
     photography_fee, purchase_total, profit, profit_rate, purchase_date, listing_date, \
     sale_date, memo, cost_recovered, created_at";

/// Manual sales service
#[derive(Clone)]
pub struct ManualSaleService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct CreateManualSaleInput {
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
}

impl ManualSaleService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_sale(&self, input: CreateManualSaleInput) -> AppResult<ManualSale> {
        for (field, value, label_ja) in [
            ("sale_price", input.sale_price, "売却額"),
            ("commission", input.commission, "手数料"),
            ("shipping_cost", input.shipping_cost, "送料"),
            ("other_cost", input.other_cost, "その他費用"),
            ("photography_fee", input.photography_fee, "撮影料"),
            ("purchase_total", input.purchase_total, "仕入総額"),
        ] {
            if validation::validate_optional_amount(value).is_err() {
                return Err(AppError::Validation {
                    field: field.to_string(),
                    message: format!("{} must not be negative", field),
                    message_ja: format!("{}は0以上で入力してください", label_ja),
                });
            }
        }
        // Dates are free text; only shaped values are accepted here, the
        // sentinel words are reserved for imports.
        for (field, value) in [
            ("purchase_date", input.purchase_date.as_deref()),
            ("listing_date", input.listing_date.as_deref()),
            ("sale_date", input.sale_date.as_deref()),
        ] {
            if validation::validate_optional_date_text(value).is_err() {
                return Err(AppError::Validation {
                    field: field.to_string(),
                    message: format!("{} must be YYYY-MM-DD", field),
                    message_ja: format!("{}はYYYY-MM-DD形式で入力してください", field),
                });
            }
        }

        let sale = sqlx::query_as::<_, ManualSale>(&format!(
            r#"
            INSERT INTO manual_sales (inventory_number, product_name, brand_name, category,
                                      purchase_source, sale_destination, sale_price, commission,
                                      shipping_cost, other_cost, photography_fee, purchase_total,
                                      profit, profit_rate, purchase_date, listing_date, sale_date,
                                      memo, cost_recovered)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, FALSE)
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(&input.inventory_number)
        .bind(&input.product_name)
        .bind(&input.brand_name)
        .bind(&input.category)
        .bind(&input.purchase_source)
        .bind(&input.sale_destination)
        .bind(input.sale_price)
        .bind(input.commission)
        .bind(input.shipping_cost)
        .bind(input.other_cost)
        .bind(input.photography_fee)
        .bind(input.purchase_total)
        .bind(input.profit)
        .bind(input.profit_rate)
        .bind(&input.purchase_date)
        .bind(&input.listing_date)
        .bind(&input.sale_date)
        .bind(&input.memo)
        .fetch_one(&self.db)
        .await?;

        Ok(sale)
    }

    pub async fn list_sales(&self) -> AppResult<Vec<ManualSale>> {
        let sales = sqlx::query_as::<_, ManualSale>(&format!(
            "SELECT {SALE_COLUMNS} FROM manual_sales ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(sales)
    }

    /// Mark a row as absorbed into bulk cost recovery so the reconciler
    /// stops considering it
    pub async fn set_cost_recovered(
        &self,
        sale_id: Uuid,
        cost_recovered: bool,
    ) -> AppResult<ManualSale> {
        sqlx::query_as::<_, ManualSale>(&format!(
            "UPDATE manual_sales SET cost_recovered = $1 WHERE id = $2 RETURNING {SALE_COLUMNS}"
        ))
        .bind(cost_recovered)
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Manual sale".to_string()))
    }
}
