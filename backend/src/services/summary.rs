//! Sales-summary service: snapshot fetches and the reconciliation pass
//!
//! The planning itself is pure (`shared::reconcile`); this service is the
//! persistence adapter around it. It pulls complete snapshots of the three
//! sale sources plus the summary table via paginated reads, then applies
//! the plan with batched deletes and inserts.
//!
//! Write failures are per-batch and non-fatal: the affected rows simply
//! remain missing and are picked up by the next run. Fetch failures abort
//! the run; reconciling against a partial source set would be wrong.

use shared::models::{
    BulkPurchase, BulkSale, InventoryItem, ManualSale, NewSummaryRecord, SalesSummaryRecord,
};
use shared::reconcile;
use shared::types::SourceType;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppResult;

/// Page size for full-table snapshot reads
const FETCH_PAGE_SIZE: i64 = 1000;

/// Maximum ids per delete and rows per insert, to respect backend
/// payload limits
const WRITE_BATCH_SIZE: usize = 500;

/// Result of one reconciliation pass
#[derive(Debug, serde::Serialize)]
pub struct ReconcileOutcome {
    /// Rows actually inserted (conflict-skipped rows are not counted)
    pub inserted_count: usize,
    /// Stale bulk-derived rows removed before recomputation
    pub deleted_count: u64,
    /// Delete or insert batches that failed and were skipped
    pub error_batches: usize,
    /// The summary table as this run left it
    #[serde(skip)]
    pub summary_after: Vec<SalesSummaryRecord>,
}

/// Summary service owning all access to the sales_summary table
#[derive(Clone)]
pub struct SummaryService {
    db: PgPool,
}

impl SummaryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Run one reconciliation pass over the full source snapshots
    pub async fn reconcile(&self) -> AppResult<ReconcileOutcome> {
        let inventory = self.fetch_inventory().await?;
        let bulk_purchases = self.fetch_bulk_purchases().await?;
        let bulk_sales = self.fetch_bulk_sales().await?;
        let manual_sales = self.fetch_manual_sales().await?;
        let existing = self.list_summary().await?;

        tracing::info!(
            inventory = inventory.len(),
            bulk_purchases = bulk_purchases.len(),
            bulk_sales = bulk_sales.len(),
            manual_sales = manual_sales.len(),
            existing_summary = existing.len(),
            "starting sales-summary reconciliation"
        );

        let plan = reconcile::plan(
            &inventory,
            &bulk_purchases,
            &bulk_sales,
            &manual_sales,
            &existing,
        );

        let mut error_batches = 0;
        let mut deleted_count = 0u64;

        for batch in plan.stale_bulk_row_ids.chunks(WRITE_BATCH_SIZE) {
            match self.delete_rows(batch).await {
                Ok(n) => deleted_count += n,
                Err(e) => {
                    tracing::error!(error = %e, batch_size = batch.len(), "delete batch failed, skipping");
                    error_batches += 1;
                }
            }
        }

        // Post-state starts from the surviving append-only rows.
        let mut summary_after: Vec<SalesSummaryRecord> = existing
            .into_iter()
            .filter(|r| r.source_type != SourceType::Bulk.as_str())
            .collect();
        let mut inserted_count = 0;

        for batch in plan.new_records.chunks(WRITE_BATCH_SIZE) {
            match self.insert_rows(batch).await {
                Ok(rows) => {
                    inserted_count += rows.len();
                    summary_after.extend(rows);
                }
                Err(e) => {
                    tracing::error!(error = %e, batch_size = batch.len(), "insert batch failed, skipping");
                    error_batches += 1;
                }
            }
        }

        tracing::info!(
            inserted = inserted_count,
            deleted = deleted_count,
            error_batches,
            "sales-summary reconciliation finished"
        );

        Ok(ReconcileOutcome {
            inserted_count,
            deleted_count,
            error_batches,
            summary_after,
        })
    }

    /// Full snapshot of the summary table
    pub async fn list_summary(&self) -> AppResult<Vec<SalesSummaryRecord>> {
        let mut all = Vec::new();
        let mut offset = 0i64;
        loop {
            let page = sqlx::query_as::<_, SalesSummaryRecord>(
                r#"
                SELECT id, source_type, source_id, inventory_number, product_name, brand_name,
                       category, image_url, purchase_source, sale_destination, sale_price,
                       commission, shipping_cost, other_cost, photography_fee, purchase_price,
                       purchase_cost, deposit_amount, profit, profit_rate, purchase_date,
                       listing_date, sale_date, turnover_days, memo, quantity, created_at
                FROM sales_summary
                ORDER BY created_at, id
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(FETCH_PAGE_SIZE)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

            let short_page = (page.len() as i64) < FETCH_PAGE_SIZE;
            all.extend(page);
            if short_page {
                break;
            }
            offset += FETCH_PAGE_SIZE;
        }
        Ok(all)
    }

    async fn fetch_inventory(&self) -> AppResult<Vec<InventoryItem>> {
        let mut all = Vec::new();
        let mut offset = 0i64;
        loop {
            let page = sqlx::query_as::<_, InventoryItem>(
                r#"
                SELECT id, inventory_number, product_name, brand_name, category, image_url,
                       saved_image_url, purchase_price, purchase_total, sale_price, commission,
                       shipping_cost, other_cost, photography_fee, deposit_amount, status,
                       purchase_date, listing_date, sale_date, purchase_source, sale_destination,
                       memo, created_at
                FROM inventory
                ORDER BY created_at, id
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(FETCH_PAGE_SIZE)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

            let short_page = (page.len() as i64) < FETCH_PAGE_SIZE;
            all.extend(page);
            if short_page {
                break;
            }
            offset += FETCH_PAGE_SIZE;
        }
        Ok(all)
    }

    async fn fetch_bulk_purchases(&self) -> AppResult<Vec<BulkPurchase>> {
        let mut all = Vec::new();
        let mut offset = 0i64;
        loop {
            let page = sqlx::query_as::<_, BulkPurchase>(
                r#"
                SELECT id, genre, purchase_date, purchase_source, total_amount, total_quantity,
                       memo, created_at
                FROM bulk_purchases
                ORDER BY created_at, id
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(FETCH_PAGE_SIZE)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

            let short_page = (page.len() as i64) < FETCH_PAGE_SIZE;
            all.extend(page);
            if short_page {
                break;
            }
            offset += FETCH_PAGE_SIZE;
        }
        Ok(all)
    }

    async fn fetch_bulk_sales(&self) -> AppResult<Vec<BulkSale>> {
        let mut all = Vec::new();
        let mut offset = 0i64;
        loop {
            let page = sqlx::query_as::<_, BulkSale>(
                r#"
                SELECT id, bulk_purchase_id, sale_date, sale_destination, quantity, sale_amount,
                       commission, shipping_cost, other_cost, photography_fee, deposit_amount,
                       purchase_price, product_name, brand_name, category, image_url,
                       listing_date, memo, created_at
                FROM bulk_sales
                ORDER BY created_at, id
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(FETCH_PAGE_SIZE)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

            let short_page = (page.len() as i64) < FETCH_PAGE_SIZE;
            all.extend(page);
            if short_page {
                break;
            }
            offset += FETCH_PAGE_SIZE;
        }
        Ok(all)
    }

    async fn fetch_manual_sales(&self) -> AppResult<Vec<ManualSale>> {
        let mut all = Vec::new();
        let mut offset = 0i64;
        loop {
            let page = sqlx::query_as::<_, ManualSale>(
                r#"
                SELECT id, inventory_number, product_name, brand_name, category, purchase_source,
                       sale_destination, sale_price, commission, shipping_cost, other_cost,
                       photography_fee, purchase_total, profit, profit_rate, purchase_date,
                       listing_date, sale_date, memo, cost_recovered, created_at
                FROM manual_sales
                ORDER BY created_at, id
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(FETCH_PAGE_SIZE)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

            let short_page = (page.len() as i64) < FETCH_PAGE_SIZE;
            all.extend(page);
            if short_page {
                break;
            }
            offset += FETCH_PAGE_SIZE;
        }
        Ok(all)
    }

    async fn delete_rows(&self, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sales_summary WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Insert one batch of candidate rows.
    ///
    /// Conflicts on `(source_type, source_id)` mean another run got there
    /// first; those rows are already satisfied and simply not returned.
    async fn insert_rows(
        &self,
        records: &[NewSummaryRecord],
    ) -> Result<Vec<SalesSummaryRecord>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO sales_summary (source_type, source_id, inventory_number, product_name, \
             brand_name, category, image_url, purchase_source, sale_destination, sale_price, \
             commission, shipping_cost, other_cost, photography_fee, purchase_price, \
             purchase_cost, deposit_amount, profit, profit_rate, purchase_date, listing_date, \
             sale_date, turnover_days, memo, quantity) ",
        );

        builder.push_values(records, |mut b, rec| {
            b.push_bind(&rec.source_type)
                .push_bind(rec.source_id)
                .push_bind(&rec.inventory_number)
                .push_bind(&rec.product_name)
                .push_bind(&rec.brand_name)
                .push_bind(&rec.category)
                .push_bind(&rec.image_url)
                .push_bind(&rec.purchase_source)
                .push_bind(&rec.sale_destination)
                .push_bind(rec.sale_price)
                .push_bind(rec.commission)
                .push_bind(rec.shipping_cost)
                .push_bind(rec.other_cost)
                .push_bind(rec.photography_fee)
                .push_bind(rec.purchase_price)
                .push_bind(rec.purchase_cost)
                .push_bind(rec.deposit_amount)
                .push_bind(rec.profit)
                .push_bind(rec.profit_rate)
                .push_bind(&rec.purchase_date)
                .push_bind(&rec.listing_date)
                .push_bind(&rec.sale_date)
                .push_bind(rec.turnover_days)
                .push_bind(&rec.memo)
                .push_bind(rec.quantity);
        });

        builder.push(
            " ON CONFLICT (source_type, source_id) DO NOTHING \
             RETURNING id, source_type, source_id, inventory_number, product_name, brand_name, \
             category, image_url, purchase_source, sale_destination, sale_price, commission, \
             shipping_cost, other_cost, photography_fee, purchase_price, purchase_cost, \
             deposit_amount, profit, profit_rate, purchase_date, listing_date, sale_date, \
             turnover_days, memo, quantity, created_at",
        );

        builder
            .build_query_as::<SalesSummaryRecord>()
            .fetch_all(&self.db)
            .await
    }
}
