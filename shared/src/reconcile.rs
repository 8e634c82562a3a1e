//! Sales-summary reconciliation planner
//!
//! Pure computation: given full snapshots of the three sale sources and the
//! current summary table, decide which summary rows are stale and which are
//! missing. All I/O (paginated fetches, batched deletes and inserts) lives
//! in the backend summary service; this module never touches the database.
//!
//! Bulk-derived rows are always marked stale and rebuilt, because the
//! per-unit cost attribution depends on the *current* lot totals and must
//! not stay pinned to a previous run's snapshot. Single and manual rows are
//! append-only: once present for a `(source_type, source_id)` key they are
//! never updated.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::dates;
use crate::models::{
    BulkPurchase, BulkSale, InventoryItem, ManualSale, NewSummaryRecord, SalesSummaryRecord,
};
use crate::types::{InventoryStatus, SourceType, RETURNED_LABEL};

/// Display name fallback for manual sales without a product name
const MANUAL_FALLBACK_NAME: &str = "(手入力)";

/// The reconciler's verdict: rows to delete, rows to insert
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    /// Summary row ids of existing bulk-derived rows, all of which are
    /// deleted before recomputation
    pub stale_bulk_row_ids: Vec<Uuid>,
    /// Candidate rows missing from the summary table
    pub new_records: Vec<NewSummaryRecord>,
}

/// Compute the reconciliation plan.
///
/// Preconditions: no duplicate ids within any single input collection.
/// `existing` may be stale or empty (first run).
pub fn plan(
    inventory: &[InventoryItem],
    bulk_purchases: &[BulkPurchase],
    bulk_sales: &[BulkSale],
    manual_sales: &[ManualSale],
    existing: &[SalesSummaryRecord],
) -> ReconcilePlan {
    let mut existing_keys: HashSet<String> = existing.iter().map(|r| r.key()).collect();

    // Bulk rows are rebuilt every run; drop their keys so they recompute.
    let stale_bulk_row_ids: Vec<Uuid> = existing
        .iter()
        .filter(|r| r.source_type == SourceType::Bulk.as_str())
        .map(|r| {
            existing_keys.remove(&r.key());
            r.id
        })
        .collect();

    let lots: HashMap<Uuid, &BulkPurchase> =
        bulk_purchases.iter().map(|bp| (bp.id, bp)).collect();

    // Natural keys of all bulk sales, used to drop manual rows that record
    // the same physical transaction twice. Bulk wins. Empty names carry no
    // identity and never form a key.
    let bulk_sale_keys: HashSet<String> = bulk_sales
        .iter()
        .filter_map(|sale| {
            sale.product_name
                .as_deref()
                .filter(|name| !name.is_empty() && !sale.sale_date.is_empty())
                .map(|name| dedup_key(name, &sale.sale_date))
        })
        .collect();

    let mut new_records = Vec::new();

    for item in inventory {
        if !single_is_eligible(item) {
            continue;
        }
        let candidate = single_candidate(item);
        if !existing_keys.contains(&candidate.key()) {
            new_records.push(candidate);
        }
    }

    for sale in bulk_sales {
        if !is_set(&sale.sale_destination) {
            continue;
        }
        // A sale pointing at a missing lot has no cost basis; skip it.
        let Some(lot) = lots.get(&sale.bulk_purchase_id) else {
            continue;
        };
        let candidate = bulk_candidate(sale, lot);
        if !existing_keys.contains(&candidate.key()) {
            new_records.push(candidate);
        }
    }

    for item in manual_sales {
        if !manual_is_eligible(item, &bulk_sale_keys) {
            continue;
        }
        let candidate = manual_candidate(item);
        if !existing_keys.contains(&candidate.key()) {
            new_records.push(candidate);
        }
    }

    ReconcilePlan {
        stale_bulk_row_ids,
        new_records,
    }
}

/// Net cash received: the stored amount when present, otherwise
/// sale price minus marketplace commission, shipping, and photography fees
pub fn resolve_deposit_amount(
    stored: Option<i64>,
    sale_price: i64,
    commission: i64,
    shipping_cost: i64,
    photography_fee: i64,
) -> i64 {
    stored.unwrap_or(sale_price - commission - shipping_cost - photography_fee)
}

/// Acquisition cost of a single item: the stored purchase total when
/// present, otherwise unit price plus repair and other costs
pub fn resolve_single_purchase_cost(
    purchase_total: Option<i64>,
    purchase_price: i64,
    other_cost: i64,
) -> i64 {
    purchase_total.unwrap_or(purchase_price + other_cost)
}

/// Profit as a whole-number percentage of the sale price; 0 for free or
/// unpriced sales. Rounds half toward positive infinity, so a -0.5% loss
/// reports as 0, not -1.
pub fn profit_rate(profit: i64, sale_price: i64) -> i64 {
    if sale_price > 0 {
        (profit as f64 / sale_price as f64 * 100.0 + 0.5).floor() as i64
    } else {
        0
    }
}

/// Natural key joining a manual sale to a bulk sale recording the same
/// physical transaction. Lossy by design: two distinct products with the
/// same name sold the same day collide, first match wins.
fn dedup_key(product_name: &str, sale_date: &str) -> String {
    format!("{}|{}", product_name.trim().to_lowercase(), sale_date)
}

fn is_set(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some(s) if !s.is_empty())
}

/// A single item counts only once it is sold, shipped somewhere real, and
/// dated; returns are reversals, not sales.
fn single_is_eligible(item: &InventoryItem) -> bool {
    item.status == InventoryStatus::Sold.label()
        && is_set(&item.sale_destination)
        && item.sale_destination.as_deref() != Some(RETURNED_LABEL)
        && is_set(&item.sale_date)
}

fn manual_is_eligible(item: &ManualSale, bulk_sale_keys: &HashSet<String>) -> bool {
    if !is_set(&item.sale_date) || item.cost_recovered.unwrap_or(false) {
        return false;
    }
    if let (Some(name), Some(date)) = (item.product_name.as_deref(), item.sale_date.as_deref()) {
        if !name.is_empty() && bulk_sale_keys.contains(&dedup_key(name, date)) {
            return false;
        }
    }
    true
}

fn single_candidate(item: &InventoryItem) -> NewSummaryRecord {
    let sale_price = item.sale_price.unwrap_or(0);
    let purchase_price = item.purchase_price.unwrap_or(0);
    let commission = item.commission.unwrap_or(0);
    let shipping_cost = item.shipping_cost.unwrap_or(0);
    let other_cost = item.other_cost.unwrap_or(0);
    let photography_fee = item.photography_fee.unwrap_or(0);

    let deposit_amount = resolve_deposit_amount(
        item.deposit_amount,
        sale_price,
        commission,
        shipping_cost,
        photography_fee,
    );
    let purchase_cost =
        resolve_single_purchase_cost(item.purchase_total, purchase_price, other_cost);
    let profit = deposit_amount - purchase_cost;

    NewSummaryRecord {
        source_type: SourceType::Single.as_str().to_string(),
        source_id: item.id,
        inventory_number: item.inventory_number.clone(),
        product_name: item.product_name.clone(),
        brand_name: item.brand_name.clone(),
        category: item.category.clone(),
        image_url: item.display_image_url().map(str::to_string),
        purchase_source: item.purchase_source.clone(),
        sale_destination: item.sale_destination.clone(),
        sale_price,
        commission,
        shipping_cost,
        other_cost,
        photography_fee,
        purchase_price,
        purchase_cost,
        deposit_amount,
        profit,
        profit_rate: profit_rate(profit, sale_price),
        purchase_date: item.purchase_date.clone(),
        listing_date: item.listing_date.clone(),
        sale_date: item.sale_date.clone(),
        turnover_days: dates::turnover_days(
            item.purchase_date.as_deref(),
            item.sale_date.as_deref(),
        ),
        memo: item.memo.clone(),
        quantity: 1,
    }
}

fn bulk_candidate(sale: &BulkSale, lot: &BulkPurchase) -> NewSummaryRecord {
    let other_cost = sale.other_cost.unwrap_or(0);
    let photography_fee = sale.photography_fee.unwrap_or(0);
    let deposit_amount = resolve_deposit_amount(
        sale.deposit_amount,
        sale.sale_amount,
        sale.commission,
        sale.shipping_cost,
        photography_fee,
    );
    // No explicit purchase price means cost-recovery mode: the disposal is
    // a return of capital and profit is exactly zero. Either way a lot
    // disposal never reports a loss; the unsold remainder absorbs it.
    let purchase_price = sale.purchase_price.unwrap_or(deposit_amount);
    let profit = (deposit_amount - purchase_price - other_cost).max(0);

    let product_name = if sale.has_product_details() {
        sale.product_name
            .clone()
            .unwrap_or_else(|| format!("【まとめ】{}", lot.genre))
    } else if sale.quantity > 1 {
        format!("【まとめ】{} × {}", lot.genre, sale.quantity)
    } else {
        format!("【まとめ】{}", lot.genre)
    };

    NewSummaryRecord {
        source_type: SourceType::Bulk.as_str().to_string(),
        source_id: sale.id,
        inventory_number: None,
        product_name,
        brand_name: sale.brand_name.clone(),
        category: sale.category.clone().or_else(|| Some(lot.genre.clone())),
        image_url: sale.image_url.clone(),
        purchase_source: lot.purchase_source.clone(),
        sale_destination: sale.sale_destination.clone(),
        sale_price: sale.sale_amount,
        commission: sale.commission,
        shipping_cost: sale.shipping_cost,
        other_cost,
        photography_fee,
        purchase_price,
        purchase_cost: purchase_price + other_cost,
        deposit_amount,
        profit,
        profit_rate: profit_rate(profit, sale.sale_amount),
        purchase_date: Some(lot.purchase_date.clone()),
        listing_date: sale.listing_date.clone(),
        sale_date: Some(sale.sale_date.clone()),
        turnover_days: dates::turnover_days(Some(&lot.purchase_date), Some(&sale.sale_date)),
        memo: sale.memo.clone(),
        quantity: sale.quantity,
    }
}

fn manual_candidate(item: &ManualSale) -> NewSummaryRecord {
    let sale_price = item.sale_price.unwrap_or(0);
    let commission = item.commission.unwrap_or(0);
    let shipping_cost = item.shipping_cost.unwrap_or(0);
    let other_cost = item.other_cost.unwrap_or(0);
    let photography_fee = item.photography_fee.unwrap_or(0);
    let purchase_cost = item.purchase_total.unwrap_or(0);

    let deposit_amount = resolve_deposit_amount(
        None,
        sale_price,
        commission,
        shipping_cost,
        photography_fee,
    );
    // Manual rows may carry operator-entered overrides for profit and rate.
    let profit = item.profit.unwrap_or(deposit_amount - purchase_cost);
    let rate = item
        .profit_rate
        .unwrap_or_else(|| profit_rate(profit, sale_price));

    NewSummaryRecord {
        source_type: SourceType::Manual.as_str().to_string(),
        source_id: item.id,
        inventory_number: item.inventory_number.clone(),
        product_name: item
            .product_name
            .clone()
            .unwrap_or_else(|| MANUAL_FALLBACK_NAME.to_string()),
        brand_name: item.brand_name.clone(),
        category: item.category.clone(),
        image_url: None,
        purchase_source: item.purchase_source.clone(),
        sale_destination: item.sale_destination.clone(),
        sale_price,
        commission,
        shipping_cost,
        other_cost,
        photography_fee,
        purchase_price: purchase_cost,
        purchase_cost,
        deposit_amount,
        profit,
        profit_rate: rate,
        purchase_date: item.purchase_date.clone(),
        listing_date: item.listing_date.clone(),
        sale_date: item.sale_date.clone(),
        turnover_days: dates::turnover_days(
            item.purchase_date.as_deref(),
            item.sale_date.as_deref(),
        ),
        memo: item.memo.clone(),
        quantity: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_deposit_amount_prefers_stored() {
        assert_eq!(resolve_deposit_amount(Some(9500), 10000, 500, 300, 0), 9500);
    }

    #[test]
    fn test_resolve_deposit_amount_computed() {
        assert_eq!(resolve_deposit_amount(None, 10000, 500, 300, 200), 9000);
    }

    #[test]
    fn test_resolve_single_purchase_cost() {
        assert_eq!(resolve_single_purchase_cost(Some(6000), 5000, 300), 6000);
        assert_eq!(resolve_single_purchase_cost(None, 5000, 300), 5300);
    }

    #[test]
    fn test_profit_rate_rounds() {
        assert_eq!(profit_rate(3200, 10000), 32);
        assert_eq!(profit_rate(1, 3), 33);
        assert_eq!(profit_rate(2, 3), 67);
    }

    #[test]
    fn test_profit_rate_zero_price() {
        assert_eq!(profit_rate(500, 0), 0);
        assert_eq!(profit_rate(500, -100), 0);
    }

    #[test]
    fn test_profit_rate_negative_half_rounds_toward_positive() {
        assert_eq!(profit_rate(-5, 1000), 0);
        assert_eq!(profit_rate(-15, 1000), -1);
        assert_eq!(profit_rate(-20, 1000), -2);
    }

    #[test]
    fn test_dedup_key_normalizes_name_only() {
        assert_eq!(dedup_key("  Rolex GMT ", "2025-03-01"), "rolex gmt|2025-03-01");
        assert_ne!(dedup_key("rolex", "2025-03-01"), dedup_key("rolex", "2025-03-02"));
    }
}
