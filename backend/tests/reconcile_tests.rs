//! Sales-summary reconciliation tests
//!
//! Covers eligibility gating, derived-amount formulas, bulk rebuild
//! semantics, manual-vs-bulk dedup, and idempotence of the planner.

use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use shared::models::{
    BulkPurchase, BulkSale, InventoryItem, ManualSale, NewSummaryRecord, SalesSummaryRecord,
};
use shared::reconcile;
use shared::types::{InventoryStatus, SourceType};

// ============================================================================
// Builders
// ============================================================================

fn sold_item() -> InventoryItem {
    InventoryItem {
        id: Uuid::new_v4(),
        inventory_number: Some("A-001".to_string()),
        product_name: "Rolex GMT".to_string(),
        brand_name: Some("Rolex".to_string()),
        category: Some("時計".to_string()),
        image_url: None,
        saved_image_url: None,
        purchase_price: Some(5000),
        purchase_total: Some(6000),
        sale_price: Some(10000),
        commission: Some(500),
        shipping_cost: Some(300),
        other_cost: Some(0),
        photography_fee: None,
        deposit_amount: None,
        status: InventoryStatus::Sold.label().to_string(),
        purchase_date: Some("2025-02-01".to_string()),
        listing_date: Some("2025-02-05".to_string()),
        sale_date: Some("2025-03-01".to_string()),
        purchase_source: Some("ヤフオク".to_string()),
        sale_destination: Some("メルカリ".to_string()),
        memo: None,
        created_at: Utc::now(),
    }
}

fn lot() -> BulkPurchase {
    BulkPurchase {
        id: Uuid::new_v4(),
        genre: "カメラ".to_string(),
        purchase_date: "2025-01-10".to_string(),
        purchase_source: Some("ハードオフ".to_string()),
        total_amount: 30000,
        total_quantity: 10,
        memo: None,
        created_at: Utc::now(),
    }
}

fn lot_sale(lot_id: Uuid) -> BulkSale {
    BulkSale {
        id: Uuid::new_v4(),
        bulk_purchase_id: lot_id,
        sale_date: "2025-03-15".to_string(),
        sale_destination: Some("ヤフオク".to_string()),
        quantity: 2,
        sale_amount: 8000,
        commission: 400,
        shipping_cost: 200,
        other_cost: None,
        photography_fee: None,
        deposit_amount: None,
        purchase_price: None,
        product_name: None,
        brand_name: None,
        category: None,
        image_url: None,
        listing_date: None,
        memo: None,
        created_at: Utc::now(),
    }
}

fn manual_sale() -> ManualSale {
    ManualSale {
        id: Uuid::new_v4(),
        inventory_number: None,
        product_name: Some("ジャンクレンズ".to_string()),
        brand_name: None,
        category: None,
        purchase_source: None,
        sale_destination: Some("メルカリ".to_string()),
        sale_price: Some(3000),
        commission: Some(300),
        shipping_cost: Some(200),
        other_cost: None,
        photography_fee: None,
        purchase_total: Some(1000),
        profit: None,
        profit_rate: None,
        purchase_date: None,
        listing_date: None,
        sale_date: Some("2025-03-20".to_string()),
        memo: None,
        cost_recovered: Some(false),
        created_at: Utc::now(),
    }
}

/// Materialize planned rows as if the database had accepted them
fn persist(records: &[NewSummaryRecord]) -> Vec<SalesSummaryRecord> {
    records
        .iter()
        .map(|r| SalesSummaryRecord {
            id: Uuid::new_v4(),
            source_type: r.source_type.clone(),
            source_id: r.source_id,
            inventory_number: r.inventory_number.clone(),
            product_name: r.product_name.clone(),
            brand_name: r.brand_name.clone(),
            category: r.category.clone(),
            image_url: r.image_url.clone(),
            purchase_source: r.purchase_source.clone(),
            sale_destination: r.sale_destination.clone(),
            sale_price: r.sale_price,
            commission: r.commission,
            shipping_cost: r.shipping_cost,
            other_cost: r.other_cost,
            photography_fee: r.photography_fee,
            purchase_price: r.purchase_price,
            purchase_cost: r.purchase_cost,
            deposit_amount: r.deposit_amount,
            profit: r.profit,
            profit_rate: r.profit_rate,
            purchase_date: r.purchase_date.clone(),
            listing_date: r.listing_date.clone(),
            sale_date: r.sale_date.clone(),
            turnover_days: r.turnover_days,
            memo: r.memo.clone(),
            quantity: r.quantity,
            created_at: Utc::now(),
        })
        .collect()
}

// ============================================================================
// Derived amounts
// ============================================================================

#[test]
fn test_single_sale_derivation() {
    let item = sold_item();
    let plan = reconcile::plan(&[item.clone()], &[], &[], &[], &[]);

    assert_eq!(plan.new_records.len(), 1);
    let rec = &plan.new_records[0];
    assert_eq!(rec.source_type, SourceType::Single.as_str());
    assert_eq!(rec.source_id, item.id);
    // 10000 - 500 - 300 = 9200
    assert_eq!(rec.deposit_amount, 9200);
    // stored purchase_total wins over price + other
    assert_eq!(rec.purchase_cost, 6000);
    assert_eq!(rec.profit, 3200);
    assert_eq!(rec.profit_rate, 32);
    // 2025-02-01 .. 2025-03-01
    assert_eq!(rec.turnover_days, Some(28));
    assert_eq!(rec.quantity, 1);
}

#[test]
fn test_single_sale_computed_cost_when_total_missing() {
    let mut item = sold_item();
    item.purchase_total = None;
    item.other_cost = Some(300);
    let plan = reconcile::plan(&[item], &[], &[], &[], &[]);

    let rec = &plan.new_records[0];
    assert_eq!(rec.purchase_cost, 5300);
    assert_eq!(rec.profit, 9200 - 5300);
}

#[test]
fn test_single_sale_stored_deposit_wins() {
    let mut item = sold_item();
    item.deposit_amount = Some(9999);
    let plan = reconcile::plan(&[item], &[], &[], &[], &[]);

    assert_eq!(plan.new_records[0].deposit_amount, 9999);
}

#[test]
fn test_bulk_sale_cost_recovery_mode() {
    let lot = lot();
    let sale = lot_sale(lot.id);
    let plan = reconcile::plan(&[], &[lot], &[sale.clone()], &[], &[]);

    assert_eq!(plan.new_records.len(), 1);
    let rec = &plan.new_records[0];
    assert_eq!(rec.source_type, SourceType::Bulk.as_str());
    assert_eq!(rec.source_id, sale.id);
    // 8000 - 400 - 200 = 7400, and with no explicit purchase price the
    // whole deposit is treated as recovered capital
    assert_eq!(rec.deposit_amount, 7400);
    assert_eq!(rec.purchase_price, 7400);
    assert_eq!(rec.profit, 0);
    assert_eq!(rec.profit_rate, 0);
    assert_eq!(rec.quantity, 2);
}

#[test]
fn test_bulk_sale_explicit_purchase_price() {
    let lot = lot();
    let mut sale = lot_sale(lot.id);
    sale.purchase_price = Some(3000);
    let plan = reconcile::plan(&[], &[lot], &[sale], &[], &[]);

    let rec = &plan.new_records[0];
    assert_eq!(rec.profit, 7400 - 3000);
    assert_eq!(rec.purchase_cost, 3000);
}

#[test]
fn test_bulk_sale_profit_clamped_at_zero() {
    let lot = lot();
    let mut sale = lot_sale(lot.id);
    // Cost above the deposit would be a loss; the summary shows zero.
    sale.purchase_price = Some(9000);
    let plan = reconcile::plan(&[], &[lot], &[sale], &[], &[]);

    assert_eq!(plan.new_records[0].profit, 0);
}

#[test]
fn test_bulk_sale_fallback_name_includes_quantity() {
    let lot = lot();
    let sale = lot_sale(lot.id);
    let plan = reconcile::plan(&[], &[lot], &[sale], &[], &[]);

    assert_eq!(plan.new_records[0].product_name, "【まとめ】カメラ × 2");
}

#[test]
fn test_bulk_sale_named_product_keeps_its_name() {
    let lot = lot();
    let mut sale = lot_sale(lot.id);
    sale.product_name = Some("Nikon F3".to_string());
    sale.quantity = 1;
    let plan = reconcile::plan(&[], &[lot], &[sale], &[], &[]);

    let rec = &plan.new_records[0];
    assert_eq!(rec.product_name, "Nikon F3");
    // lot genre backfills the category
    assert_eq!(rec.category.as_deref(), Some("カメラ"));
}

#[test]
fn test_manual_sale_fallback_name_and_overrides() {
    let mut manual = manual_sale();
    manual.product_name = None;
    manual.profit = Some(1234);
    manual.profit_rate = Some(41);
    let plan = reconcile::plan(&[], &[], &[], &[manual], &[]);

    let rec = &plan.new_records[0];
    assert_eq!(rec.product_name, "(手入力)");
    assert_eq!(rec.profit, 1234);
    assert_eq!(rec.profit_rate, 41);
}

#[test]
fn test_manual_sale_derived_profit() {
    let plan = reconcile::plan(&[], &[], &[], &[manual_sale()], &[]);

    let rec = &plan.new_records[0];
    // 3000 - 300 - 200 = 2500 deposit, minus 1000 cost
    assert_eq!(rec.deposit_amount, 2500);
    assert_eq!(rec.profit, 1500);
    assert_eq!(rec.profit_rate, 50);
}

// ============================================================================
// Eligibility
// ============================================================================

#[test]
fn test_unsold_item_is_not_summarized() {
    let mut item = sold_item();
    item.status = InventoryStatus::Listed.label().to_string();
    let plan = reconcile::plan(&[item], &[], &[], &[], &[]);
    assert!(plan.new_records.is_empty());
}

#[test]
fn test_returned_item_is_not_summarized() {
    let mut item = sold_item();
    item.sale_destination = Some("返品".to_string());
    let plan = reconcile::plan(&[item], &[], &[], &[], &[]);
    assert!(plan.new_records.is_empty());
}

#[test]
fn test_item_without_sale_date_is_not_summarized() {
    let mut item = sold_item();
    item.sale_date = None;
    let plan = reconcile::plan(&[item], &[], &[], &[], &[]);
    assert!(plan.new_records.is_empty());
}

#[test]
fn test_bulk_sale_without_destination_is_skipped() {
    let lot = lot();
    let mut sale = lot_sale(lot.id);
    sale.sale_destination = Some(String::new());
    let plan = reconcile::plan(&[], &[lot], &[sale], &[], &[]);
    assert!(plan.new_records.is_empty());
}

#[test]
fn test_bulk_sale_with_missing_lot_is_skipped() {
    let sale = lot_sale(Uuid::new_v4());
    let plan = reconcile::plan(&[], &[], &[sale], &[], &[]);
    assert!(plan.new_records.is_empty());
}

#[test]
fn test_cost_recovered_manual_sale_is_skipped() {
    let mut manual = manual_sale();
    manual.cost_recovered = Some(true);
    let plan = reconcile::plan(&[], &[], &[], &[manual], &[]);
    assert!(plan.new_records.is_empty());
}

#[test]
fn test_manual_sale_duplicating_bulk_sale_is_dropped() {
    let lot = lot();
    let mut bulk = lot_sale(lot.id);
    bulk.product_name = Some("ジャンクレンズ".to_string());
    bulk.sale_date = "2025-03-20".to_string();

    // same name modulo case and whitespace, same day: bulk wins
    let mut manual = manual_sale();
    manual.product_name = Some("  ジャンクレンズ ".to_string());

    let plan = reconcile::plan(&[], &[lot], &[bulk], &[manual], &[]);
    assert_eq!(plan.new_records.len(), 1);
    assert_eq!(plan.new_records[0].source_type, SourceType::Bulk.as_str());
}

#[test]
fn test_empty_product_names_never_collide_in_dedup() {
    // An unnamed bulk sale must not suppress an unnamed manual sale on the
    // same day; empty names carry no identity.
    let lot = lot();
    let mut bulk = lot_sale(lot.id);
    bulk.product_name = Some(String::new());
    bulk.sale_date = "2025-03-20".to_string();

    let mut manual = manual_sale();
    manual.product_name = Some(String::new());

    let plan = reconcile::plan(&[], &[lot], &[bulk], &[manual], &[]);
    assert_eq!(plan.new_records.len(), 2);
}

#[test]
fn test_manual_sale_same_name_different_day_survives() {
    let lot = lot();
    let mut bulk = lot_sale(lot.id);
    bulk.product_name = Some("ジャンクレンズ".to_string());
    bulk.sale_date = "2025-03-21".to_string();

    let manual = manual_sale();
    let plan = reconcile::plan(&[], &[lot], &[bulk], &[manual], &[]);
    assert_eq!(plan.new_records.len(), 2);
}

// ============================================================================
// Idempotence and rebuild semantics
// ============================================================================

#[test]
fn test_second_run_plans_nothing_for_append_only_sources() {
    let item = sold_item();
    let manual = manual_sale();

    let first = reconcile::plan(&[item.clone()], &[], &[], &[manual.clone()], &[]);
    assert_eq!(first.new_records.len(), 2);

    let existing = persist(&first.new_records);
    let second = reconcile::plan(&[item], &[], &[], &[manual], &existing);
    assert!(second.new_records.is_empty());
    assert!(second.stale_bulk_row_ids.is_empty());
}

#[test]
fn test_bulk_rows_are_rebuilt_every_run() {
    let lot = lot();
    let sale = lot_sale(lot.id);

    let first = reconcile::plan(&[], &[lot.clone()], &[sale.clone()], &[], &[]);
    let existing = persist(&first.new_records);

    let second = reconcile::plan(&[], &[lot], &[sale.clone()], &[], &existing);
    // the old row is stale and the same sale is planned again
    assert_eq!(second.stale_bulk_row_ids, vec![existing[0].id]);
    assert_eq!(second.new_records.len(), 1);
    assert_eq!(second.new_records[0].source_id, sale.id);
}

#[test]
fn test_bulk_rebuild_tracks_changed_cost() {
    let lot = lot();
    let mut sale = lot_sale(lot.id);
    sale.purchase_price = Some(3000);

    let first = reconcile::plan(&[], &[lot.clone()], &[sale.clone()], &[], &[]);
    let existing = persist(&first.new_records);
    assert_eq!(existing[0].profit, 4400);

    // operator corrects the attributed cost; the rebuilt row reflects it
    sale.purchase_price = Some(5000);
    let second = reconcile::plan(&[], &[lot], &[sale], &[], &existing);
    assert_eq!(second.new_records[0].profit, 2400);
}

#[test]
fn test_only_bulk_rows_are_ever_deleted() {
    let item = sold_item();
    let lot = lot();
    let sale = lot_sale(lot.id);
    let manual = manual_sale();

    let first = reconcile::plan(
        &[item.clone()],
        &[lot.clone()],
        &[sale.clone()],
        &[manual.clone()],
        &[],
    );
    let existing = persist(&first.new_records);

    let second = reconcile::plan(&[item], &[lot], &[sale], &[manual], &existing);
    for id in &second.stale_bulk_row_ids {
        let row = existing.iter().find(|r| r.id == *id).unwrap();
        assert_eq!(row.source_type, SourceType::Bulk.as_str());
    }
}

#[test]
fn test_keys_are_unique_within_a_plan() {
    let item = sold_item();
    let lot = lot();
    let sale = lot_sale(lot.id);
    let manual = manual_sale();

    let plan = reconcile::plan(&[item], &[lot], &[sale], &[manual], &[]);
    let mut keys: Vec<String> = plan.new_records.iter().map(|r| r.key()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), plan.new_records.len());
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// A lot disposal never reports a loss, whatever the attributed cost.
    #[test]
    fn prop_bulk_profit_never_negative(
        sale_amount in 0i64..1_000_000,
        commission in 0i64..50_000,
        shipping in 0i64..50_000,
        purchase_price in proptest::option::of(0i64..2_000_000),
    ) {
        let lot = lot();
        let mut sale = lot_sale(lot.id);
        sale.sale_amount = sale_amount;
        sale.commission = commission;
        sale.shipping_cost = shipping;
        sale.purchase_price = purchase_price;

        let plan = reconcile::plan(&[], &[lot], &[sale], &[], &[]);
        prop_assert_eq!(plan.new_records.len(), 1);
        prop_assert!(plan.new_records[0].profit >= 0);
    }

    /// Single-item profit is exactly deposit minus acquisition cost, and
    /// losses are allowed.
    #[test]
    fn prop_single_profit_is_deposit_minus_cost(
        sale_price in 0i64..1_000_000,
        commission in 0i64..50_000,
        shipping in 0i64..50_000,
        purchase_total in 0i64..1_000_000,
    ) {
        let mut item = sold_item();
        item.sale_price = Some(sale_price);
        item.commission = Some(commission);
        item.shipping_cost = Some(shipping);
        item.purchase_total = Some(purchase_total);
        item.deposit_amount = None;

        let plan = reconcile::plan(&[item], &[], &[], &[], &[]);
        prop_assert_eq!(plan.new_records.len(), 1);
        let rec = &plan.new_records[0];
        prop_assert_eq!(rec.deposit_amount, sale_price - commission - shipping);
        prop_assert_eq!(rec.profit, rec.deposit_amount - purchase_total);
    }

    /// Planning the persisted output again yields an empty plan for
    /// append-only sources.
    #[test]
    fn prop_append_only_idempotence(sale_price in 1i64..1_000_000) {
        let mut item = sold_item();
        item.sale_price = Some(sale_price);

        let first = reconcile::plan(&[item.clone()], &[], &[], &[], &[]);
        let existing = persist(&first.new_records);
        let second = reconcile::plan(&[item], &[], &[], &[], &existing);
        prop_assert!(second.new_records.is_empty());
    }
}
