//! Regulatory ledger (古物台帳) assembly and CSV export
//!
//! One ledger row per inventory item, keyed by the receipt (受入) side.
//! Items without a parseable purchase date never enter the ledger. The
//! disposal (払出) half is filled in once the item shows a sale date or a
//! sale destination. Counterparty identity comes from the supplier and
//! platform masters, matched by name.
//!
//! Row assembly is pure so it can be tested without a database; the service
//! wraps it with the snapshot fetches and the CSV encoder.

use serde::Serialize;
use shared::dates;
use shared::models::{InventoryItem, Platform, Supplier};
use sqlx::PgPool;

use crate::error::AppResult;

/// UTF-8 BOM so spreadsheet software opens the export as UTF-8
const CSV_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Printed in place of the name for counterparties flagged anonymous;
/// their identity columns stay blank
const ANONYMOUS_LABEL: &str = "匿名";

const CSV_HEADERS: [&str; 20] = [
    "No",
    "受入_年月日",
    "受入_区別",
    "受入_品目",
    "受入_代価",
    "受入_数量",
    "受入_相手の確認方法",
    "受入_住所",
    "受入_氏名",
    "受入_職業",
    "受入_電話番号",
    "受入_メールアドレス",
    "受入_ホームページアドレス",
    "払出_年月日",
    "払出_区別",
    "払出_代価",
    "払出_住所",
    "払出_氏名",
    "払出_販路",
    "商品画像URL",
];

/// Period filter for the ledger; `None` means all
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerPeriod {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// One assembled ledger row (receipt side always present, disposal side
/// only once sold)
#[derive(Debug, Serialize)]
pub struct LedgerRow {
    pub no: usize,
    pub receipt_date: String,
    pub product_name: String,
    pub receipt_price: Option<i64>,
    pub verification_method: Option<String>,
    pub supplier_address: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_occupation: Option<String>,
    pub supplier_phone: Option<String>,
    pub supplier_email: Option<String>,
    pub supplier_website: Option<String>,
    pub is_sold: bool,
    pub disposal_date: Option<String>,
    pub disposal_price: Option<i64>,
    pub platform_address: Option<String>,
    pub platform_name: Option<String>,
    pub sale_destination: Option<String>,
    pub image_url: Option<String>,
}

/// Build ledger rows from an inventory snapshot and the masters
pub fn assemble_rows(
    inventory: &[InventoryItem],
    suppliers: &[Supplier],
    platforms: &[Platform],
    period: LedgerPeriod,
) -> Vec<LedgerRow> {
    inventory
        .iter()
        .filter(|item| in_period(item.purchase_date.as_deref(), period))
        .enumerate()
        .map(|(index, item)| {
            let supplier = item
                .purchase_source
                .as_deref()
                .and_then(|name| suppliers.iter().find(|s| s.name == name));
            let platform = item
                .sale_destination
                .as_deref()
                .and_then(|name| platforms.iter().find(|p| p.name == name));

            // Anonymous counterparties print as 匿名 and expose nothing
            // else about their identity.
            let supplier_anonymous = supplier.is_some_and(|s| s.is_anonymous);
            let platform_anonymous = platform.is_some_and(|p| p.is_anonymous);
            let supplier = supplier.filter(|s| !s.is_anonymous);
            let platform = platform.filter(|p| !p.is_anonymous);

            // A sale date or a destination marks the item as disposed even
            // when the other field is still blank.
            let is_sold = item.sale_date.is_some() || item.sale_destination.is_some();

            LedgerRow {
                no: index + 1,
                receipt_date: item.purchase_date.clone().unwrap_or_default(),
                product_name: item.product_name.clone(),
                receipt_price: item.purchase_total.or(item.purchase_price),
                verification_method: supplier.and_then(|s| s.verification_method.clone()),
                supplier_address: supplier.and_then(|s| s.address.clone()),
                supplier_name: if supplier_anonymous {
                    Some(ANONYMOUS_LABEL.to_string())
                } else {
                    supplier.and_then(|s| s.representative_name.clone())
                },
                supplier_occupation: supplier.and_then(|s| s.occupation.clone()),
                supplier_phone: supplier.and_then(|s| s.phone.clone()),
                supplier_email: supplier.and_then(|s| s.email.clone()),
                supplier_website: supplier.and_then(|s| s.website.clone()),
                is_sold,
                disposal_date: is_sold.then(|| item.sale_date.clone().unwrap_or_default()),
                disposal_price: if is_sold {
                    item.deposit_amount.or(item.sale_price)
                } else {
                    None
                },
                platform_address: platform.and_then(|p| p.address.clone()),
                platform_name: if platform_anonymous {
                    Some(ANONYMOUS_LABEL.to_string())
                } else {
                    platform.and_then(|p| p.representative_name.clone())
                },
                sale_destination: item.sale_destination.clone(),
                image_url: item.image_url.clone().or_else(|| item.saved_image_url.clone()),
            }
        })
        .collect()
}

fn in_period(purchase_date: Option<&str>, period: LedgerPeriod) -> bool {
    let Some(raw) = purchase_date else {
        return false;
    };
    if !dates::is_valid_date_text(Some(raw)) {
        return false;
    }
    if let Some(year) = period.year {
        if dates::year_of(raw) != Some(year) {
            return false;
        }
        if let Some(month) = period.month {
            if dates::month_of(raw) != Some(month) {
                return false;
            }
        }
    }
    true
}

/// Encode ledger rows as a BOM-prefixed CSV document
pub fn rows_to_csv(rows: &[LedgerRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    let opt_money = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();
    let opt_text = |v: &Option<String>| v.clone().unwrap_or_default();

    for row in rows {
        let disposal_kind = if row.is_sold { "売却" } else { "" };
        writer.write_record([
            row.no.to_string(),
            row.receipt_date.clone(),
            "仕入".to_string(),
            row.product_name.clone(),
            opt_money(row.receipt_price),
            "1".to_string(),
            opt_text(&row.verification_method),
            opt_text(&row.supplier_address),
            opt_text(&row.supplier_name),
            opt_text(&row.supplier_occupation),
            opt_text(&row.supplier_phone),
            opt_text(&row.supplier_email),
            opt_text(&row.supplier_website),
            opt_text(&row.disposal_date),
            disposal_kind.to_string(),
            opt_money(row.disposal_price),
            if row.is_sold { opt_text(&row.platform_address) } else { String::new() },
            if row.is_sold { opt_text(&row.platform_name) } else { String::new() },
            if row.is_sold { opt_text(&row.sale_destination) } else { String::new() },
            opt_text(&row.image_url),
        ])?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| e.into_error())?;
    let mut out = Vec::with_capacity(CSV_BOM.len() + body.len());
    out.extend_from_slice(CSV_BOM);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Ledger service wrapping the pure assembly with snapshot fetches
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

impl LedgerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn ledger_rows(&self, period: LedgerPeriod) -> AppResult<Vec<LedgerRow>> {
        let (inventory, suppliers, platforms) = self.fetch_sources().await?;
        Ok(assemble_rows(&inventory, &suppliers, &platforms, period))
    }

    /// Export the ledger for a period as CSV bytes
    pub async fn export_csv(&self, period: LedgerPeriod) -> AppResult<Vec<u8>> {
        let rows = self.ledger_rows(period).await?;
        Ok(rows_to_csv(&rows)?)
    }

    async fn fetch_sources(
        &self,
    ) -> AppResult<(Vec<InventoryItem>, Vec<Supplier>, Vec<Platform>)> {
        let inventory = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT id, inventory_number, product_name, brand_name, category, image_url,
                   saved_image_url, purchase_price, purchase_total, sale_price, commission,
                   shipping_cost, other_cost, photography_fee, deposit_amount, status,
                   purchase_date, listing_date, sale_date, purchase_source, sale_destination,
                   memo, created_at
            FROM inventory
            ORDER BY purchase_date, created_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, color_class, sort_order, is_active, is_hidden, address, \
             representative_name, occupation, phone, email, website, verification_method, \
             is_anonymous, created_at FROM suppliers",
        )
        .fetch_all(&self.db)
        .await?;

        let platforms = sqlx::query_as::<_, Platform>(
            "SELECT id, name, color_class, commission_rate, sales_type, sort_order, is_active, \
             is_hidden, address, representative_name, occupation, phone, email, website, \
             verification_method, is_anonymous, created_at FROM platforms",
        )
        .fetch_all(&self.db)
        .await?;

        Ok((inventory, suppliers, platforms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn item(purchase_date: &str) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            inventory_number: None,
            product_name: "Leica M6".to_string(),
            brand_name: Some("Leica".to_string()),
            category: Some("カメラ".to_string()),
            image_url: None,
            saved_image_url: Some("https://img.example/saved.jpg".to_string()),
            purchase_price: Some(80000),
            purchase_total: Some(82000),
            sale_price: Some(120000),
            commission: Some(6000),
            shipping_cost: Some(1000),
            other_cost: None,
            photography_fee: None,
            deposit_amount: Some(113000),
            status: "売却済み".to_string(),
            purchase_date: Some(purchase_date.to_string()),
            listing_date: None,
            sale_date: Some("2025-04-10".to_string()),
            purchase_source: Some("カメラのキタムラ".to_string()),
            sale_destination: Some("ヤフオク".to_string()),
            memo: None,
            created_at: Utc::now(),
        }
    }

    fn supplier(name: &str) -> Supplier {
        Supplier {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color_class: "bg-gray-100".to_string(),
            sort_order: 0,
            is_active: true,
            is_hidden: false,
            address: Some("東京都新宿区1-1".to_string()),
            representative_name: Some("山田太郎".to_string()),
            occupation: Some("古物商".to_string()),
            phone: Some("03-0000-0000".to_string()),
            email: None,
            website: None,
            verification_method: Some("免許証".to_string()),
            is_anonymous: false,
            created_at: Utc::now(),
        }
    }

    fn platform(name: &str) -> Platform {
        Platform {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color_class: "bg-red-100".to_string(),
            commission_rate: Decimal::ZERO,
            sales_type: "toC".to_string(),
            sort_order: 0,
            is_active: true,
            is_hidden: false,
            address: Some("東京都千代田区2-2".to_string()),
            representative_name: Some("ヤフオク運営".to_string()),
            occupation: None,
            phone: None,
            email: None,
            website: None,
            verification_method: None,
            is_anonymous: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sold_item_fills_both_sides() {
        let rows = assemble_rows(
            &[item("2025-03-01")],
            &[supplier("カメラのキタムラ")],
            &[platform("ヤフオク")],
            LedgerPeriod::default(),
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.no, 1);
        assert_eq!(row.receipt_date, "2025-03-01");
        // purchase_total wins over purchase_price
        assert_eq!(row.receipt_price, Some(82000));
        assert_eq!(row.supplier_name.as_deref(), Some("山田太郎"));
        assert_eq!(row.verification_method.as_deref(), Some("免許証"));
        assert!(row.is_sold);
        assert_eq!(row.disposal_date.as_deref(), Some("2025-04-10"));
        // deposit wins over sale price
        assert_eq!(row.disposal_price, Some(113000));
        assert_eq!(row.platform_name.as_deref(), Some("ヤフオク運営"));
    }

    #[test]
    fn test_unsold_item_leaves_disposal_blank() {
        let mut unsold = item("2025-03-01");
        unsold.sale_date = None;
        unsold.sale_destination = None;
        unsold.status = "在庫".to_string();

        let rows = assemble_rows(&[unsold], &[], &[], LedgerPeriod::default());
        let row = &rows[0];
        assert!(!row.is_sold);
        assert_eq!(row.disposal_date, None);
        assert_eq!(row.disposal_price, None);
    }

    #[test]
    fn test_destination_alone_marks_disposal() {
        let mut it = item("2025-03-01");
        it.sale_date = None;
        let rows = assemble_rows(&[it], &[], &[], LedgerPeriod::default());
        assert!(rows[0].is_sold);
        assert_eq!(rows[0].disposal_date.as_deref(), Some(""));
    }

    #[test]
    fn test_unparseable_purchase_date_is_excluded() {
        let mut it = item("2025-03-01");
        it.purchase_date = Some("不明".to_string());
        let rows = assemble_rows(&[it], &[], &[], LedgerPeriod::default());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_period_filter() {
        let rows = assemble_rows(
            &[item("2024-12-31"), item("2025-03-01"), item("2025-04-01")],
            &[],
            &[],
            LedgerPeriod {
                year: Some(2025),
                month: Some(3),
            },
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].receipt_date, "2025-03-01");

        let whole_year = assemble_rows(
            &[item("2024-12-31"), item("2025-03-01"), item("2025-04-01")],
            &[],
            &[],
            LedgerPeriod {
                year: Some(2025),
                month: None,
            },
        );
        assert_eq!(whole_year.len(), 2);
    }

    #[test]
    fn test_unknown_counterparty_leaves_fields_blank() {
        let rows = assemble_rows(
            &[item("2025-03-01")],
            &[supplier("別の店")],
            &[],
            LedgerPeriod::default(),
        );
        assert_eq!(rows[0].supplier_name, None);
        assert_eq!(rows[0].platform_name, None);
        // the raw destination text still prints
        assert_eq!(rows[0].sale_destination.as_deref(), Some("ヤフオク"));
    }

    #[test]
    fn test_anonymous_supplier_renders_as_label_with_blank_identity() {
        let mut anon = supplier("カメラのキタムラ");
        anon.is_anonymous = true;

        let rows = assemble_rows(
            &[item("2025-03-01")],
            &[anon],
            &[],
            LedgerPeriod::default(),
        );
        let row = &rows[0];
        assert_eq!(row.supplier_name.as_deref(), Some("匿名"));
        assert_eq!(row.supplier_address, None);
        assert_eq!(row.supplier_occupation, None);
        assert_eq!(row.supplier_phone, None);
        assert_eq!(row.verification_method, None);
    }

    #[test]
    fn test_anonymous_platform_renders_as_label_with_blank_identity() {
        let mut anon = platform("ヤフオク");
        anon.is_anonymous = true;

        let rows = assemble_rows(
            &[item("2025-03-01")],
            &[],
            &[anon],
            LedgerPeriod::default(),
        );
        let row = &rows[0];
        assert_eq!(row.platform_name.as_deref(), Some("匿名"));
        assert_eq!(row.platform_address, None);
        // the destination text on the item itself still prints
        assert_eq!(row.sale_destination.as_deref(), Some("ヤフオク"));
    }

    #[test]
    fn test_csv_starts_with_bom_and_headers() {
        let rows = assemble_rows(
            &[item("2025-03-01")],
            &[supplier("カメラのキタムラ")],
            &[platform("ヤフオク")],
            LedgerPeriod::default(),
        );
        let csv = rows_to_csv(&rows).unwrap();
        assert_eq!(&csv[..3], CSV_BOM);

        let text = String::from_utf8(csv[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("No,受入_年月日,受入_区別"));
        let first = lines.next().unwrap();
        assert!(first.contains("仕入"));
        assert!(first.contains("売却"));
        assert!(first.contains("82000"));
        assert!(first.contains("113000"));
    }
}
