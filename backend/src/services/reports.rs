//! Monthly reporting over the sales summary
//!
//! Aggregation is in memory and pure: rows with unparseable sale dates are
//! skipped, totals are grouped by `YYYY-MM`, and goals merge in so a month
//! with a target but no sales still shows up.

use serde::Serialize;
use shared::dates;
use shared::models::{MonthlyGoal, SalesSummaryRecord};
use sqlx::PgPool;
use std::collections::BTreeMap;

use crate::error::AppResult;

/// Totals for one `YYYY-MM` period
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyReport {
    pub year_month: String,
    pub sales_total: i64,
    pub deposit_total: i64,
    pub profit_total: i64,
    pub sale_count: i64,
    /// Mean of the per-row profit rates, rounded to whole percent
    pub average_profit_rate: i64,
    pub sales_goal: Option<i64>,
    pub profit_goal: Option<i64>,
    /// Percent of the sales goal reached, when a goal is set
    pub sales_achievement: Option<i64>,
    pub profit_achievement: Option<i64>,
}

/// Aggregate summary rows for one year into per-month reports
pub fn aggregate(
    records: &[SalesSummaryRecord],
    goals: &[MonthlyGoal],
    year: i32,
) -> Vec<MonthlyReport> {
    struct Acc {
        sales: i64,
        deposit: i64,
        profit: i64,
        count: i64,
        rate_sum: i64,
    }

    let mut months: BTreeMap<String, Acc> = BTreeMap::new();

    for record in records {
        let Some(date) = record.sale_date.as_deref() else {
            continue;
        };
        if dates::year_of(date) != Some(year) {
            continue;
        }
        let Some(month) = dates::month_of(date) else {
            continue;
        };
        let key = format!("{year}-{month:02}");
        let acc = months.entry(key).or_insert(Acc {
            sales: 0,
            deposit: 0,
            profit: 0,
            count: 0,
            rate_sum: 0,
        });
        acc.sales += record.sale_price;
        acc.deposit += record.deposit_amount;
        acc.profit += record.profit;
        acc.count += 1;
        acc.rate_sum += record.profit_rate;
    }

    // Goal-only months appear with zero totals.
    let year_prefix = format!("{year}-");
    for goal in goals {
        if goal.year_month.starts_with(&year_prefix) {
            months.entry(goal.year_month.clone()).or_insert(Acc {
                sales: 0,
                deposit: 0,
                profit: 0,
                count: 0,
                rate_sum: 0,
            });
        }
    }

    months
        .into_iter()
        .map(|(year_month, acc)| {
            let goal = goals.iter().find(|g| g.year_month == year_month);
            let sales_goal = goal.and_then(|g| g.sales_goal);
            let profit_goal = goal.and_then(|g| g.profit_goal);
            MonthlyReport {
                sales_achievement: achievement(acc.sales, sales_goal),
                profit_achievement: achievement(acc.profit, profit_goal),
                average_profit_rate: if acc.count > 0 {
                    ((acc.rate_sum as f64) / (acc.count as f64)).round() as i64
                } else {
                    0
                },
                year_month,
                sales_total: acc.sales,
                deposit_total: acc.deposit,
                profit_total: acc.profit,
                sale_count: acc.count,
                sales_goal,
                profit_goal,
            }
        })
        .collect()
}

fn achievement(actual: i64, goal: Option<i64>) -> Option<i64> {
    match goal {
        Some(goal) if goal > 0 => {
            Some(((actual as f64) / (goal as f64) * 100.0).round() as i64)
        }
        _ => None,
    }
}

/// Reporting service wrapping the pure aggregation
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

impl ReportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn monthly_report(&self, year: i32) -> AppResult<Vec<MonthlyReport>> {
        let records = sqlx::query_as::<_, SalesSummaryRecord>(
            r#"
            SELECT id, source_type, source_id, inventory_number, product_name, brand_name,
                   category, image_url, purchase_source, sale_destination, sale_price,
                   commission, shipping_cost, other_cost, photography_fee, purchase_price,
                   purchase_cost, deposit_amount, profit, profit_rate, purchase_date,
                   listing_date, sale_date, turnover_days, memo, quantity, created_at
            FROM sales_summary
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let goals = sqlx::query_as::<_, MonthlyGoal>(
            "SELECT id, year_month, sales_goal, profit_goal, created_at FROM monthly_goals",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(aggregate(&records, &goals, year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(sale_date: &str, sale_price: i64, profit: i64, rate: i64) -> SalesSummaryRecord {
        SalesSummaryRecord {
            id: Uuid::new_v4(),
            source_type: "single".to_string(),
            source_id: Uuid::new_v4(),
            inventory_number: None,
            product_name: "item".to_string(),
            brand_name: None,
            category: None,
            image_url: None,
            purchase_source: None,
            sale_destination: None,
            sale_price,
            commission: 0,
            shipping_cost: 0,
            other_cost: 0,
            photography_fee: 0,
            purchase_price: 0,
            purchase_cost: 0,
            deposit_amount: sale_price,
            profit,
            profit_rate: rate,
            purchase_date: None,
            listing_date: None,
            sale_date: Some(sale_date.to_string()),
            turnover_days: None,
            memo: None,
            quantity: 1,
            created_at: Utc::now(),
        }
    }

    fn goal(year_month: &str, sales: Option<i64>, profit: Option<i64>) -> MonthlyGoal {
        MonthlyGoal {
            id: Uuid::new_v4(),
            year_month: year_month.to_string(),
            sales_goal: sales,
            profit_goal: profit,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_groups_by_month_and_totals() {
        let records = vec![
            record("2025-03-01", 10000, 3000, 30),
            record("2025-03-15", 20000, 5000, 25),
            record("2025-04-02", 8000, 2000, 25),
        ];
        let months = aggregate(&records, &[], 2025);

        assert_eq!(months.len(), 2);
        let march = &months[0];
        assert_eq!(march.year_month, "2025-03");
        assert_eq!(march.sales_total, 30000);
        assert_eq!(march.profit_total, 8000);
        assert_eq!(march.sale_count, 2);
        // mean of 30 and 25, rounded
        assert_eq!(march.average_profit_rate, 28);
    }

    #[test]
    fn test_other_years_and_bad_dates_are_skipped() {
        let records = vec![
            record("2024-12-31", 9999, 1, 1),
            record("返品", 9999, 1, 1),
            record("2025-01-05", 5000, 500, 10),
        ];
        let months = aggregate(&records, &[], 2025);
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].sales_total, 5000);
    }

    #[test]
    fn test_goal_achievement() {
        let records = vec![record("2025-03-01", 80000, 24000, 30)];
        let goals = vec![goal("2025-03", Some(100000), Some(30000))];
        let months = aggregate(&records, &goals, 2025);

        let march = &months[0];
        assert_eq!(march.sales_goal, Some(100000));
        assert_eq!(march.sales_achievement, Some(80));
        assert_eq!(march.profit_achievement, Some(80));
    }

    #[test]
    fn test_goal_only_month_still_appears() {
        let goals = vec![goal("2025-06", Some(50000), None)];
        let months = aggregate(&[], &goals, 2025);

        assert_eq!(months.len(), 1);
        let june = &months[0];
        assert_eq!(june.year_month, "2025-06");
        assert_eq!(june.sale_count, 0);
        assert_eq!(june.sales_achievement, Some(0));
        assert_eq!(june.profit_achievement, None);
    }

    #[test]
    fn test_goal_for_other_year_is_ignored() {
        let goals = vec![goal("2024-06", Some(50000), None)];
        let months = aggregate(&[], &goals, 2025);
        assert!(months.is_empty());
    }

    #[test]
    fn test_zero_goal_yields_no_achievement() {
        let records = vec![record("2025-03-01", 1000, 100, 10)];
        let goals = vec![goal("2025-03", Some(0), None)];
        let months = aggregate(&records, &goals, 2025);
        assert_eq!(months[0].sales_achievement, None);
    }
}
