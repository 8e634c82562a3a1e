//! Sale-destination and purchase-source master records
//!
//! Platforms (販路) and suppliers (仕入先) both carry the counterparty
//! identity fields the regulatory ledger (古物台帳) has to show: address,
//! representative name, occupation, contact details, and the method used to
//! verify the counterparty's identity.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A marketplace or buyer the business sells through
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Platform {
    pub id: Uuid,
    pub name: String,
    pub color_class: String,
    pub commission_rate: Decimal,
    pub sales_type: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub is_hidden: bool,
    pub address: Option<String>,
    pub representative_name: Option<String>,
    pub occupation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub verification_method: Option<String>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl Platform {
    /// Marketplace fee for a sale at this platform's commission rate,
    /// rounded to whole yen
    pub fn commission_for(&self, sale_price: i64) -> i64 {
        (Decimal::from(sale_price) * self.commission_rate)
            .round()
            .to_i64()
            .unwrap_or(0)
    }
}

/// A purchase source the business acquires goods from
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub color_class: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub is_hidden: bool,
    pub address: Option<String>,
    pub representative_name: Option<String>,
    pub occupation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub verification_method: Option<String>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// Monthly sales and profit targets, keyed by `YYYY-MM`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MonthlyGoal {
    pub id: Uuid,
    pub year_month: String,
    pub sales_goal: Option<i64>,
    pub profit_goal: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn platform(rate: &str) -> Platform {
        Platform {
            id: Uuid::new_v4(),
            name: "ヤフオク".to_string(),
            color_class: "bg-red-100".to_string(),
            commission_rate: Decimal::from_str(rate).unwrap(),
            sales_type: "toC".to_string(),
            sort_order: 0,
            is_active: true,
            is_hidden: false,
            address: None,
            representative_name: None,
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
    fn test_commission_rounds_to_whole_yen() {
        assert_eq!(platform("0.10").commission_for(9990), 999);
        assert_eq!(platform("0.088").commission_for(10000), 880);
        // 8.8% of 9999 = 879.912 -> 880
        assert_eq!(platform("0.088").commission_for(9999), 880);
    }

    #[test]
    fn test_commission_zero_rate() {
        assert_eq!(platform("0").commission_for(50000), 0);
    }
}
