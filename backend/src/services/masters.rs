//! Master data: platforms (販路), suppliers (仕入先), and monthly goals
//!
//! Platform and supplier rows carry the counterparty identity fields the
//! regulatory ledger prints. Lists are sorted by the operator-managed
//! `sort_order`, and soft-hiding keeps a counterparty out of pickers while
//! its history stays referenced by name.

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{MonthlyGoal, Platform, Supplier};
use shared::validation;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

const PLATFORM_COLUMNS: &str = "id, name, color_class, commission_rate, sales_type, sort_order, \
     is_active, is_hidden, address, representative_name, occupation, phone, email, website, \
     verification_method, is_anonymous, created_at";

const SUPPLIER_COLUMNS: &str = "id, name, color_class, sort_order, is_active, is_hidden, \
     address, representative_name, occupation, phone, email, website, verification_method, \
     is_anonymous, created_at";

/// Master-data service
#[derive(Clone)]
pub struct MasterService {
    db: PgPool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PlatformInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub color_class: Option<String>,
    pub commission_rate: Option<Decimal>,
    pub sales_type: Option<String>,
    pub sort_order: Option<i32>,
    pub address: Option<String>,
    pub representative_name: Option<String>,
    pub occupation: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(url(message = "Invalid URL format"))]
    pub website: Option<String>,
    pub verification_method: Option<String>,
    pub is_anonymous: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SupplierInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub color_class: Option<String>,
    pub sort_order: Option<i32>,
    pub address: Option<String>,
    pub representative_name: Option<String>,
    pub occupation: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(url(message = "Invalid URL format"))]
    pub website: Option<String>,
    pub verification_method: Option<String>,
    pub is_anonymous: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct GoalInput {
    pub year_month: String,
    pub sales_goal: Option<i64>,
    pub profit_goal: Option<i64>,
}

fn check(input: &impl Validate) -> AppResult<()> {
    input
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))
}

impl MasterService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Active platforms in operator order
    pub async fn list_platforms(&self) -> AppResult<Vec<Platform>> {
        let platforms = sqlx::query_as::<_, Platform>(&format!(
            "SELECT {PLATFORM_COLUMNS} FROM platforms WHERE is_active ORDER BY sort_order, name"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(platforms)
    }

    pub async fn create_platform(&self, input: PlatformInput) -> AppResult<Platform> {
        check(&input)?;
        let rate = input.commission_rate.unwrap_or(Decimal::ZERO);
        if let Err(msg) = validation::validate_commission_rate(rate) {
            return Err(AppError::Validation {
                field: "commission_rate".to_string(),
                message: msg.to_string(),
                message_ja: "手数料率は0から1の間で入力してください".to_string(),
            });
        }

        let platform = sqlx::query_as::<_, Platform>(&format!(
            r#"
            INSERT INTO platforms (name, color_class, commission_rate, sales_type, sort_order,
                                   address, representative_name, occupation, phone, email,
                                   website, verification_method, is_anonymous)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {PLATFORM_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(input.color_class.as_deref().unwrap_or("bg-gray-100"))
        .bind(rate)
        .bind(input.sales_type.as_deref().unwrap_or("toC"))
        .bind(input.sort_order.unwrap_or(0))
        .bind(&input.address)
        .bind(&input.representative_name)
        .bind(&input.occupation)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.website)
        .bind(&input.verification_method)
        .bind(input.is_anonymous.unwrap_or(false))
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("platform name".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        Ok(platform)
    }

    pub async fn update_platform(
        &self,
        platform_id: Uuid,
        input: PlatformInput,
    ) -> AppResult<Platform> {
        check(&input)?;
        let existing = sqlx::query_as::<_, Platform>(&format!(
            "SELECT {PLATFORM_COLUMNS} FROM platforms WHERE id = $1"
        ))
        .bind(platform_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Platform".to_string()))?;

        let rate = input.commission_rate.unwrap_or(existing.commission_rate);
        if let Err(msg) = validation::validate_commission_rate(rate) {
            return Err(AppError::Validation {
                field: "commission_rate".to_string(),
                message: msg.to_string(),
                message_ja: "手数料率は0から1の間で入力してください".to_string(),
            });
        }

        let platform = sqlx::query_as::<_, Platform>(&format!(
            r#"
            UPDATE platforms
            SET name = $1, color_class = $2, commission_rate = $3, sales_type = $4,
                sort_order = $5, address = $6, representative_name = $7, occupation = $8,
                phone = $9, email = $10, website = $11, verification_method = $12,
                is_anonymous = $13
            WHERE id = $14
            RETURNING {PLATFORM_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(input.color_class.unwrap_or(existing.color_class))
        .bind(rate)
        .bind(input.sales_type.unwrap_or(existing.sales_type))
        .bind(input.sort_order.unwrap_or(existing.sort_order))
        .bind(input.address.or(existing.address))
        .bind(input.representative_name.or(existing.representative_name))
        .bind(input.occupation.or(existing.occupation))
        .bind(input.phone.or(existing.phone))
        .bind(input.email.or(existing.email))
        .bind(input.website.or(existing.website))
        .bind(input.verification_method.or(existing.verification_method))
        .bind(input.is_anonymous.unwrap_or(existing.is_anonymous))
        .bind(platform_id)
        .fetch_one(&self.db)
        .await?;

        Ok(platform)
    }

    /// Active suppliers in operator order
    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE is_active ORDER BY sort_order, name"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(suppliers)
    }

    pub async fn create_supplier(&self, input: SupplierInput) -> AppResult<Supplier> {
        check(&input)?;

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            INSERT INTO suppliers (name, color_class, sort_order, address, representative_name,
                                   occupation, phone, email, website, verification_method,
                                   is_anonymous)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(input.color_class.as_deref().unwrap_or("bg-gray-100"))
        .bind(input.sort_order.unwrap_or(0))
        .bind(&input.address)
        .bind(&input.representative_name)
        .bind(&input.occupation)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.website)
        .bind(&input.verification_method)
        .bind(input.is_anonymous.unwrap_or(false))
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("supplier name".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        Ok(supplier)
    }

    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        input: SupplierInput,
    ) -> AppResult<Supplier> {
        check(&input)?;
        let existing = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1"
        ))
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers
            SET name = $1, color_class = $2, sort_order = $3, address = $4,
                representative_name = $5, occupation = $6, phone = $7, email = $8, website = $9,
                verification_method = $10, is_anonymous = $11
            WHERE id = $12
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(input.color_class.unwrap_or(existing.color_class))
        .bind(input.sort_order.unwrap_or(existing.sort_order))
        .bind(input.address.or(existing.address))
        .bind(input.representative_name.or(existing.representative_name))
        .bind(input.occupation.or(existing.occupation))
        .bind(input.phone.or(existing.phone))
        .bind(input.email.or(existing.email))
        .bind(input.website.or(existing.website))
        .bind(input.verification_method.or(existing.verification_method))
        .bind(input.is_anonymous.unwrap_or(existing.is_anonymous))
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    pub async fn list_goals(&self) -> AppResult<Vec<MonthlyGoal>> {
        let goals = sqlx::query_as::<_, MonthlyGoal>(
            "SELECT id, year_month, sales_goal, profit_goal, created_at \
             FROM monthly_goals ORDER BY year_month",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(goals)
    }

    /// Set the goals for a month, replacing any previous values
    pub async fn upsert_goal(&self, input: GoalInput) -> AppResult<MonthlyGoal> {
        if let Err(msg) = validation::validate_year_month(&input.year_month) {
            return Err(AppError::Validation {
                field: "year_month".to_string(),
                message: msg.to_string(),
                message_ja: "対象月はYYYY-MM形式で入力してください".to_string(),
            });
        }
        for (field, value) in [
            ("sales_goal", input.sales_goal),
            ("profit_goal", input.profit_goal),
        ] {
            if validation::validate_optional_amount(value).is_err() {
                return Err(AppError::Validation {
                    field: field.to_string(),
                    message: format!("{} must not be negative", field),
                    message_ja: "目標値は0以上で入力してください".to_string(),
                });
            }
        }

        let goal = sqlx::query_as::<_, MonthlyGoal>(
            r#"
            INSERT INTO monthly_goals (year_month, sales_goal, profit_goal)
            VALUES ($1, $2, $3)
            ON CONFLICT (year_month)
            DO UPDATE SET sales_goal = EXCLUDED.sales_goal, profit_goal = EXCLUDED.profit_goal
            RETURNING id, year_month, sales_goal, profit_goal, created_at
            "#,
        )
        .bind(&input.year_month)
        .bind(input.sales_goal)
        .bind(input.profit_goal)
        .fetch_one(&self.db)
        .await?;

        Ok(goal)
    }
}
