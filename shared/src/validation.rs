//! Validation helpers for operator-entered data
//!
//! Services validate inputs with these before touching the database, so the
//! defensive defaulting in the reconciler only ever has to cope with
//! historical data, not with new entries.

use rust_decimal::Decimal;

use crate::dates;

/// Money fields are integral yen and never negative
pub fn validate_amount(amount: i64) -> Result<(), &'static str> {
    if amount < 0 {
        return Err("Amount must not be negative");
    }
    Ok(())
}

/// Optional money fields: absent is fine, negative is not
pub fn validate_optional_amount(amount: Option<i64>) -> Result<(), &'static str> {
    match amount {
        Some(a) => validate_amount(a),
        None => Ok(()),
    }
}

/// Quantities on lots and disposals start at one
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be at least 1");
    }
    Ok(())
}

/// New entries must carry a parseable date; only legacy rows get to keep
/// free-text values
pub fn validate_date_text(raw: &str) -> Result<(), &'static str> {
    if dates::parse_business_date(raw).is_none() {
        return Err("Date must be YYYY-MM-DD");
    }
    Ok(())
}

/// Optional date fields: absent is fine, unparseable is not
pub fn validate_optional_date_text(raw: Option<&str>) -> Result<(), &'static str> {
    match raw {
        Some(s) if !s.is_empty() => validate_date_text(s),
        _ => Ok(()),
    }
}

/// Commission rates are fractions, e.g. 0.088 for 8.8%
pub fn validate_commission_rate(rate: Decimal) -> Result<(), &'static str> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err("Commission rate must be between 0 and 1");
    }
    Ok(())
}

/// Goal periods are keyed `YYYY-MM`
pub fn validate_year_month(value: &str) -> Result<(), &'static str> {
    let bytes = value.as_bytes();
    if bytes.len() != 7 {
        return Err("Period must be YYYY-MM");
    }
    let shape_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| if i == 4 { *b == b'-' } else { b.is_ascii_digit() });
    if !shape_ok {
        return Err("Period must be YYYY-MM");
    }
    let month: u32 = value[5..].parse().map_err(|_| "Period must be YYYY-MM")?;
    if !(1..=12).contains(&month) {
        return Err("Month must be between 01 and 12");
    }
    Ok(())
}
