//! Business-date parsing for free-text date columns
//!
//! Historical imports left the date columns as free text: mixed `-` and `/`
//! separators, trailing time-of-day fragments, and sentinel words like
//! 「返品」 written straight into the field. All parsing of those values
//! goes through here so the arithmetic elsewhere only ever sees
//! `chrono::NaiveDate`.

use chrono::NaiveDate;

/// Sentinel words that mark a date field as "not a date"
const DATE_SENTINELS: [&str; 3] = ["返品", "不明", "キャンセル"];

/// Parse a free-text business date into a calendar date.
///
/// Accepts `YYYY-MM-DD` and `YYYY/MM/DD`, ignoring anything after the first
/// ten characters. Returns `None` for empty values, sentinel words, and
/// anything that does not parse as a real calendar date.
pub fn parse_business_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if DATE_SENTINELS.iter().any(|s| trimmed.contains(s)) {
        return None;
    }
    if !has_date_shape(trimmed) {
        return None;
    }
    let normalized: String = trimmed[..10].replace('/', "-");
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()
}

/// Check the first ten characters look like `YYYY?MM?DD` with `-` or `/`
fn has_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 10 {
        return false;
    }
    bytes.iter().take(10).enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-' || *b == b'/',
        _ => b.is_ascii_digit(),
    })
}

/// Whether an optional free-text field holds a usable date
pub fn is_valid_date_text(raw: Option<&str>) -> bool {
    raw.map(|s| parse_business_date(s).is_some()).unwrap_or(false)
}

/// Extract the year, rejecting obviously bogus values from old imports
pub fn year_of(raw: &str) -> Option<i32> {
    use chrono::Datelike;
    let year = parse_business_date(raw)?.year();
    (year >= 2000).then_some(year)
}

/// Extract the month (1-12)
pub fn month_of(raw: &str) -> Option<u32> {
    use chrono::Datelike;
    parse_business_date(raw).map(|d| d.month())
}

/// Days between acquisition and disposal, `None` when either side is
/// missing or unparseable. Negative values are preserved; bad data is a
/// display problem, not ours.
pub fn turnover_days(purchase: Option<&str>, sale: Option<&str>) -> Option<i32> {
    let purchase = parse_business_date(purchase?)?;
    let sale = parse_business_date(sale?)?;
    Some(sale.signed_duration_since(purchase).num_days() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hyphen_and_slash() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(parse_business_date("2025-03-01"), Some(expected));
        assert_eq!(parse_business_date("2025/03/01"), Some(expected));
    }

    #[test]
    fn test_parse_ignores_trailing_text() {
        let expected = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(parse_business_date("2024-12-31 23:59"), Some(expected));
    }

    #[test]
    fn test_parse_rejects_sentinels() {
        assert_eq!(parse_business_date("返品"), None);
        assert_eq!(parse_business_date("不明"), None);
        assert_eq!(parse_business_date("キャンセル"), None);
        assert_eq!(parse_business_date("2025-03-01 返品"), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_business_date(""), None);
        assert_eq!(parse_business_date("   "), None);
        assert_eq!(parse_business_date("3月1日"), None);
        assert_eq!(parse_business_date("2025-3-1"), None);
        assert_eq!(parse_business_date("2025-13-01"), None);
        assert_eq!(parse_business_date("2025-02-30"), None);
    }

    #[test]
    fn test_year_of_rejects_pre_2000() {
        assert_eq!(year_of("2024-06-15"), Some(2024));
        assert_eq!(year_of("1999-06-15"), None);
    }

    #[test]
    fn test_month_of() {
        assert_eq!(month_of("2024-06-15"), Some(6));
        assert_eq!(month_of("返品"), None);
    }

    #[test]
    fn test_turnover_days() {
        assert_eq!(
            turnover_days(Some("2025-02-01"), Some("2025-03-01")),
            Some(28)
        );
        assert_eq!(turnover_days(Some("2025-02-01"), None), None);
        assert_eq!(turnover_days(None, Some("2025-03-01")), None);
        assert_eq!(turnover_days(Some("不明"), Some("2025-03-01")), None);
    }

    #[test]
    fn test_turnover_days_same_day() {
        assert_eq!(
            turnover_days(Some("2025-02-01"), Some("2025-02-01")),
            Some(0)
        );
    }
}
