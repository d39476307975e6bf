use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a percentage such as `5`, `5%` or `5.25 %` into a decimal rate.
pub fn parse_percent(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    let value = Decimal::from_str(number)
        .map_err(|_| format!("'{}' is not a percentage (e.g. 5 or 5.25%)", raw.trim()))?;
    Ok(value / Decimal::ONE_HUNDRED)
}

/// Parse a money amount, tolerating a leading `$` and thousands separators.
pub fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    let cleaned: String = trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    Decimal::from_str(cleaned.trim()).map_err(|_| format!("'{}' is not an amount", trimmed))
}

/// Parse a strictly positive whole number of days or months.
pub fn parse_count(raw: &str) -> Result<u32, String> {
    let trimmed = raw.trim();
    match trimmed.parse::<u32>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a whole number", trimmed)),
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date (YYYY-MM-DD)", raw.trim()))
}

/// Render a decimal rate back as the percentage a user would type.
pub fn format_percent(rate: Decimal) -> String {
    (rate * Decimal::ONE_HUNDRED).normalize().to_string()
}
