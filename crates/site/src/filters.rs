//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a timestamp or ISO date as `25 Aug 2025`.
///
/// Accepts RFC 3339 strings and anything whose display starts with
/// `YYYY-MM-DD`, such as `DateTime<Utc>` and `NaiveDate`.
///
/// Usage in templates: `{{ inquiry.created_at|short_date }}`
#[askama::filter_fn]
pub fn short_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    let date = chrono::DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| raw.get(..10).unwrap_or(&raw).parse::<chrono::NaiveDate>());
    Ok(date.map_or(raw, |d| d.format("%-d %b %Y").to_string()))
}
