//! Form field parsing and post-redirect-get helpers for admin pages.
//!
//! HTML forms submit every input as a string. A blank input means "not
//! provided": `None` on create, left unchanged on update.

use std::str::FromStr;

use axum::response::{IntoResponse, Redirect, Response};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Flash messages carried in the query string after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Trimmed text, or `None` if blank.
pub fn text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed text that must not be blank.
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming the field if it is blank.
pub fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    text(value).ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

/// Parse an optional field with `FromStr`.
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming the field if parsing fails.
pub fn parsed<T>(field: &str, value: Option<String>) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text(value)
        .map(|v| {
            v.parse()
                .map_err(|e| AppError::BadRequest(format!("{field}: {e}")))
        })
        .transpose()
}

/// Parse an optional `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the date is malformed.
pub fn date(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, AppError> {
    parsed(field, value)
}

/// Parse an optional yes/no input (`true`/`false`, `on`/`off`).
///
/// # Errors
///
/// Returns `AppError::BadRequest` for any other value.
pub fn flag(field: &str, value: Option<String>) -> Result<Option<bool>, AppError> {
    match text(value).as_deref() {
        None => Ok(None),
        Some("true" | "on" | "yes") => Ok(Some(true)),
        Some("false" | "off" | "no") => Ok(Some(false)),
        Some(other) => Err(AppError::BadRequest(format!(
            "{field}: expected yes or no, got {other:?}"
        ))),
    }
}

/// One entry per non-blank line, e.g. photo URLs.
pub fn lines(value: Option<String>) -> Option<Vec<String>> {
    text(value).map(|v| {
        v.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}

/// Parse a dollar amount such as `2500`, `$2,500` or `2500.50` into cents.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the amount is malformed.
pub fn cents(field: &str, value: Option<String>) -> Result<Option<i64>, AppError> {
    let Some(raw) = text(value) else {
        return Ok(None);
    };
    let invalid = || AppError::BadRequest(format!("{field}: {raw:?} is not a dollar amount"));

    let cleaned: String = raw.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    let (whole, fraction) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    if whole.is_empty() || fraction.len() > 2 {
        return Err(invalid());
    }
    let dollars: i64 = whole.parse().map_err(|_| invalid())?;
    let fraction_cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };
    dollars
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction_cents))
        .map(Some)
        .ok_or_else(invalid)
}

/// Render cents for an input field, e.g. `250050` as `2500.50`.
pub fn dollars_input(cents: Option<i64>) -> String {
    cents.map_or_else(String::new, |c| {
        if c % 100 == 0 {
            (c / 100).to_string()
        } else {
            format!("{}.{:02}", c / 100, (c % 100).abs())
        }
    })
}

/// One `<option>` of a `<select>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Options from `(value, label)` pairs, marking `current` as selected.
pub fn options(
    choices: impl IntoIterator<Item = (String, String)>,
    current: Option<&str>,
) -> Vec<SelectOption> {
    choices
        .into_iter()
        .map(|(value, label)| SelectOption {
            selected: current == Some(value.as_str()),
            value,
            label,
        })
        .collect()
}

/// Options for a string-backed enum such as a status.
pub fn enum_options<T: Copy + std::fmt::Display>(
    all: &[T],
    current: Option<T>,
) -> Vec<SelectOption> {
    let current = current.map(|c| c.to_string());
    options(
        all.iter().map(|v| (v.to_string(), v.to_string())),
        current.as_deref(),
    )
}

/// Redirect to `path` with a flash message in the query string.
pub fn redirect_with(path: &str, key: &str, message: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, message)
        .finish();
    Redirect::to(&format!("{path}?{query}"))
}

/// Finish a form submission with a redirect back to `path`.
///
/// Success drops cached query results so the change is visible at once.
/// Failures are reported and shown as a flash error.
pub fn finish<T>(
    state: &AppState,
    result: Result<T, AppError>,
    path: &str,
    success: &str,
) -> Response {
    match result {
        Ok(_) => {
            state.query_cache().invalidate();
            redirect_with(path, "success", success).into_response()
        }
        Err(e) => {
            e.report();
            redirect_with(path, "error", &e.public_message()).into_response()
        }
    }
}
