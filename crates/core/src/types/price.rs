//! Puppy price ranges.
//!
//! Prices are stored as integer cents in Australian dollars. A puppy may
//! carry a minimum, a maximum, both, or neither.

use serde::{Deserialize, Serialize};

/// An optional AUD price range in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lower bound in cents.
    pub min: Option<i64>,
    /// Upper bound in cents.
    pub max: Option<i64>,
}

impl PriceRange {
    /// Create a range from optional bounds.
    #[must_use]
    pub const fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    /// Human-readable label, e.g. `$2,500 - $3,500 AUD`.
    ///
    /// Zero and missing bounds are treated alike; with neither bound the
    /// label is `Contact for Price`.
    ///
    /// ```
    /// use parti_poodles_core::PriceRange;
    ///
    /// assert_eq!(PriceRange::new(Some(250_000), None).label(), "$2,500 AUD");
    /// assert_eq!(PriceRange::default().label(), "Contact for Price");
    /// ```
    #[must_use]
    pub fn label(&self) -> String {
        let min = self.min.filter(|c| *c != 0);
        let max = self.max.filter(|c| *c != 0);
        match (min, max) {
            (None, None) => "Contact for Price".to_string(),
            (Some(lo), Some(hi)) if lo != hi => {
                format!("{} - {} AUD", format_dollars(lo), format_dollars(hi))
            }
            (Some(price), _) | (None, Some(price)) => format!("{} AUD", format_dollars(price)),
        }
    }
}

/// Format cents as dollars with thousands separators, e.g. `$12,345.50`.
///
/// Whole-dollar amounts omit the cents.
#[must_use]
pub fn format_dollars(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();
    let remainder = cents % 100;

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if remainder == 0 {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{remainder:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_range() {
        let range = PriceRange::new(Some(250_000), Some(350_000));
        assert_eq!(range.label(), "$2,500 - $3,500 AUD");
    }

    #[test]
    fn test_label_equal_bounds_collapses() {
        let range = PriceRange::new(Some(300_000), Some(300_000));
        assert_eq!(range.label(), "$3,000 AUD");
    }

    #[test]
    fn test_label_single_bound() {
        assert_eq!(PriceRange::new(None, Some(99_950)).label(), "$999.50 AUD");
        assert_eq!(PriceRange::new(Some(0), Some(120_000)).label(), "$1,200 AUD");
    }

    #[test]
    fn test_label_no_price() {
        assert_eq!(PriceRange::new(Some(0), None).label(), "Contact for Price");
    }

    #[test]
    fn test_format_dollars() {
        assert_eq!(format_dollars(0), "$0");
        assert_eq!(format_dollars(5), "$0.05");
        assert_eq!(format_dollars(123_456_789), "$1,234,567.89");
        assert_eq!(format_dollars(-1_000_000), "-$10,000");
    }
}
