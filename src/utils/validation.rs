//! Centralized validation and normalization helpers.

use chrono::{DateTime, NaiveDate};

/// Maximum number of records accepted in a single input (DOS protection)
pub const MAX_RECORDS: usize = 1_000_000;

/// Date format used for dates of birth
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Check if adding another record would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new record.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_record_limit(count: usize) -> Option<String> {
    if count >= MAX_RECORDS {
        Some(format!(
            "Too many records: adding another would exceed maximum of {MAX_RECORDS}"
        ))
    } else {
        None
    }
}

/// Check a face embedding against its contract.
///
/// Returns a description of the violation, or None if the embedding is usable.
/// An empty embedding is only a violation when a dimensionality is declared.
#[must_use]
pub fn check_embedding(embedding: &[f64], declared_dim: Option<usize>) -> Option<String> {
    if let Some(dim) = declared_dim {
        if embedding.len() != dim {
            return Some(format!(
                "has length {} but the declared dimensionality is {dim}",
                embedding.len()
            ));
        }
    }

    embedding
        .iter()
        .position(|v| !v.is_finite())
        .map(|i| format!("has a non-finite value at position {i}"))
}

/// Trim a string, mapping blank values to None.
///
/// # Examples
///
/// ```
/// use roll_dedup::utils::validation::normalize_text;
///
/// assert_eq!(normalize_text(" Asha "), Some("Asha".to_string()));
/// assert_eq!(normalize_text("   "), None);
/// ```
#[must_use]
pub fn normalize_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a date of birth leniently.
///
/// Accepts `YYYY-MM-DD` and RFC 3339 timestamps (the date part is used).
/// Anything else yields None rather than an error.
///
/// # Examples
///
/// ```
/// use roll_dedup::utils::validation::parse_date;
///
/// assert!(parse_date("1985-03-12").is_some());
/// assert!(parse_date("1985-03-12T00:00:00Z").is_some());
/// assert!(parse_date("12/03/1985").is_none());
/// ```
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_record_limit() {
        assert!(check_record_limit(100).is_none());
        assert!(check_record_limit(MAX_RECORDS - 1).is_none());
        assert!(check_record_limit(MAX_RECORDS).is_some());
        assert!(check_record_limit(MAX_RECORDS + 1).is_some());
    }

    #[test]
    fn test_check_embedding() {
        assert!(check_embedding(&[0.1, 0.2], None).is_none());
        assert!(check_embedding(&[], None).is_none());
        assert!(check_embedding(&[0.1, 0.2], Some(2)).is_none());
        assert!(check_embedding(&[0.1, 0.2], Some(3)).is_some());
        assert!(check_embedding(&[], Some(3)).is_some());
        assert!(check_embedding(&[0.1, f64::INFINITY], None).is_some());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2001-02-03"),
            NaiveDate::from_ymd_opt(2001, 2, 3)
        );
        assert_eq!(
            parse_date(" 2001-02-03 "),
            NaiveDate::from_ymd_opt(2001, 2, 3)
        );
        assert_eq!(
            parse_date("2001-02-03T10:30:00+05:30"),
            NaiveDate::from_ymd_opt(2001, 2, 3)
        );
        assert_eq!(parse_date("2001-02-30"), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }
}
