//! Shared parsing utilities for spreadsheet cells.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parses a spreadsheet date-time cell in `DD.MM.YYYY,HH:MM` form.
///
/// The value is interpreted as UTC. Returns `None` if the cell does not
/// describe a valid calendar date and time.
#[must_use]
pub fn parse_date_time(s: &str) -> Option<DateTime<Utc>> {
    let (date, time) = s.trim().split_once(',')?;
    let joined = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&joined, "%d.%m.%Y %H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parses an accident ID cell. Spreadsheet exports sometimes render integer
/// IDs as floats (`1234.0`), so a zero fractional part is accepted.
#[must_use]
pub fn parse_accident_id(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    if let Ok(id) = trimmed.parse::<i64>() {
        return Some(id);
    }
    let value = trimmed.parse::<f64>().ok()?;
    #[allow(clippy::cast_possible_truncation)]
    let id = value as i64;
    #[allow(clippy::cast_precision_loss)]
    let exact = value.is_finite() && id as f64 == value;
    exact.then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spreadsheet_date_time() {
        let dt = parse_date_time("15.01.2024,14:30").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00 UTC");
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let dt = parse_date_time(" 01.12.2021, 07:05 ").unwrap();
        assert_eq!(dt.to_string(), "2021-12-01 07:05:00 UTC");
    }

    #[test]
    fn rejects_invalid_date_time() {
        assert!(parse_date_time("not-a-date").is_none());
        assert!(parse_date_time("15.01.2024").is_none());
        assert!(parse_date_time("31.02.2024,10:00").is_none());
        assert!(parse_date_time("15.01.2024,25:00").is_none());
        assert!(parse_date_time("").is_none());
    }

    #[test]
    fn parses_accident_ids() {
        assert_eq!(parse_accident_id("1234"), Some(1234));
        assert_eq!(parse_accident_id(" 1234.0 "), Some(1234));
        assert_eq!(parse_accident_id("12.5"), None);
        assert_eq!(parse_accident_id("ID"), None);
        assert_eq!(parse_accident_id(""), None);
    }
}
