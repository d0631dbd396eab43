//! Date extraction for receipts.

use chrono::NaiveDate;

use super::patterns::ISO_DATE;

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE.captures(s.trim())?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("2024-09-12"), NaiveDate::from_ymd_opt(2024, 9, 12));
        assert_eq!(parse_iso_date(" 2023-04-16 "), NaiveDate::from_ymd_opt(2023, 4, 16));
    }

    #[test]
    fn test_rejects_loose_formats() {
        assert_eq!(parse_iso_date("2024-05-2"), None);
        assert_eq!(parse_iso_date("12.09.2024"), None);
        assert_eq!(parse_iso_date("2024-09-12 19:26:07"), None);
        assert_eq!(parse_iso_date("2024-13-01"), None);
        assert_eq!(parse_iso_date("invalid_date"), None);
    }
}
