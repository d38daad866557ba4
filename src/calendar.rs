// 📅 Calendar - Day, week and month identity for expense dates
//
// Expense dates are plain calendar dates ("2024-03-01"). Every time window
// (today / this week / this month) is evaluated against a reference date
// taken from the same local calendar.
//
// Week identity: a date belongs to the week starting on the Monday obtained
// by subtracting its Monday-based weekday index. Two dates share a week iff
// those Mondays are equal.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};

/// Storage format for expense dates
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// PARSING
// ============================================================================

/// Parse a stored expense date.
///
/// Accepts `YYYY-MM-DD` (what the input form writes) and RFC 3339 timestamps,
/// which are converted to the local calendar date. Anything else is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT) {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Today's date in the local calendar
pub fn today() -> NaiveDate {
    reference_date(&Local::now())
}

/// Calendar date of an instant, in the instant's own timezone
pub fn reference_date<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

// ============================================================================
// BUCKETS
// ============================================================================

/// Monday of the week containing `date`, `None` when that Monday falls
/// before the earliest representable date
pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    let offset = date.weekday().num_days_from_monday() as i64;
    date.checked_sub_signed(Duration::days(offset))
}

pub fn same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a == b
}

/// Dates whose week has no representable Monday never share a week
pub fn same_week(a: NaiveDate, b: NaiveDate) -> bool {
    matches!((week_start(a), week_start(b)), (Some(x), Some(y)) if x == y)
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_date("2024-03-01"), Some(date(2024, 3, 1)));
        assert_eq!(parse_date("  2024-03-01 "), Some(date(2024, 3, 1)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn test_parse_rfc3339_timestamp() {
        // Midday UTC is the same calendar day in every real-world timezone
        let parsed = parse_date("2024-03-01T12:00:00Z").unwrap();
        assert_eq!(parsed, date(2024, 3, 1));
    }

    #[test]
    fn test_week_start_is_monday() {
        let wednesday = date(2024, 3, 6);
        assert_eq!(wednesday.weekday(), Weekday::Wed);
        assert_eq!(week_start(wednesday), Some(date(2024, 3, 4)));

        let sunday = date(2024, 3, 10);
        assert_eq!(week_start(sunday), Some(date(2024, 3, 4)));

        let monday = date(2024, 3, 4);
        assert_eq!(week_start(monday), Some(monday));
    }

    #[test]
    fn test_week_start_at_earliest_date() {
        let earliest = NaiveDate::MIN;
        assert_ne!(earliest.weekday(), Weekday::Mon);

        assert_eq!(week_start(earliest), None);
        assert!(!same_week(earliest, earliest));
        assert!(!same_week(earliest, date(2024, 3, 6)));
        assert!(same_month(earliest, earliest));

        // Stored dates this far back still parse
        let parsed = parse_date("-262143-01-02").unwrap();
        assert!(!same_week(parsed, date(2024, 3, 6)));
    }

    #[test]
    fn test_same_week_boundaries() {
        let wednesday = date(2024, 3, 6);

        assert!(same_week(date(2024, 3, 4), wednesday));
        assert!(same_week(date(2024, 3, 10), wednesday));
        assert!(!same_week(date(2024, 3, 3), wednesday));
        assert!(!same_week(date(2024, 2, 27), wednesday)); // 8 days before
        assert!(!same_week(date(2024, 3, 11), wednesday));
    }

    #[test]
    fn test_same_week_across_year_end() {
        // Monday 2024-12-30 starts the week that contains 2025-01-02
        assert!(same_week(date(2024, 12, 30), date(2025, 1, 2)));
        assert!(!same_month(date(2024, 12, 30), date(2025, 1, 2)));
    }

    #[test]
    fn test_same_month_requires_same_year() {
        assert!(same_month(date(2024, 3, 1), date(2024, 3, 31)));
        assert!(!same_month(date(2024, 3, 1), date(2023, 3, 1)));
        assert!(!same_month(date(2024, 3, 31), date(2024, 4, 1)));
    }

    #[test]
    fn test_reference_date_uses_instant_timezone() {
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2024, 3, 6, 23, 30, 0).unwrap();
        assert_eq!(reference_date(&now), date(2024, 3, 6));
        assert_eq!(format_iso(reference_date(&now)), "2024-03-06");
    }
}
