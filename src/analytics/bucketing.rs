//! Calendar bucketing for nanosecond epoch timestamps.
//!
//! All boundaries are UTC-anchored. Weeks start on Sunday; the week key
//! `"{year}-W{nn}"` and the month key `"{year}-{mm}"` are fixed-width and
//! zero-padded, so a lexicographic sort is a chronological sort.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Nanosecond epoch timestamp to UTC datetime. Timestamps outside chrono's
/// representable range collapse to the epoch rather than panicking.
pub fn to_datetime(ns: i64) -> DateTime<Utc> {
    let secs = ns.div_euclid(NANOS_PER_SECOND);
    let subsec = ns.rem_euclid(NANOS_PER_SECOND) as u32;
    DateTime::from_timestamp(secs, subsec).unwrap_or(DateTime::UNIX_EPOCH)
}

pub fn utc_date(ns: i64) -> NaiveDate {
    to_datetime(ns).date_naive()
}

/// UTC calendar-day key, `YYYY-MM-DD`.
pub fn day_key(ns: i64) -> String {
    utc_date(ns).format("%Y-%m-%d").to_string()
}

/// Month-period key, `YYYY-MM`.
pub fn month_key(ns: i64) -> String {
    let date = utc_date(ns);
    format!("{:04}-{:02}", date.year(), date.month())
}

/// The Sunday that starts the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Week-period key, `YYYY-Wnn`. Year and week number belong to the week's
/// starting Sunday, so the first days of January can fall into the last
/// week of the previous year.
pub fn week_key(ns: i64) -> String {
    let sunday = week_start(utc_date(ns));
    format!("{:04}-W{:02}", sunday.year(), sunday.ordinal0() / 7 + 1)
}

/// Day-of-month (1..=31) when the timestamp lands in the given UTC
/// month/year, `None` otherwise.
pub fn day_of_month_in(ns: i64, month: u32, year: i32) -> Option<u32> {
    let date = utc_date(ns);
    if date.month() == month && date.year() == year {
        Some(date.day())
    } else {
        None
    }
}

/// `[start, end)` of the week containing `now_ns`, in epoch nanoseconds.
/// Start is Sunday 00:00:00 UTC.
pub fn week_bounds_ns(now_ns: i64) -> (i64, i64) {
    let start = week_start(utc_date(now_ns));
    let start_ns = start
        .and_hms_opt(0, 0, 0)
        .and_then(|dt| dt.and_utc().timestamp_nanos_opt())
        .unwrap_or(0);
    let end_ns = start_ns + 7 * 24 * 3600 * NANOS_PER_SECOND;
    (start_ns, end_ns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns_at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
            .and_utc()
            .timestamp_nanos_opt()
            .unwrap()
    }

    #[test]
    fn test_day_key_is_utc_anchored() {
        // One nanosecond before and after midnight land on different days.
        let midnight = ns_at(2024, 3, 15, 0, 0, 0);
        assert_eq!(day_key(midnight - 1), "2024-03-14");
        assert_eq!(day_key(midnight), "2024-03-15");
    }

    #[test]
    fn test_month_key_zero_padded() {
        assert_eq!(month_key(ns_at(2024, 1, 5, 12, 0, 0)), "2024-01");
        assert_eq!(month_key(ns_at(2024, 11, 5, 12, 0, 0)), "2024-11");
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 2024-03-10 was a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(week_start(sunday), sunday);
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        assert_eq!(week_start(saturday), sunday);
        let monday = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert_eq!(week_start(monday), sunday);
    }

    #[test]
    fn test_week_key_consistent_across_week() {
        let sunday = ns_at(2024, 3, 10, 0, 0, 0);
        let saturday_night = ns_at(2024, 3, 16, 23, 59, 59);
        assert_eq!(week_key(sunday), week_key(saturday_night));
        // The next Sunday starts a new week.
        let next_sunday = ns_at(2024, 3, 17, 0, 0, 0);
        assert_ne!(week_key(sunday), week_key(next_sunday));
    }

    #[test]
    fn test_week_key_year_boundary() {
        // 2024-01-01 was a Monday; its week started Sunday 2023-12-31,
        // so the key carries the previous year.
        let new_year = ns_at(2024, 1, 1, 10, 0, 0);
        assert_eq!(week_key(new_year), week_key(ns_at(2023, 12, 31, 0, 0, 0)));
        assert!(week_key(new_year).starts_with("2023-W"));
    }

    #[test]
    fn test_week_keys_sort_chronologically() {
        // Twenty consecutive weeks spanning a year boundary.
        let keys: Vec<String> = (0i64..20)
            .map(|i| week_key(ns_at(2023, 11, 1, 0, 0, 0) + i * 7 * 24 * 3600 * NANOS_PER_SECOND))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_day_of_month_in() {
        let ns = ns_at(2024, 2, 29, 18, 30, 0);
        assert_eq!(day_of_month_in(ns, 2, 2024), Some(29));
        assert_eq!(day_of_month_in(ns, 3, 2024), None);
        assert_eq!(day_of_month_in(ns, 2, 2023), None);
    }

    #[test]
    fn test_week_bounds_cover_now() {
        let now = ns_at(2024, 3, 13, 9, 0, 0);
        let (start, end) = week_bounds_ns(now);
        assert!(start <= now && now < end);
        assert_eq!(start, ns_at(2024, 3, 10, 0, 0, 0));
        assert_eq!(end, ns_at(2024, 3, 17, 0, 0, 0));
    }

    #[test]
    fn test_extreme_timestamps_do_not_panic() {
        let _ = day_key(i64::MAX);
        let _ = week_key(i64::MIN);
        let _ = month_key(-1);
    }
}
