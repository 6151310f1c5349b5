//! Calendar arithmetic for habit bookkeeping.
//!
//! All day-level comparisons happen at local-midnight resolution: two
//! instants are "the same day" iff their local calendar dates are equal.
//! Functions that read the wall clock (`today`, `week_start_now`) should be
//! called once per operation and the value threaded through, so a single
//! operation never straddles a midnight boundary.

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Current date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Midnight-normalize a stored timestamp to its local calendar date.
pub fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// The most recent Sunday on or before `today`. The week begins on Sunday;
/// this is fixed, not configurable.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(today.weekday().num_days_from_sunday() as i64)
}

/// Week start relative to the current local date.
pub fn week_start_now() -> NaiveDate {
    week_start(today())
}

/// Ceiling of the absolute number of elapsed days between two instants.
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    let ms = (b - a).num_milliseconds().abs();
    (ms + MS_PER_DAY - 1) / MS_PER_DAY
}

/// Local midnight of the given date, as a UTC instant. Falls back to UTC
/// midnight if local midnight does not exist (DST transition).
pub fn day_start(day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&midnight),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_start_is_most_recent_sunday() {
        // 2025-06-04 is a Wednesday
        assert_eq!(week_start(d(2025, 6, 4)), d(2025, 6, 1));
        // A Sunday is its own week start
        assert_eq!(week_start(d(2025, 6, 1)), d(2025, 6, 1));
        // Saturday belongs to the week that started six days earlier
        assert_eq!(week_start(d(2025, 6, 7)), d(2025, 6, 1));
    }

    #[test]
    fn week_start_crosses_month_boundary() {
        // 2025-05-01 is a Thursday; its week started on Sunday April 27
        assert_eq!(week_start(d(2025, 5, 1)), d(2025, 4, 27));
    }

    #[test]
    fn days_between_is_ceiling_of_elapsed_days() {
        let a = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(days_between(a, a), 0);
        // Exactly one day
        let b = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
        assert_eq!(days_between(a, b), 1);
        // One day and one second rounds up to two
        let c = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 1).unwrap();
        assert_eq!(days_between(a, c), 2);
        // Order does not matter
        assert_eq!(days_between(c, a), 2);
    }

    #[test]
    fn day_start_round_trips_through_local_day() {
        let day = d(2025, 6, 4);
        assert_eq!(local_day(day_start(day)), day);
    }
}
