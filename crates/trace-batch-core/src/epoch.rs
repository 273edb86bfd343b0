//! Conversion from broken-down UTC calendar fields to epoch seconds.
//!
//! Trace headers carry their start time as separate calendar fields (year,
//! day-of-year, hour, minute, second). This module maps them onto a single
//! signed `i64` of seconds since `1970-01-01T00:00:00Z` with a hand-rolled
//! proleptic-Gregorian day count, so the result:
//!
//! - never consults the process timezone database or `TZ`,
//! - matches POSIX `timegm` for dates on or after 1970,
//! - is negative and exact for pre-1970 input.
//!
//! Calendar fields are **not** validated. A day-of-year of 400 simply lands
//! in the following year; callers that need rejection must pre-validate.

/// Gregorian leap-year rule on a `tm_year`-style year (offset from 1900).
fn is_leap_year(years_since_1900: i32) -> bool {
    let y = years_since_1900 + 1900;
    y % 4 == 0 && (y % 100 != 0 || y % 400 == 0)
}

/// Convert broken-down UTC fields to signed seconds since the Unix epoch.
///
/// `years_since_1900` follows the `tm_year` convention (70 means 1970);
/// `day_of_year` is 1-based. Whole-year day blocks are accumulated between
/// 1970 and the target year, then `day_of_year - 1` days and the clock
/// fields are added. No timezone or DST adjustment is applied; inputs are
/// assumed to already be UTC.
pub fn utc_epoch_seconds(
    years_since_1900: i32,
    day_of_year: i32,
    hour: i32,
    minute: i32,
    second: i32,
) -> i64 {
    let mut days: i64 = 0;
    if years_since_1900 >= 70 {
        for y in 70..years_since_1900 {
            days += if is_leap_year(y) { 366 } else { 365 };
        }
    } else {
        for y in years_since_1900..70 {
            days -= if is_leap_year(y) { 366 } else { 365 };
        }
    }
    days += i64::from(day_of_year) - 1;

    ((days * 24 + i64::from(hour)) * 60 + i64::from(minute)) * 60 + i64::from(second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Reference value from chrono for the same broken-down fields.
    fn chrono_epoch(year: i32, yday: u32, hour: u32, min: u32, sec: u32) -> i64 {
        NaiveDate::from_yo_opt(year, yday)
            .expect("valid ordinal date")
            .and_hms_opt(hour, min, sec)
            .expect("valid clock time")
            .and_utc()
            .timestamp()
    }

    #[test]
    fn epoch_origin_is_zero() {
        assert_eq!(utc_epoch_seconds(70, 1, 0, 0, 0), 0);
    }

    #[test]
    fn matches_chrono_across_leap_and_common_years() {
        // (year, yday) pairs spanning common years, leap years, and the
        // century rule; Feb 29 of 2020 is yday 60, Dec 31 of 2020 is yday 366.
        let cases = [
            (1970, 100),
            (1971, 365),
            (1972, 60), // Feb 29 1972
            (1999, 1),
            (2000, 60), // Feb 29 2000 (divisible by 400)
            (2004, 366),
            (2019, 365),
            (2020, 60),  // Feb 29 2020
            (2020, 366), // Dec 31 2020
            (2021, 60),
            (2038, 19), // past the 32-bit rollover
        ];
        for (year, yday) in cases {
            assert_eq!(
                utc_epoch_seconds(year - 1900, yday, 12, 34, 56),
                chrono_epoch(year, yday as u32, 12, 34, 56),
                "mismatch for {year}-{yday:03}",
            );
        }
    }

    #[test]
    fn pre_epoch_dates_are_negative_and_exact() {
        // One second before the epoch.
        assert_eq!(utc_epoch_seconds(69, 365, 23, 59, 59), -1);
        assert_eq!(
            utc_epoch_seconds(60, 60, 0, 0, 0),
            chrono_epoch(1960, 60, 0, 0, 0)
        );
        assert_eq!(
            utc_epoch_seconds(1, 1, 0, 0, 0),
            chrono_epoch(1901, 1, 0, 0, 0)
        );
    }

    #[test]
    fn century_years_follow_gregorian_rule() {
        // 2100 is not a leap year; a date after Feb 28 2100 still matches.
        assert_eq!(
            utc_epoch_seconds(200, 60, 6, 0, 0),
            chrono_epoch(2100, 60, 6, 0, 0)
        );
    }

    #[test]
    fn out_of_range_day_of_year_rolls_forward() {
        // Day 366 of a common year is Jan 1 of the next; not validated here.
        assert_eq!(
            utc_epoch_seconds(71, 366, 0, 0, 0),
            chrono_epoch(1972, 1, 0, 0, 0)
        );
    }
}
