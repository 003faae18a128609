//! Calendar-field arithmetic over a per-thread calendar cursor.
//!
//! Field extraction and the MONTH/DATE comparison units read through a
//! mutable [`CalendarCursor`] owned by the calling thread. The cursor is
//! fully overwritten on every read, so no call can observe fields left over
//! from a previous instant, and it is never handed to another thread.
//! Addition and the remaining comparison units are pure computations.

use std::cell::RefCell;

use chrono::{Datelike, Days, Local, Months, NaiveTime, TimeZone, Timelike};

use crate::convert::{self, local_datetime};
use crate::error::{Result, TemporalError};
use crate::instant::Instant;
use crate::registry::FormatPattern;

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60_000;
pub const MILLIS_PER_HOUR: i64 = 3_600_000;
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Earliest datetime the platform schedules against.
pub const FIRST_DATETIME: &str = "1900-01-01 00:00:00";
/// Latest datetime the platform schedules against.
pub const LAST_DATETIME: &str = "2050-12-31 23:59:59";
/// Latest date the platform schedules against.
pub const LAST_DATE: &str = "2050-12-31";
/// Appended to a `yyyy-MM-dd` literal to pin the start of that day.
pub const DAY_START: &str = " 00:00:00";
/// Appended to a `yyyy-MM-dd` literal to pin the end of that day.
pub const DAY_END: &str = " 23:59:59";

/// A calendar field, for extraction and addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// Granularity for [`compare`]. Every unit except [`CompareUnit::Millisecond`]
/// truncates both operands to the unit before subtracting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareUnit {
    Second,
    Minute,
    Hour,
    /// Calendar-day granularity, offset-corrected so two instants on the same
    /// local day compare equal across midnight boundaries.
    Date,
    Month,
    Year,
    /// Fallback: raw millisecond subtraction.
    Millisecond,
}

/// Thread-confined mutable snapshot of one instant's calendar fields.
#[derive(Debug, Default)]
struct CalendarCursor {
    year: i32,
    /// 1-based.
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    /// UTC offset of the local zone at the snapshotted instant, in millis.
    raw_offset_millis: i64,
}

impl CalendarCursor {
    /// Re-point the cursor at `instant`, overwriting every field.
    fn reset(&mut self, instant: Instant) -> Result<()> {
        let dt = local_datetime(instant)?;
        self.year = dt.year();
        self.month = dt.month();
        self.day = dt.day();
        self.hour = dt.hour();
        self.minute = dt.minute();
        self.second = dt.second();
        self.raw_offset_millis = i64::from(dt.offset().local_minus_utc()) * MILLIS_PER_SECOND;
        Ok(())
    }
}

thread_local! {
    static CURSOR: RefCell<CalendarCursor> = RefCell::new(CalendarCursor::default());
}

fn read_cursor<R>(instant: Instant, f: impl FnOnce(&CalendarCursor) -> R) -> Result<R> {
    CURSOR.with(|cursor| {
        let mut cursor = cursor.borrow_mut();
        cursor.reset(instant)?;
        Ok(f(&cursor))
    })
}

/// Extract one calendar field of `instant` in the local zone.
pub fn get(instant: Instant, field: DateField) -> Result<i32> {
    read_cursor(instant, |c| match field {
        DateField::Year => c.year,
        DateField::Month => c.month as i32,
        DateField::Day => c.day as i32,
        DateField::Hour => c.hour as i32,
        DateField::Minute => c.minute as i32,
        DateField::Second => c.second as i32,
    })
}

pub fn get_year(instant: Instant) -> Result<i32> {
    get(instant, DateField::Year)
}

/// 1-based month.
pub fn get_month(instant: Instant) -> Result<i32> {
    get(instant, DateField::Month)
}

pub fn get_day_of_month(instant: Instant) -> Result<i32> {
    get(instant, DateField::Day)
}

pub fn get_hour(instant: Instant) -> Result<i32> {
    get(instant, DateField::Hour)
}

pub fn get_minute(instant: Instant) -> Result<i32> {
    get(instant, DateField::Minute)
}

pub fn get_second(instant: Instant) -> Result<i32> {
    get(instant, DateField::Second)
}

/// Add `amount` of `field` to `instant`, returning a new instant.
///
/// Uses standard calendar roll-over semantics: adding a month to January 31
/// clamps to the last day of February, adding months past December carries
/// into the next year. Time fields are plain millisecond arithmetic.
pub fn add(instant: Instant, field: DateField, amount: i32) -> Result<Instant> {
    match field {
        DateField::Hour => {
            Ok(Instant::from_millis(instant.millis() + i64::from(amount) * MILLIS_PER_HOUR))
        }
        DateField::Minute => {
            Ok(Instant::from_millis(instant.millis() + i64::from(amount) * MILLIS_PER_MINUTE))
        }
        DateField::Second => {
            Ok(Instant::from_millis(instant.millis() + i64::from(amount) * MILLIS_PER_SECOND))
        }
        DateField::Year | DateField::Month | DateField::Day => {
            let naive = local_datetime(instant)?.naive_local();
            let magnitude = amount.unsigned_abs();
            let shifted = match field {
                DateField::Day => {
                    let days = Days::new(u64::from(magnitude));
                    if amount >= 0 {
                        naive.checked_add_days(days)
                    } else {
                        naive.checked_sub_days(days)
                    }
                }
                _ => {
                    let months = if field == DateField::Year {
                        magnitude.saturating_mul(12)
                    } else {
                        magnitude
                    };
                    if amount >= 0 {
                        naive.checked_add_months(Months::new(months))
                    } else {
                        naive.checked_sub_months(Months::new(months))
                    }
                }
            }
            .ok_or_else(|| {
                TemporalError::OutOfRange(format!("date arithmetic overflow from {naive}"))
            })?;
            relocalize(shifted)
        }
    }
}

fn relocalize(naive: chrono::NaiveDateTime) -> Result<Instant> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| Instant::from_millis(dt.timestamp_millis()))
        .ok_or_else(|| TemporalError::OutOfRange(format!("nonexistent local time '{naive}'")))
}

/// Add `amount` of `field` to a date literal, answering in the literal's own
/// inferred pattern.
pub fn date_add(date: &str, field: DateField, amount: i32) -> Result<String> {
    let pattern = FormatPattern::infer(date.len())?;
    let instant = convert::parse_with(date, pattern)?.ok_or(TemporalError::BlankLiteral)?;
    convert::format(add(instant, field, amount)?, pattern)
}

pub fn date_add_year(date: &str, years: i32) -> Result<String> {
    date_add(date, DateField::Year, years)
}

pub fn date_add_month(date: &str, months: i32) -> Result<String> {
    date_add(date, DateField::Month, months)
}

pub fn date_add_day(date: &str, days: i32) -> Result<String> {
    date_add(date, DateField::Day, days)
}

pub fn date_add_hour(date: &str, hours: i32) -> Result<String> {
    date_add(date, DateField::Hour, hours)
}

pub fn date_add_minute(date: &str, minutes: i32) -> Result<String> {
    date_add(date, DateField::Minute, minutes)
}

pub fn date_add_second(date: &str, seconds: i32) -> Result<String> {
    date_add(date, DateField::Second, seconds)
}

/// Compare two instants at the given granularity. The sign of the result
/// indicates direction; its magnitude is the unit difference.
pub fn compare(a: Instant, b: Instant, unit: CompareUnit) -> Result<i64> {
    let t1 = a.millis();
    let t2 = b.millis();
    match unit {
        CompareUnit::Second => Ok(t1 / MILLIS_PER_SECOND - t2 / MILLIS_PER_SECOND),
        CompareUnit::Minute => Ok(t1 / MILLIS_PER_MINUTE - t2 / MILLIS_PER_MINUTE),
        CompareUnit::Hour => Ok(t1 / MILLIS_PER_HOUR - t2 / MILLIS_PER_HOUR),
        CompareUnit::Date => {
            // The first operand's offset is applied to both, so a pair on the
            // same local day lands in the same day bucket.
            let raw_offset = read_cursor(a, |c| c.raw_offset_millis)?;
            Ok((t1 + raw_offset) / MILLIS_PER_DAY - (t2 + raw_offset) / MILLIS_PER_DAY)
        }
        CompareUnit::Month => {
            let (y1, m1) = read_cursor(a, |c| (c.year, c.month as i32))?;
            let (y2, m2) = read_cursor(b, |c| (c.year, c.month as i32))?;
            Ok(i64::from(y1 * 12 + m1) - i64::from(y2 * 12 + m2))
        }
        CompareUnit::Year => {
            let y1 = read_cursor(a, |c| c.year)?;
            let y2 = read_cursor(b, |c| c.year)?;
            Ok(i64::from(y1) - i64::from(y2))
        }
        CompareUnit::Millisecond => Ok(t1 - t2),
    }
}

/// Compare two date literals at the given granularity.
pub fn compare_dates(a: &str, b: &str, unit: CompareUnit) -> Result<i64> {
    compare(
        convert::parse_required(a)?,
        convert::parse_required(b)?,
        unit,
    )
}

/// Whole calendar days from `b` to `a` (positive when `a` is later).
pub fn days_between(a: &str, b: &str) -> Result<i64> {
    compare_dates(a, b, CompareUnit::Date)
}

/// The date of `day` within the month of `date`, clipping `day` to the
/// month's actual last day: asking for day 31 of a 30-day month answers the
/// 30th. The clipping is intentional truncation, not rounding, and mirrors
/// the answer's separator style to the input (`yyyy-MM...` or `yyyyMM...`).
pub fn date_of_month(date: &str, day: u32) -> Result<String> {
    let malformed = || TemporalError::MalformedLiteral {
        text: date.to_string(),
        pattern: "yyyy-MM".to_string(),
    };
    let year: i32 = date
        .get(..4)
        .and_then(|s| s.parse().ok())
        .ok_or_else(malformed)?;
    let dashed = date.as_bytes().get(4) == Some(&b'-');
    let month_idx = if dashed { 5 } else { 4 };
    let month: u32 = date
        .get(month_idx..month_idx + 2)
        .and_then(|s| s.parse().ok())
        .ok_or_else(malformed)?;

    let max_day = crate::cycle::last_day(year * 100 + month as i32)?;
    let day = day.min(max_day);
    Ok(if dashed {
        format!("{year:04}-{month:02}-{day:02}")
    } else {
        format!("{year:04}{month:02}{day:02}")
    })
}

/// The first day of the month of `date`.
pub fn first_date_of_month(date: &str) -> Result<String> {
    date_of_month(date, 1)
}

/// The last day of the month of `date`.
pub fn last_date_of_month(date: &str) -> Result<String> {
    date_of_month(date, 31)
}

/// Replace the time-of-day fields of `instant`, keeping its local date.
pub fn at_time(instant: Instant, hour: u32, minute: u32, second: u32) -> Result<Instant> {
    let date = local_datetime(instant)?.date_naive();
    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
        TemporalError::OutOfRange(format!("time {hour:02}:{minute:02}:{second:02}"))
    })?;
    relocalize(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(literal: &str) -> Instant {
        convert::parse(literal).unwrap().unwrap()
    }

    #[test]
    fn test_field_extraction() {
        let i = instant("2024-02-29 13:45:07");
        assert_eq!(get_year(i).unwrap(), 2024);
        assert_eq!(get_month(i).unwrap(), 2);
        assert_eq!(get_day_of_month(i).unwrap(), 29);
        assert_eq!(get_hour(i).unwrap(), 13);
        assert_eq!(get_minute(i).unwrap(), 45);
        assert_eq!(get_second(i).unwrap(), 7);
    }

    #[test]
    fn test_cursor_fully_overwritten_between_reads() {
        let late = instant("2024-12-31 23:59:59");
        let early = instant("2023-01-01 00:00:00");
        assert_eq!(get_second(late).unwrap(), 59);
        // No field of the previous instant may leak into this read.
        assert_eq!(get_second(early).unwrap(), 0);
        assert_eq!(get_year(early).unwrap(), 2023);
        assert_eq!(get_month(early).unwrap(), 1);
    }

    #[test]
    fn test_day_add_rolls_over_month() {
        assert_eq!(date_add_day("2024-01-31", 1).unwrap(), "2024-02-01");
        assert_eq!(date_add_day("2024-02-29", 1).unwrap(), "2024-03-01");
        assert_eq!(date_add_day("2024-01-01", -1).unwrap(), "2023-12-31");
    }

    #[test]
    fn test_month_add_clamps_to_month_end() {
        assert_eq!(date_add_month("2024-01-31", 1).unwrap(), "2024-02-29");
        assert_eq!(date_add_month("2023-01-31", 1).unwrap(), "2023-02-28");
        assert_eq!(date_add_month("2024-03-31", -1).unwrap(), "2024-02-29");
        assert_eq!(date_add_month("2024-11-30", 2).unwrap(), "2025-01-30");
    }

    #[test]
    fn test_year_add_clamps_leap_day() {
        assert_eq!(date_add_year("2024-02-29", 1).unwrap(), "2025-02-28");
        assert_eq!(date_add_year("2024-02-29", 4).unwrap(), "2028-02-29");
    }

    #[test]
    fn test_time_adds_carry_into_next_day() {
        assert_eq!(
            date_add_hour("2024-06-30 23:00:00", 2).unwrap(),
            "2024-07-01 01:00:00"
        );
        assert_eq!(
            date_add_minute("2024-06-10 10:59:30", 1).unwrap(),
            "2024-06-10 11:00:30"
        );
        assert_eq!(
            date_add_second("2024-06-10 10:00:59", 2).unwrap(),
            "2024-06-10 10:01:01"
        );
    }

    #[test]
    fn test_date_add_answers_in_input_pattern() {
        assert_eq!(date_add_day("20240229", 1).unwrap(), "20240301");
        assert_eq!(date_add_month("202401", 1).unwrap(), "202402");
    }

    #[test]
    fn test_add_never_mutates_input() {
        let i = instant("2024-06-10");
        let _ = add(i, DateField::Day, 5).unwrap();
        assert_eq!(get_day_of_month(i).unwrap(), 10);
    }

    #[test]
    fn test_compare_date_same_local_day_is_zero() {
        assert_eq!(
            compare_dates(
                "2024-06-10 00:00:01",
                "2024-06-10 23:59:59",
                CompareUnit::Date
            )
            .unwrap(),
            0
        );
    }

    #[test]
    fn test_compare_date_across_midnight() {
        assert_eq!(
            compare_dates(
                "2024-06-11 00:00:01",
                "2024-06-10 23:59:59",
                CompareUnit::Date
            )
            .unwrap(),
            1
        );
    }

    #[test]
    fn test_compare_month_ignores_day_and_time() {
        assert_eq!(
            compare_dates("2024-01-31", "2023-12-01", CompareUnit::Month).unwrap(),
            1
        );
        assert_eq!(
            compare_dates("2023-12-01", "2024-01-31", CompareUnit::Month).unwrap(),
            -1
        );
    }

    #[test]
    fn test_compare_year() {
        assert_eq!(
            compare_dates("2024-01-01", "2023-12-31", CompareUnit::Year).unwrap(),
            1
        );
    }

    #[test]
    fn test_compare_truncates_not_rounds() {
        assert_eq!(
            compare_dates(
                "2024-06-10 10:00:59",
                "2024-06-10 10:00:00",
                CompareUnit::Minute
            )
            .unwrap(),
            0
        );
        assert_eq!(
            compare_dates(
                "2024-06-10 10:01:00",
                "2024-06-10 10:00:59",
                CompareUnit::Minute
            )
            .unwrap(),
            1
        );
    }

    #[test]
    fn test_compare_millisecond_fallback() {
        let a = Instant::from_millis(1_500);
        let b = Instant::from_millis(1_000);
        assert_eq!(compare(a, b, CompareUnit::Millisecond).unwrap(), 500);
    }

    #[test]
    fn test_days_between_spans_leap_february() {
        assert_eq!(days_between("2024-03-01", "2024-02-01").unwrap(), 29);
        assert_eq!(days_between("2023-03-01", "2023-02-01").unwrap(), 28);
    }

    #[test]
    fn test_compare_blank_literal_rejected() {
        let err = compare_dates("", "2024-06-10", CompareUnit::Date).unwrap_err();
        assert!(matches!(err, TemporalError::BlankLiteral));
    }

    #[test]
    fn test_date_of_month_clips_to_real_month_end() {
        assert_eq!(date_of_month("2024-02", 31).unwrap(), "2024-02-29");
        assert_eq!(date_of_month("2023-02", 31).unwrap(), "2023-02-28");
        assert_eq!(date_of_month("2024-04-15", 31).unwrap(), "2024-04-30");
        assert_eq!(date_of_month("202402", 31).unwrap(), "20240229");
    }

    #[test]
    fn test_first_and_last_date_of_month() {
        assert_eq!(first_date_of_month("2024-02-15").unwrap(), "2024-02-01");
        assert_eq!(last_date_of_month("2024-04-05").unwrap(), "2024-04-30");
        assert_eq!(last_date_of_month("20241105").unwrap(), "20241130");
    }

    #[test]
    fn test_at_time_replaces_time_of_day() {
        let i = instant("2024-06-10 13:45:07");
        let pinned = at_time(i, 0, 0, 0).unwrap();
        assert_eq!(
            convert::format(pinned, FormatPattern::DateTime).unwrap(),
            "2024-06-10 00:00:00"
        );
        assert!(at_time(i, 24, 0, 0).is_err());
    }

    #[test]
    fn test_day_boundary_constants_compose() {
        let day_end = format!("{}{}", "2024-06-10", DAY_END);
        assert_eq!(day_end, "2024-06-10 23:59:59");
        assert!(convert::parse(&day_end).unwrap().is_some());

        let day_start = format!("{}{}", "2024-06-10", DAY_START);
        assert!(convert::parse(&day_start).unwrap().is_some());
        assert!(convert::parse(FIRST_DATETIME).unwrap().is_some());
        assert!(convert::parse(LAST_DATETIME).unwrap().is_some());
        assert!(convert::parse(LAST_DATE).unwrap().is_some());
    }

    #[test]
    fn test_threads_never_observe_each_others_cursor() {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                std::thread::spawn(move || {
                    let day = n + 1;
                    let i = instant(&format!("2024-06-{day:02} 10:00:{n:02}"));
                    for _ in 0..500 {
                        assert_eq!(get_day_of_month(i).unwrap(), day);
                        assert_eq!(get_second(i).unwrap(), n);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
