//! Billing-cycle month math.
//!
//! Cycles are `yyyymm` integers (1-based month). Everything here is pure
//! integer arithmetic, independent of the calendar cursor, and safe to call
//! from any number of threads.

use crate::error::{Result, TemporalError};

/// Days per month in a non-leap year.
pub const MONTH_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// The last billing cycle the platform schedules.
pub const LAST_CYCLE: i32 = 205012;

/// Proleptic Gregorian leap-year rule: divisible by 400, or by 4 and not
/// by 100.
pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

/// The cycle `delta_months` months away from `yyyymm`, carrying across year
/// boundaries in both directions.
pub fn gen_cycle(yyyymm: i32, delta_months: i32) -> i32 {
    let total = (yyyymm / 100) * 12 + (yyyymm % 100 - 1) + delta_months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) + 1;
    year * 100 + month
}

/// Signed month difference between two cycles; positive when `a` is later.
pub fn diff_months(a: i32, b: i32) -> i32 {
    (a / 100 - b / 100) * 12 + (a % 100 - b % 100)
}

/// Number of days in the month of `yyyymm`.
///
/// # Errors
///
/// Returns [`TemporalError::InvalidCycle`] when the month component is
/// outside 1-12.
pub fn last_day(yyyymm: i32) -> Result<u32> {
    let year = yyyymm / 100;
    let month = yyyymm % 100;
    if !(1..=12).contains(&month) {
        return Err(TemporalError::InvalidCycle(yyyymm));
    }
    if month != 2 {
        Ok(MONTH_DAYS[(month - 1) as usize])
    } else if is_leap_year(year) {
        Ok(29)
    } else {
        Ok(28)
    }
}
