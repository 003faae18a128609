//! # cycle-engine
//!
//! Deterministic temporal computation for billing pipelines.
//!
//! The engine infers date formats from literal length, converts literals to
//! and from epoch-millisecond instants, performs calendar-field arithmetic,
//! and does pure integer month math over `yyyymm` billing cycles. The
//! current-time source is a process-wide handler resolved once from
//! configuration, defaulting to the system clock.
//!
//! Mutable formatting and calendar state is thread-confined: each thread
//! owns its own compiled-formatter cache and calendar cursor, so no
//! operation needs a lock and no call can observe another thread's state.
//!
//! ## Modules
//!
//! - [`registry`] — literal length → canonical pattern table
//! - [`clock`] — pluggable current-time source and "now" helpers
//! - [`convert`] — literal ↔ instant parsing and formatting
//! - [`calendar`] — field extraction, field addition, unit comparison
//! - [`cycle`] — `yyyymm` billing-cycle arithmetic
//! - [`instant`] — the opaque epoch-millisecond point in time
//! - [`timer`] — monotonic stopwatch
//! - [`error`] — error types

pub mod calendar;
pub mod clock;
pub mod convert;
pub mod cycle;
pub mod error;
pub mod instant;
pub mod registry;
pub mod timer;

pub use calendar::{
    add, at_time, compare, compare_dates, date_add, date_add_day, date_add_hour,
    date_add_minute, date_add_month, date_add_second, date_add_year, date_of_month,
    days_between, first_date_of_month, get, get_day_of_month, get_hour, get_minute, get_month,
    get_second, get_year, last_date_of_month, CompareUnit, DateField,
};
pub use clock::{
    current_cycle, current_time_millis, current_yyyymmdd, current_yyyymmddhhmmss, initialize,
    initialize_with, now, sys_date, sys_formatted, sys_time, BoxedClock, ClockConfig,
    ClockFactory, ClockSource, LocalClock, LOCAL_HANDLER,
};
pub use convert::{format, parse, parse_with, reformat};
pub use cycle::{diff_months, gen_cycle, is_leap_year, last_day};
pub use error::TemporalError;
pub use instant::Instant;
pub use registry::FormatPattern;
pub use timer::Stopwatch;
