//! The process-wide current-time source.
//!
//! A single clock handler is resolved from configuration at start-up and
//! published once; every thread thereafter reads it lock-free. The built-in
//! handler serves the system clock; external time bases (a billing-center
//! reference clock, a frozen replay clock) plug in as [`ClockSource`]
//! implementations registered by name.
//!
//! Resolution is deliberately forgiving in exactly one case: a handler name
//! with no registered factory logs a warning and falls back to the local
//! handler. A factory that fails to construct is a fatal start-up error.

use std::sync::OnceLock;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calendar;
use crate::convert;
use crate::error::{Result, TemporalError};
use crate::instant::Instant;
use crate::registry::FormatPattern;

/// A strategy providing "current time in epoch milliseconds".
///
/// `is_local` asks the handler for the machine clock even when it normally
/// serves an external time base; the built-in handler ignores it. Handlers
/// hold no mutable state and must be callable from any thread.
pub trait ClockSource: Send + Sync {
    fn current_time_millis(&self, is_local: bool) -> i64;
}

/// The built-in system-clock handler.
#[derive(Debug, Default)]
pub struct LocalClock;

impl ClockSource for LocalClock {
    fn current_time_millis(&self, _is_local: bool) -> i64 {
        Utc::now().timestamp_millis()
    }
}

pub type BoxedClock = Box<dyn ClockSource>;

/// Constructor for an externally supplied clock handler. A construction
/// failure aborts initialization.
pub type ClockFactory = fn() -> std::result::Result<BoxedClock, String>;

/// Handler name of the built-in [`LocalClock`].
pub const LOCAL_HANDLER: &str = "local";

/// Configuration surface of the clock source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Name of the clock handler: [`LOCAL_HANDLER`] (the default when absent)
    /// or an identifier registered through [`initialize_with`].
    #[serde(default)]
    pub handler: Option<String>,
}

static CLOCK: OnceLock<BoxedClock> = OnceLock::new();

struct Resolution {
    handler: BoxedClock,
    fell_back: bool,
}

fn resolve(config: &ClockConfig, factories: &[(&str, ClockFactory)]) -> Result<Resolution> {
    let name = config.handler.as_deref().unwrap_or(LOCAL_HANDLER);
    if name.is_empty() || name == LOCAL_HANDLER {
        return Ok(Resolution {
            handler: Box::new(LocalClock),
            fell_back: false,
        });
    }
    match factories.iter().find(|(n, _)| *n == name) {
        Some((_, factory)) => match factory() {
            Ok(handler) => Ok(Resolution {
                handler,
                fell_back: false,
            }),
            Err(reason) => Err(TemporalError::ClockConstruction {
                handler: name.to_string(),
                reason,
            }),
        },
        None => {
            warn!(handler = name, "clock handler not registered, using the local handler");
            Ok(Resolution {
                handler: Box::new(LocalClock),
                fell_back: true,
            })
        }
    }
}

/// Resolve and install the process-wide clock handler using only the
/// built-in handlers.
pub fn initialize(config: &ClockConfig) -> Result<()> {
    initialize_with(config, &[])
}

/// Resolve and install the process-wide clock handler, consulting the given
/// `(name, factory)` registrations for non-built-in handler names.
///
/// An unregistered name is recovered by falling back to [`LocalClock`] with a
/// warning; a factory that returns an error is fatal. The first successful
/// initialization wins; later calls still validate their input but do not
/// replace the installed handler.
pub fn initialize_with(config: &ClockConfig, factories: &[(&str, ClockFactory)]) -> Result<()> {
    let resolution = resolve(config, factories)?;
    let _ = CLOCK.set(resolution.handler);
    Ok(())
}

fn handler() -> &'static dyn ClockSource {
    CLOCK.get_or_init(|| Box::new(LocalClock)).as_ref()
}

/// Current time in epoch milliseconds, from the installed handler.
pub fn current_time_millis(is_local: bool) -> i64 {
    handler().current_time_millis(is_local)
}

/// The current instant, from the installed handler's time base.
pub fn now() -> Instant {
    Instant::from_millis(current_time_millis(false))
}

/// Today as `yyyy-MM-dd`.
pub fn sys_date() -> Result<String> {
    sys_formatted(FormatPattern::Date)
}

/// The current datetime as `yyyy-MM-dd HH:mm:ss`.
pub fn sys_time() -> Result<String> {
    sys_formatted(FormatPattern::DateTime)
}

/// The current datetime in an arbitrary registered pattern.
pub fn sys_formatted(pattern: FormatPattern) -> Result<String> {
    convert::format(now(), pattern)
}

/// The current billing cycle as `yyyymm`.
pub fn current_cycle() -> Result<i32> {
    let now = now();
    Ok(calendar::get_year(now)? * 100 + calendar::get_month(now)?)
}

/// Today as a `yyyymmdd` integer.
pub fn current_yyyymmdd() -> Result<i32> {
    let now = now();
    Ok(calendar::get_year(now)? * 10_000
        + calendar::get_month(now)? * 100
        + calendar::get_day_of_month(now)?)
}

/// The current datetime as a compact `yyyyMMddHHmmss` integer.
pub fn current_yyyymmddhhmmss() -> Result<i64> {
    let now = now();
    Ok(i64::from(calendar::get_year(now)?) * 10_000_000_000
        + i64::from(calendar::get_month(now)?) * 100_000_000
        + i64::from(calendar::get_day_of_month(now)?) * 1_000_000
        + i64::from(calendar::get_hour(now)?) * 10_000
        + i64::from(calendar::get_minute(now)?) * 100
        + i64::from(calendar::get_second(now)?))
}
