//! Literal ↔ instant conversion.
//!
//! Parsing resolves a pattern from the literal's length via the format
//! registry unless the caller names one explicitly, then interprets the
//! wall-clock fields in the system local zone. Formatting is the inverse.
//! Both go through a per-thread cache of compiled strftime items, so the
//! cost of building a formatter is paid once per (thread, pattern) and the
//! cached state is never visible to another thread.
//!
//! Blank input is "no value", not an error: [`parse`] returns `Ok(None)` and
//! [`reformat`] echoes the input. A literal that does not match its pattern
//! fails with [`TemporalError::MalformedLiteral`].

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::format::{parse as parse_items, Item, Parsed, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};

use crate::error::{Result, TemporalError};
use crate::instant::Instant;
use crate::registry::{FormatPattern, Fraction};

thread_local! {
    // One compiled item list per pattern, owned by this thread for its
    // lifetime. The pattern set is finite, so the map never needs eviction.
    static FORMAT_ITEMS: RefCell<HashMap<FormatPattern, Vec<Item<'static>>>> =
        RefCell::new(HashMap::new());
}

fn with_items<R>(pattern: FormatPattern, f: impl FnOnce(&[Item<'static>]) -> R) -> R {
    FORMAT_ITEMS.with(|cache| {
        let mut cache = cache.borrow_mut();
        let items = cache
            .entry(pattern)
            .or_insert_with(|| StrftimeItems::new(pattern.strftime()).collect());
        f(items.as_slice())
    })
}

/// Blank predicate at the boundary of the general string helpers: empty or
/// whitespace-only.
fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Parse a literal into an [`Instant`], inferring the pattern from the
/// literal's length.
///
/// # Errors
///
/// Returns [`TemporalError::AmbiguousLength`] if the length has no registered
/// pattern, or [`TemporalError::MalformedLiteral`] if the text does not match
/// the inferred pattern. Blank input is `Ok(None)`.
pub fn parse(text: &str) -> Result<Option<Instant>> {
    if is_blank(text) {
        return Ok(None);
    }
    let pattern = FormatPattern::infer(text.len())?;
    parse_literal(text, pattern).map(Some)
}

/// Parse a literal against an explicit pattern, bypassing length inference.
pub fn parse_with(text: &str, pattern: FormatPattern) -> Result<Option<Instant>> {
    if is_blank(text) {
        return Ok(None);
    }
    parse_literal(text, pattern).map(Some)
}

/// Parse a literal that must carry a value.
pub(crate) fn parse_required(text: &str) -> Result<Instant> {
    parse(text)?.ok_or(TemporalError::BlankLiteral)
}

fn parse_literal(text: &str, pattern: FormatPattern) -> Result<Instant> {
    let malformed = || TemporalError::MalformedLiteral {
        text: text.to_string(),
        pattern: pattern.to_string(),
    };

    let (base, extra_millis) = split_fraction(text, pattern).ok_or_else(malformed)?;

    let mut parsed = Parsed::new();
    with_items(pattern, |items| parse_items(&mut parsed, base, items.iter()))
        .map_err(|_| malformed())?;

    // Fields the pattern does not carry default to the start of their unit.
    if !pattern.has_month() {
        parsed.set_month(1).map_err(|_| malformed())?;
    }
    if !pattern.has_day() {
        parsed.set_day(1).map_err(|_| malformed())?;
    }
    if !pattern.has_hour() {
        parsed.set_hour(0).map_err(|_| malformed())?;
    }
    if !pattern.has_minute() {
        parsed.set_minute(0).map_err(|_| malformed())?;
    }
    if !pattern.has_second() {
        parsed.set_second(0).map_err(|_| malformed())?;
    }

    let naive = parsed
        .to_naive_datetime_with_offset(0)
        .map_err(|_| malformed())?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| TemporalError::OutOfRange(format!("nonexistent local time '{naive}'")))?;
    Ok(Instant::from_millis(local.timestamp_millis() + extra_millis))
}

/// Split the millisecond digits off a fractional pattern's literal. The
/// digits are a millisecond value (`SimpleDateFormat` `S` semantics), not a
/// decimal fraction: `"...:01.5"` is one second and five milliseconds.
fn split_fraction(text: &str, pattern: FormatPattern) -> Option<(&str, i64)> {
    match pattern.fraction() {
        Fraction::None => Some((text, 0)),
        Fraction::Bare => {
            let base = text.get(..pattern.base_len())?;
            let millis = parse_millis(text.get(pattern.base_len()..)?)?;
            Some((base, millis))
        }
        Fraction::Dotted => {
            let base = text.get(..pattern.base_len())?;
            if text.as_bytes().get(pattern.base_len()) != Some(&b'.') {
                return None;
            }
            let millis = parse_millis(text.get(pattern.base_len() + 1..)?)?;
            Some((base, millis))
        }
    }
}

fn parse_millis(digits: &str) -> Option<i64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Render an instant as a literal of the given pattern.
///
/// Deterministic for a given `(instant, pattern)` pair.
///
/// # Errors
///
/// Returns [`TemporalError::OutOfRange`] if the instant is outside chrono's
/// representable range.
pub fn format(instant: Instant, pattern: FormatPattern) -> Result<String> {
    let local = local_datetime(instant)?;
    let mut out = with_items(pattern, |items| {
        local
            .naive_local()
            .format_with_items(items.iter())
            .to_string()
    });
    match pattern.fraction() {
        Fraction::None => {}
        Fraction::Bare => out.push_str(&local.timestamp_subsec_millis().to_string()),
        Fraction::Dotted => {
            out.push('.');
            out.push_str(&local.timestamp_subsec_millis().to_string());
        }
    }
    Ok(out)
}

/// Re-express a literal in another pattern.
///
/// A literal whose length already equals the target pattern's length passes
/// through unchanged. This is a fast path that assumes a matching shape, not
/// a validator. Blank input is echoed back.
pub fn reformat(text: &str, pattern: FormatPattern) -> Result<String> {
    if is_blank(text) {
        return Ok(text.to_string());
    }
    if text.len() == pattern.literal_len() {
        return Ok(text.to_string());
    }
    let instant = parse_literal(text, FormatPattern::infer(text.len())?)?;
    format(instant, pattern)
}

/// Interpret an instant in the system local zone.
pub(crate) fn local_datetime(instant: Instant) -> Result<DateTime<Local>> {
    Local
        .timestamp_millis_opt(instant.millis())
        .earliest()
        .ok_or_else(|| TemporalError::OutOfRange(format!("instant {} ms", instant.millis())))
}
