//! The format registry: literal length → canonical date/time pattern.
//!
//! This table is the single source of truth for format inference. Lengths
//! without an entry (including the intentionally ambiguous ones such as 9,
//! 11, 12, 17, 18 and 20) fail with [`TemporalError::AmbiguousLength`] and
//! are never guessed at elsewhere in the crate.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, TemporalError};

/// One of the canonical literal patterns the engine understands.
///
/// Each pattern corresponds to exactly one literal length, so a well-formed
/// literal identifies its own pattern. The two `*Millis` patterns carry a
/// trailing millisecond *value* (unpadded digits, `SimpleDateFormat`-style),
/// not a decimal fraction of a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FormatPattern {
    /// `yyyy` — length 4.
    Year,
    /// `yyyyMM` — length 6.
    CompactMonth,
    /// `yyyy-MM` — length 7.
    Month,
    /// `yyyyMMdd` — length 8.
    CompactDate,
    /// `yyyy-MM-dd` — length 10.
    Date,
    /// `yyyy-MM-dd HH` — length 13.
    DateHour,
    /// `yyyyMMddHHmmss` — length 14.
    CompactDateTime,
    /// `yyyyMMddHHmmssS` — length 15 for a single millisecond digit.
    CompactDateTimeMillis,
    /// `yyyy-MM-dd HH:mm` — length 16.
    DateMinute,
    /// `yyyy-MM-dd HH:mm:ss` — length 19.
    DateTime,
    /// `yyyy-MM-dd HH:mm:ss.S` — length 21 for a single millisecond digit.
    DateTimeMillis,
}

/// How a pattern carries sub-second digits after its strftime base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fraction {
    /// No sub-second component.
    None,
    /// Millisecond digits appended directly (`yyyyMMddHHmmssS`).
    Bare,
    /// Millisecond digits after a literal dot (`yyyy-MM-dd HH:mm:ss.S`).
    Dotted,
}

impl FormatPattern {
    /// Resolve a pattern from a literal's length.
    ///
    /// # Errors
    ///
    /// Returns [`TemporalError::AmbiguousLength`] for any length without a
    /// registered pattern.
    pub fn infer(len: usize) -> Result<FormatPattern> {
        match len {
            4 => Ok(FormatPattern::Year),
            6 => Ok(FormatPattern::CompactMonth),
            7 => Ok(FormatPattern::Month),
            8 => Ok(FormatPattern::CompactDate),
            10 => Ok(FormatPattern::Date),
            13 => Ok(FormatPattern::DateHour),
            14 => Ok(FormatPattern::CompactDateTime),
            15 => Ok(FormatPattern::CompactDateTimeMillis),
            16 => Ok(FormatPattern::DateMinute),
            19 => Ok(FormatPattern::DateTime),
            21 => Ok(FormatPattern::DateTimeMillis),
            other => Err(TemporalError::AmbiguousLength(other)),
        }
    }

    /// The literal length this pattern is registered under.
    pub const fn literal_len(self) -> usize {
        match self {
            FormatPattern::Year => 4,
            FormatPattern::CompactMonth => 6,
            FormatPattern::Month => 7,
            FormatPattern::CompactDate => 8,
            FormatPattern::Date => 10,
            FormatPattern::DateHour => 13,
            FormatPattern::CompactDateTime => 14,
            FormatPattern::CompactDateTimeMillis => 15,
            FormatPattern::DateMinute => 16,
            FormatPattern::DateTime => 19,
            FormatPattern::DateTimeMillis => 21,
        }
    }

    /// The literal shape, as written in configuration and diagnostics.
    pub const fn shape(self) -> &'static str {
        match self {
            FormatPattern::Year => "yyyy",
            FormatPattern::CompactMonth => "yyyyMM",
            FormatPattern::Month => "yyyy-MM",
            FormatPattern::CompactDate => "yyyyMMdd",
            FormatPattern::Date => "yyyy-MM-dd",
            FormatPattern::DateHour => "yyyy-MM-dd HH",
            FormatPattern::CompactDateTime => "yyyyMMddHHmmss",
            FormatPattern::CompactDateTimeMillis => "yyyyMMddHHmmssS",
            FormatPattern::DateMinute => "yyyy-MM-dd HH:mm",
            FormatPattern::DateTime => "yyyy-MM-dd HH:mm:ss",
            FormatPattern::DateTimeMillis => "yyyy-MM-dd HH:mm:ss.S",
        }
    }

    /// The chrono strftime base, excluding any sub-second component.
    pub(crate) const fn strftime(self) -> &'static str {
        match self {
            FormatPattern::Year => "%Y",
            FormatPattern::CompactMonth => "%Y%m",
            FormatPattern::Month => "%Y-%m",
            FormatPattern::CompactDate => "%Y%m%d",
            FormatPattern::Date => "%Y-%m-%d",
            FormatPattern::DateHour => "%Y-%m-%d %H",
            FormatPattern::CompactDateTime | FormatPattern::CompactDateTimeMillis => {
                "%Y%m%d%H%M%S"
            }
            FormatPattern::DateMinute => "%Y-%m-%d %H:%M",
            FormatPattern::DateTime | FormatPattern::DateTimeMillis => "%Y-%m-%d %H:%M:%S",
        }
    }

    pub(crate) const fn fraction(self) -> Fraction {
        match self {
            FormatPattern::CompactDateTimeMillis => Fraction::Bare,
            FormatPattern::DateTimeMillis => Fraction::Dotted,
            _ => Fraction::None,
        }
    }

    /// The length of the strftime base's literal rendering (everything before
    /// the millisecond digits).
    pub(crate) const fn base_len(self) -> usize {
        match self.fraction() {
            Fraction::None => self.literal_len(),
            Fraction::Bare => 14,
            Fraction::Dotted => 19,
        }
    }

    pub(crate) const fn has_month(self) -> bool {
        !matches!(self, FormatPattern::Year)
    }

    pub(crate) const fn has_day(self) -> bool {
        !matches!(
            self,
            FormatPattern::Year | FormatPattern::CompactMonth | FormatPattern::Month
        )
    }

    pub(crate) const fn has_hour(self) -> bool {
        self.literal_len() >= 13
    }

    pub(crate) const fn has_minute(self) -> bool {
        matches!(
            self,
            FormatPattern::CompactDateTime
                | FormatPattern::CompactDateTimeMillis
                | FormatPattern::DateMinute
                | FormatPattern::DateTime
                | FormatPattern::DateTimeMillis
        )
    }

    pub(crate) const fn has_second(self) -> bool {
        matches!(
            self,
            FormatPattern::CompactDateTime
                | FormatPattern::CompactDateTimeMillis
                | FormatPattern::DateTime
                | FormatPattern::DateTimeMillis
        )
    }
}

impl fmt::Display for FormatPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINED: [usize; 11] = [4, 6, 7, 8, 10, 13, 14, 15, 16, 19, 21];

    #[test]
    fn test_infer_defined_lengths() {
        for len in DEFINED {
            let pattern = FormatPattern::infer(len).unwrap();
            assert_eq!(pattern.literal_len(), len);
            assert_eq!(pattern.shape().len(), len);
        }
    }

    #[test]
    fn test_infer_is_deterministic() {
        for len in DEFINED {
            assert_eq!(
                FormatPattern::infer(len).unwrap(),
                FormatPattern::infer(len).unwrap()
            );
        }
    }

    #[test]
    fn test_ambiguous_lengths_rejected() {
        for len in [0, 1, 2, 3, 5, 9, 11, 12, 17, 18, 20, 22, 64] {
            let err = FormatPattern::infer(len).unwrap_err();
            assert!(
                matches!(err, TemporalError::AmbiguousLength(l) if l == len),
                "length {len} resolved unexpectedly"
            );
        }
    }

    #[test]
    fn test_length_mapping_is_injective() {
        let mut seen = std::collections::HashSet::new();
        for len in DEFINED {
            assert!(seen.insert(FormatPattern::infer(len).unwrap()));
        }
    }

    #[test]
    fn test_display_matches_shape() {
        assert_eq!(FormatPattern::Date.to_string(), "yyyy-MM-dd");
        assert_eq!(FormatPattern::DateTime.to_string(), "yyyy-MM-dd HH:mm:ss");
    }
}
