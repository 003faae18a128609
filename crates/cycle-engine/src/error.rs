//! Error types for cycle-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemporalError {
    /// The literal's length has no unique entry in the format registry.
    #[error("Ambiguous literal length: no registered pattern for length {0}")]
    AmbiguousLength(usize),

    /// The literal does not match the chosen or inferred pattern.
    #[error("Malformed literal '{text}' for pattern {pattern}")]
    MalformedLiteral { text: String, pattern: String },

    /// A blank literal was supplied where a concrete date was required.
    #[error("Blank literal where a date was required")]
    BlankLiteral,

    /// A configured clock handler failed to construct. Fatal at start-up.
    #[error("Clock handler '{handler}' failed to construct: {reason}")]
    ClockConstruction { handler: String, reason: String },

    /// A `yyyymm` cycle whose month component is outside 1-12.
    #[error("Invalid billing cycle: {0}")]
    InvalidCycle(i32),

    /// The computed instant or wall-clock time is not representable.
    #[error("Out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, TemporalError>;
