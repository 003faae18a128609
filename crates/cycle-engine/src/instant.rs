//! The opaque point-in-time value shared by every module.

use serde::{Deserialize, Serialize};

/// A point in time, stored as milliseconds since the Unix epoch.
///
/// Produced by [`crate::clock`] (current time) or [`crate::convert::parse`]
/// (literal conversion); immutable once created. All calendar interpretation
/// happens at the operation that consumes it, never inside the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instant(i64);

impl Instant {
    pub const fn from_millis(millis: i64) -> Self {
        Instant(millis)
    }

    pub const fn millis(self) -> i64 {
        self.0
    }
}

impl From<i64> for Instant {
    fn from(millis: i64) -> Self {
        Instant(millis)
    }
}
