//! Lower bound of the review API poll window.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Unix timestamp (seconds) passed to the review API as `from_date`.
///
/// Only moves forward: [`TimeCursor::advance`] keeps the larger of the
/// current and proposed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeCursor(i64);

impl TimeCursor {
    pub fn new(secs: i64) -> Self {
        Self(secs)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self(secs)
    }

    /// Wall-clock time minus `lookback`, so the first poll sees changes made
    /// during the interval before startup.
    pub fn now_minus(lookback: Duration) -> Self {
        let now = Self::now();
        Self(now.0.saturating_sub(lookback.as_secs() as i64))
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// Move the cursor to `next` unless that would move it backwards.
    ///
    /// Returns `true` if the cursor changed.
    pub fn advance(&mut self, next: TimeCursor) -> bool {
        if next.0 > self.0 {
            self.0 = next.0;
            true
        } else {
            false
        }
    }
}

impl From<i64> for TimeCursor {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}

impl fmt::Display for TimeCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
