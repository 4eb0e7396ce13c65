//! Sources of "now" for time-windowed account state.
//!
//! Ban and expiration checks read the clock on every call. Accounts hold an
//! `Arc<dyn Clock>` so callers can swap the wall clock for a [`FixedClock`].

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

/// A source of the current time.
pub trait Clock: Send + Sync + Debug {
    /// Current time in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current time as Unix seconds.
    fn now_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Wall clock backed by [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Second resolution, which is all account timestamps carry.
#[derive(Debug)]
pub struct FixedClock {
    secs: AtomicI64,
}

impl FixedClock {
    /// Create a clock frozen at `at`.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self::at_timestamp(at.timestamp())
    }

    /// Create a clock frozen at the given Unix timestamp.
    pub fn at_timestamp(secs: i64) -> Self {
        Self {
            secs: AtomicI64::new(secs),
        }
    }

    /// Move the clock to `at`.
    pub fn set(&self, at: DateTime<Utc>) {
        self.secs.store(at.timestamp(), Ordering::SeqCst);
    }

    /// Move the clock forward (or backward, for a negative duration).
    pub fn advance(&self, by: Duration) {
        self.secs.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.now_timestamp(), 0).unwrap_or_default()
    }

    fn now_timestamp(&self) -> i64 {
        self.secs.load(Ordering::SeqCst)
    }
}

/// Convert a stored Unix timestamp into a datetime, treating `0` as unset.
pub(crate) fn from_timestamp(secs: i64) -> Option<DateTime<Utc>> {
    if secs == 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}
