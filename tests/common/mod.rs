//! Test helpers for account policy integration tests.
//!
//! Accounts are built with cheap Argon2 parameters and a frozen clock so
//! the suite is fast and time checks are deterministic.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use acctguard::config::HashingConfig;
use acctguard::{Account, Clock, FixedClock, Hasher, PasswordPolicy};

/// Password used by [`create_test_account`].
pub const TEST_PASSWORD: &str = "TestP@ss123";

/// Cheapest hasher Argon2 accepts.
pub fn cheap_hasher() -> Hasher {
    Hasher::from_config(&HashingConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
        output_len: 32,
    })
    .expect("valid test hashing params")
}

/// A clock frozen at 2024-01-15 10:30:00 UTC.
pub fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
    ))
}

/// Create the standard test account on the given clock.
pub fn create_test_account(clock: Arc<FixedClock>) -> Account {
    Account::create_with(
        "testuser",
        TEST_PASSWORD,
        "test@example.com",
        "1990-01-01",
        &PasswordPolicy::default(),
        &cheap_hasher(),
        clock,
    )
    .expect("Failed to create test account")
}

/// Current time of `clock` as Unix seconds.
pub fn now(clock: &FixedClock) -> i64 {
    clock.now_timestamp()
}
