//! The account entity and its policy state machine.

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::credential::{Credential, CredentialError, Hasher};
use super::strength::{is_valid_username, PasswordPolicy, StrengthError};
use crate::clock::{self, Clock, SystemClock};

/// Why an account could not be created.
#[derive(Error, Debug)]
pub enum CreateError {
    /// A required identity field was empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Username contains whitespace or control characters.
    #[error("username contains invalid characters")]
    InvalidUsername,

    /// Initial password failed the strength policy.
    #[error("weak password: {0}")]
    WeakPassword(#[from] StrengthError),

    /// Credential derivation failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// A single account's credential and access-policy state.
///
/// Timestamps are Unix seconds; `0` means "not set" for the ban, the
/// expiration and the last login.
pub struct Account {
    username: String,
    email: String,
    birthdate: String,
    credential: Credential,
    login_fail_count: u32,
    login_count: u32,
    unban_time: i64,
    expiration_time: i64,
    last_login_time: i64,
    last_ip: Ipv4Addr,
    policy: PasswordPolicy,
    hasher: Hasher,
    clock: Arc<dyn Clock>,
}

impl Account {
    /// Create an account with the default policy, default hasher and the
    /// system clock.
    pub fn create(
        username: &str,
        password: &str,
        email: &str,
        birthdate: &str,
    ) -> Result<Self, CreateError> {
        Self::create_with(
            username,
            password,
            email,
            birthdate,
            &PasswordPolicy::default(),
            &Hasher::default(),
            Arc::new(SystemClock),
        )
    }

    /// Create an account with an explicit policy, hasher and clock.
    ///
    /// Either every field is populated and the password is stored as a
    /// derived credential, or no account is produced.
    pub fn create_with(
        username: &str,
        password: &str,
        email: &str,
        birthdate: &str,
        policy: &PasswordPolicy,
        hasher: &Hasher,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CreateError> {
        for (name, value) in [
            ("username", username),
            ("password", password),
            ("email", email),
            ("birthdate", birthdate),
        ] {
            if value.is_empty() {
                warn!(field = name, "Account creation rejected: missing field");
                return Err(CreateError::MissingField(name));
            }
        }

        if !is_valid_username(username) {
            warn!("Account creation rejected: invalid username");
            return Err(CreateError::InvalidUsername);
        }

        if let Err(e) = policy.check(password) {
            warn!(username = %username, reason = %e, "Account creation rejected: weak password");
            return Err(e.into());
        }

        let credential = Credential::derive(password, hasher)?;

        info!(username = %username, "Account created");

        Ok(Self {
            username: username.to_string(),
            email: email.to_string(),
            birthdate: birthdate.to_string(),
            credential,
            login_fail_count: 0,
            login_count: 0,
            unban_time: 0,
            expiration_time: 0,
            last_login_time: 0,
            last_ip: Ipv4Addr::UNSPECIFIED,
            policy: policy.clone(),
            hasher: hasher.clone(),
            clock,
        })
    }

    /// Answer "may this account authenticate right now with this password?"
    ///
    /// Checks run in order and stop at the first denial: ban, expiration,
    /// failure threshold, then the credential comparison. Only a genuine
    /// comparison that fails increments the failure counter. A successful
    /// comparison leaves the counter untouched.
    pub fn validate_password(&mut self, candidate: &str) -> bool {
        if self.is_banned() {
            warn!(username = %self.username, "Password validation on banned account");
            return false;
        }

        if self.is_expired() {
            warn!(username = %self.username, "Password validation on expired account");
            return false;
        }

        if self.is_rate_limited() {
            warn!(
                username = %self.username,
                failures = self.login_fail_count,
                "Password validation rate limited"
            );
            return false;
        }

        if self.credential.matches(candidate) {
            return true;
        }

        self.login_fail_count = self.login_fail_count.saturating_add(1);
        warn!(
            username = %self.username,
            failures = self.login_fail_count,
            "Password validation failed"
        );
        false
    }

    /// Replace the credential with one derived from `new_password`.
    ///
    /// On success the old password stops validating immediately and the
    /// failure counter returns to zero. Not gated on ban or expiration.
    pub fn update_password(&mut self, new_password: &str) -> bool {
        if let Err(e) = self.policy.check(new_password) {
            warn!(username = %self.username, reason = %e, "Password change rejected");
            return false;
        }

        match Credential::derive(new_password, &self.hasher) {
            Ok(credential) => {
                self.credential = credential;
                self.login_fail_count = 0;
                info!(username = %self.username, "Password updated");
                true
            }
            Err(e) => {
                warn!(username = %self.username, error = %e, "Password change failed");
                false
            }
        }
    }

    /// Whether a ban is in force: `unban_time` is set and still in the future.
    pub fn is_banned(&self) -> bool {
        self.unban_time != 0 && self.unban_time > self.clock.now_timestamp()
    }

    /// Whether the account has expired: `expiration_time` is set and already
    /// in the past.
    pub fn is_expired(&self) -> bool {
        self.expiration_time != 0 && self.expiration_time < self.clock.now_timestamp()
    }

    /// Whether the failure counter has reached the policy threshold.
    pub fn is_rate_limited(&self) -> bool {
        self.login_fail_count >= self.policy.max_login_failures
    }

    /// Set the time the ban lifts. `0` clears the ban.
    pub fn set_unban_time(&mut self, unban_time: i64) {
        self.unban_time = unban_time;
        if unban_time == 0 {
            info!(username = %self.username, "Ban cleared");
        } else {
            info!(username = %self.username, unban_time, "Account banned");
        }
    }

    /// Set the time the account expires. `0` means it never expires.
    pub fn set_expiration_time(&mut self, expiration_time: i64) {
        self.expiration_time = expiration_time;
        if expiration_time == 0 {
            info!(username = %self.username, "Expiration cleared");
        } else {
            info!(username = %self.username, expiration_time, "Expiration set");
        }
    }

    /// Count one failed login. No upper clamp here; the threshold is
    /// enforced by [`validate_password`](Self::validate_password).
    pub fn record_login_failure(&mut self) {
        self.login_fail_count = self.login_fail_count.saturating_add(1);
        debug!(
            username = %self.username,
            failures = self.login_fail_count,
            "Recorded failed login"
        );
    }

    /// Record a successful login from `ip` at `at`.
    ///
    /// Leaves the failure counter alone.
    pub fn record_login_success(&mut self, ip: Ipv4Addr, at: DateTime<Utc>) {
        self.login_count = self.login_count.saturating_add(1);
        self.last_login_time = at.timestamp();
        self.last_ip = ip;
        info!(
            username = %self.username,
            ip = %ip,
            logins = self.login_count,
            "Recorded successful login"
        );
    }

    /// Replace the email address. Empty input is rejected.
    pub fn set_email(&mut self, new_email: &str) -> bool {
        if new_email.is_empty() {
            warn!(username = %self.username, "Email change rejected: empty address");
            return false;
        }
        self.email = new_email.to_string();
        info!(username = %self.username, "Email updated");
        true
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn birthdate(&self) -> &str {
        &self.birthdate
    }

    pub fn login_fail_count(&self) -> u32 {
        self.login_fail_count
    }

    pub fn login_count(&self) -> u32 {
        self.login_count
    }

    pub fn unban_time(&self) -> i64 {
        self.unban_time
    }

    pub fn expiration_time(&self) -> i64 {
        self.expiration_time
    }

    pub fn last_login_time(&self) -> i64 {
        self.last_login_time
    }

    pub fn last_ip(&self) -> Ipv4Addr {
        self.last_ip
    }

    /// The ban end as a datetime, if one is set.
    pub fn unban_at(&self) -> Option<DateTime<Utc>> {
        clock::from_timestamp(self.unban_time)
    }

    /// The expiration as a datetime, if one is set.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        clock::from_timestamp(self.expiration_time)
    }

    /// The last successful login as a datetime, if there was one.
    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        clock::from_timestamp(self.last_login_time)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("birthdate", &self.birthdate)
            .field("credential", &self.credential)
            .field("login_fail_count", &self.login_fail_count)
            .field("login_count", &self.login_count)
            .field("unban_time", &self.unban_time)
            .field("expiration_time", &self.expiration_time)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::HashingConfig;
    use chrono::{Duration, TimeZone};

    const PASSWORD: &str = "TestP@ss123";

    fn cheap_hasher() -> Hasher {
        Hasher::from_config(&HashingConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
            output_len: 32,
        })
        .unwrap()
    }

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        ))
    }

    fn test_account(clock: Arc<FixedClock>) -> Account {
        Account::create_with(
            "testuser",
            PASSWORD,
            "test@example.com",
            "1990-01-01",
            &PasswordPolicy::default(),
            &cheap_hasher(),
            clock,
        )
        .unwrap()
    }

    #[test]
    fn test_create_defaults() {
        let acc = test_account(fixed_clock());

        assert_eq!(acc.username(), "testuser");
        assert_eq!(acc.email(), "test@example.com");
        assert_eq!(acc.birthdate(), "1990-01-01");
        assert_eq!(acc.login_fail_count(), 0);
        assert_eq!(acc.login_count(), 0);
        assert_eq!(acc.unban_time(), 0);
        assert_eq!(acc.expiration_time(), 0);
        assert_eq!(acc.last_ip(), Ipv4Addr::UNSPECIFIED);
        assert!(acc.last_login_at().is_none());
        assert!(!acc.is_banned());
        assert!(!acc.is_expired());
    }

    #[test]
    fn test_create_missing_fields() {
        let policy = PasswordPolicy::default();
        let hasher = cheap_hasher();
        let cases = [
            ("", PASSWORD, "a@b.c", "1990-01-01", "username"),
            ("user", "", "a@b.c", "1990-01-01", "password"),
            ("user", PASSWORD, "", "1990-01-01", "email"),
            ("user", PASSWORD, "a@b.c", "", "birthdate"),
        ];
        for (username, password, email, birthdate, field) in cases {
            let result = Account::create_with(
                username,
                password,
                email,
                birthdate,
                &policy,
                &hasher,
                fixed_clock(),
            );
            assert!(
                matches!(result, Err(CreateError::MissingField(f)) if f == field),
                "expected missing {field}"
            );
        }
    }

    #[test]
    fn test_create_rejects_invalid_username() {
        let result = Account::create_with(
            "     ",
            PASSWORD,
            "a@b.c",
            "1990-01-01",
            &PasswordPolicy::default(),
            &cheap_hasher(),
            fixed_clock(),
        );
        assert!(matches!(result, Err(CreateError::InvalidUsername)));
    }

    #[test]
    fn test_create_rejects_weak_password() {
        let result = Account::create_with(
            "weakpassuser",
            "password",
            "user@example.com",
            "2005-04-05",
            &PasswordPolicy::default(),
            &cheap_hasher(),
            fixed_clock(),
        );
        assert!(matches!(
            result,
            Err(CreateError::WeakPassword(StrengthError::TooFewClasses { .. }))
        ));
    }

    #[test]
    fn test_validate_correct_and_wrong() {
        let mut acc = test_account(fixed_clock());

        assert!(acc.validate_password(PASSWORD));
        assert_eq!(acc.login_fail_count(), 0);

        assert!(!acc.validate_password("WrongP@ss123"));
        assert_eq!(acc.login_fail_count(), 1);

        assert!(!acc.validate_password(""));
        assert_eq!(acc.login_fail_count(), 2);
    }

    #[test]
    fn test_validate_success_does_not_reset_failures() {
        let mut acc = test_account(fixed_clock());

        acc.validate_password("WrongP@ss123");
        acc.validate_password("WrongP@ss123");
        assert!(acc.validate_password(PASSWORD));
        assert_eq!(acc.login_fail_count(), 2);
    }

    #[test]
    fn test_validate_banned_does_not_count() {
        let clock = fixed_clock();
        let mut acc = test_account(clock.clone());
        acc.set_unban_time(clock.now_timestamp() + 3600);

        assert!(!acc.validate_password(PASSWORD));
        assert!(!acc.validate_password("WrongP@ss123"));
        assert_eq!(acc.login_fail_count(), 0);
    }

    #[test]
    fn test_validate_expired_does_not_count() {
        let clock = fixed_clock();
        let mut acc = test_account(clock.clone());
        acc.set_expiration_time(clock.now_timestamp() - 3600);

        assert!(!acc.validate_password(PASSWORD));
        assert!(!acc.validate_password("WrongP@ss123"));
        assert_eq!(acc.login_fail_count(), 0);
    }

    #[test]
    fn test_validate_rate_limit_threshold() {
        let mut acc = test_account(fixed_clock());

        for _ in 0..9 {
            acc.record_login_failure();
        }
        assert!(!acc.is_rate_limited());
        assert!(acc.validate_password(PASSWORD));

        acc.record_login_failure();
        assert!(acc.is_rate_limited());
        assert!(!acc.validate_password(PASSWORD));
        // Rejected without comparing, so nothing is counted.
        assert!(!acc.validate_password("WrongP@ss123"));
        assert_eq!(acc.login_fail_count(), 10);
    }

    #[test]
    fn test_wrong_passwords_reach_threshold() {
        let mut acc = test_account(fixed_clock());

        for _ in 0..10 {
            assert!(!acc.validate_password("WrongP@ss123"));
        }
        assert_eq!(acc.login_fail_count(), 10);
        assert!(!acc.validate_password(PASSWORD));
    }

    #[test]
    fn test_update_password() {
        let mut acc = test_account(fixed_clock());

        assert!(acc.update_password("NewP@ssw0rd!"));
        assert!(acc.validate_password("NewP@ssw0rd!"));
        assert!(!acc.validate_password(PASSWORD));
    }

    #[test]
    fn test_update_accepts_long_password() {
        let mut acc = test_account(fixed_clock());
        let long = format!("Aa1!{}", "x".repeat(200));

        assert!(acc.update_password(&long));
        assert!(acc.validate_password(&long));
        assert!(!acc.validate_password(PASSWORD));
    }

    #[test]
    fn test_update_resets_failures() {
        let mut acc = test_account(fixed_clock());
        for _ in 0..5 {
            acc.record_login_failure();
        }
        assert_eq!(acc.login_fail_count(), 5);

        assert!(acc.update_password("NewP@ssw0rd!"));
        assert_eq!(acc.login_fail_count(), 0);
    }

    #[test]
    fn test_update_rejects_weak_without_mutation() {
        let mut acc = test_account(fixed_clock());
        acc.record_login_failure();

        assert!(!acc.update_password("Sh0rt!"));
        assert!(!acc.update_password("onlylowercase"));
        assert!(!acc.update_password("12345678"));
        assert!(!acc.update_password("ALLUPPERCASE"));

        assert_eq!(acc.login_fail_count(), 1);
        assert!(acc.validate_password(PASSWORD));
    }

    #[test]
    fn test_update_not_gated_by_ban_or_expiry() {
        let clock = fixed_clock();
        let mut acc = test_account(clock.clone());
        acc.set_unban_time(clock.now_timestamp() + 3600);
        acc.set_expiration_time(clock.now_timestamp() - 3600);

        assert!(acc.update_password("NewP@ssw0rd!"));
        assert!(acc.is_banned());
        assert!(acc.is_expired());
    }

    #[test]
    fn test_ban_window_self_clears() {
        let clock = fixed_clock();
        let mut acc = test_account(clock.clone());
        let now = clock.now_timestamp();

        acc.set_unban_time(now + 60);
        assert!(acc.is_banned());

        clock.advance(Duration::seconds(59));
        assert!(acc.is_banned());

        // unban_time == now is no longer banned
        clock.advance(Duration::seconds(1));
        assert!(!acc.is_banned());
        assert!(acc.validate_password(PASSWORD));
    }

    #[test]
    fn test_expiration_boundary() {
        let clock = fixed_clock();
        let mut acc = test_account(clock.clone());
        let now = clock.now_timestamp();

        acc.set_expiration_time(now);
        assert!(!acc.is_expired());

        clock.advance(Duration::seconds(1));
        assert!(acc.is_expired());

        acc.set_expiration_time(0);
        assert!(!acc.is_expired());
    }

    #[test]
    fn test_zero_sentinels() {
        let mut acc = test_account(fixed_clock());

        acc.set_unban_time(0);
        acc.set_expiration_time(0);
        assert!(!acc.is_banned());
        assert!(!acc.is_expired());
        assert!(acc.unban_at().is_none());
        assert!(acc.expires_at().is_none());
    }

    #[test]
    fn test_record_login_failure_unclamped() {
        let mut acc = test_account(fixed_clock());
        for _ in 0..25 {
            acc.record_login_failure();
        }
        assert_eq!(acc.login_fail_count(), 25);
    }

    #[test]
    fn test_record_login_success() {
        let clock = fixed_clock();
        let mut acc = test_account(clock.clone());
        acc.record_login_failure();

        let ip = Ipv4Addr::new(127, 0, 0, 1);
        acc.record_login_success(ip, clock.now());

        assert_eq!(acc.login_count(), 1);
        assert_eq!(acc.last_ip(), ip);
        assert_eq!(acc.last_login_at(), Some(clock.now()));
        assert_eq!(acc.login_fail_count(), 1);
    }

    #[test]
    fn test_set_email() {
        let mut acc = test_account(fixed_clock());

        assert!(acc.set_email("new@example.com"));
        assert_eq!(acc.email(), "new@example.com");

        assert!(!acc.set_email(""));
        assert_eq!(acc.email(), "new@example.com");
    }

    #[test]
    fn test_debug_hides_credential() {
        let acc = test_account(fixed_clock());
        let printed = format!("{acc:?}");

        assert!(printed.contains("testuser"));
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains(PASSWORD));
        assert!(!printed.contains("$argon2id$"));
    }

    #[test]
    fn test_create_error_display() {
        assert_eq!(
            CreateError::MissingField("username").to_string(),
            "username is required"
        );
        assert_eq!(
            CreateError::InvalidUsername.to_string(),
            "username contains invalid characters"
        );
    }
}
