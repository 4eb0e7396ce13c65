//! Login flow built on the account policy checks.
//!
//! Each outcome is reported to the client as a single line and logged.
//! No session or token is issued here.

use std::fmt;
use std::io::Write;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::account::Account;

/// Outcome of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginResult {
    /// Credentials accepted and the login recorded.
    Success,
    /// No account was supplied for the user id.
    UserNotFound,
    /// The account is inside a ban window.
    AccountBanned,
    /// The account has expired.
    AccountExpired,
    /// Too many consecutive failures.
    RateLimited,
    /// The password did not match.
    BadPassword,
    /// The request itself was malformed.
    InternalError,
}

impl LoginResult {
    /// Whether the login was accepted.
    pub fn is_success(&self) -> bool {
        matches!(self, LoginResult::Success)
    }

    /// Line sent back to the client.
    pub fn message(&self) -> &'static str {
        match self {
            LoginResult::Success => "Login successful!",
            LoginResult::UserNotFound => "Login failed: user not found.",
            LoginResult::AccountBanned => "Login failed: account banned.",
            LoginResult::AccountExpired => "Login failed: account expired.",
            LoginResult::RateLimited => "Login failed: too many failed attempts.",
            LoginResult::BadPassword => "Login failed: incorrect password.",
            LoginResult::InternalError => "Login failed: internal error.",
        }
    }
}

impl fmt::Display for LoginResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Attempt a login against `account` and report the outcome to `client_out`.
///
/// A wrong password is counted once, by the validation itself.
pub fn handle_login<W: Write>(
    account: Option<&mut Account>,
    password: Option<&str>,
    client_ip: Ipv4Addr,
    login_time: DateTime<Utc>,
    client_out: &mut W,
) -> LoginResult {
    let result = attempt(account, password, client_ip, login_time);
    if let Err(e) = writeln!(client_out, "{result}").and_then(|()| client_out.flush()) {
        warn!(error = %e, "Failed to write login response to client");
    }
    result
}

fn attempt(
    account: Option<&mut Account>,
    password: Option<&str>,
    client_ip: Ipv4Addr,
    login_time: DateTime<Utc>,
) -> LoginResult {
    let Some(password) = password else {
        warn!("Login rejected: no password supplied");
        return LoginResult::InternalError;
    };

    let Some(account) = account else {
        warn!(ip = %client_ip, "Login failed: user not found");
        return LoginResult::UserNotFound;
    };

    if account.is_banned() {
        warn!(username = %account.username(), "Login failed: account banned");
        return LoginResult::AccountBanned;
    }

    if account.is_expired() {
        warn!(username = %account.username(), "Login failed: account expired");
        return LoginResult::AccountExpired;
    }

    if account.is_rate_limited() {
        warn!(username = %account.username(), "Login failed: rate limited");
        return LoginResult::RateLimited;
    }

    if !account.validate_password(password) {
        warn!(username = %account.username(), ip = %client_ip, "Login failed: wrong password");
        return LoginResult::BadPassword;
    }

    account.record_login_success(client_ip, login_time);
    info!(username = %account.username(), ip = %client_ip, "Login successful");
    LoginResult::Success
}
