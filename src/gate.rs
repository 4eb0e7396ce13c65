//! Entry points that tolerate absent arguments.
//!
//! Callers holding possibly-missing accounts or strings go through these.
//! An absent account or string always denies (or is a no-op for the
//! mutators); nothing here panics or returns an error.

use tracing::warn;

use crate::account::Account;

/// Create an account, or nothing if any field is absent or invalid.
pub fn create(
    username: Option<&str>,
    password: Option<&str>,
    email: Option<&str>,
    birthdate: Option<&str>,
) -> Option<Account> {
    let (Some(username), Some(password), Some(email), Some(birthdate)) =
        (username, password, email, birthdate)
    else {
        warn!("Account creation rejected: absent field");
        return None;
    };
    Account::create(username, password, email, birthdate).ok()
}

/// See [`Account::validate_password`].
pub fn validate_password(account: Option<&mut Account>, candidate: Option<&str>) -> bool {
    match (account, candidate) {
        (Some(account), Some(candidate)) => account.validate_password(candidate),
        _ => {
            warn!("Absent argument passed to validate_password");
            false
        }
    }
}

/// See [`Account::update_password`].
pub fn update_password(account: Option<&mut Account>, new_password: Option<&str>) -> bool {
    match (account, new_password) {
        (Some(account), Some(new_password)) => account.update_password(new_password),
        _ => {
            warn!("Absent argument passed to update_password");
            false
        }
    }
}

/// See [`Account::is_banned`]. An absent account is not banned.
pub fn is_banned(account: Option<&Account>) -> bool {
    account.is_some_and(Account::is_banned)
}

/// See [`Account::is_expired`]. An absent account is not expired.
pub fn is_expired(account: Option<&Account>) -> bool {
    account.is_some_and(Account::is_expired)
}

/// See [`Account::set_unban_time`].
pub fn set_unban_time(account: Option<&mut Account>, unban_time: i64) {
    match account {
        Some(account) => account.set_unban_time(unban_time),
        None => warn!("Absent account passed to set_unban_time"),
    }
}

/// See [`Account::set_expiration_time`].
pub fn set_expiration_time(account: Option<&mut Account>, expiration_time: i64) {
    match account {
        Some(account) => account.set_expiration_time(expiration_time),
        None => warn!("Absent account passed to set_expiration_time"),
    }
}

/// See [`Account::record_login_failure`].
pub fn record_login_failure(account: Option<&mut Account>) {
    match account {
        Some(account) => account.record_login_failure(),
        None => warn!("Absent account passed to record_login_failure"),
    }
}
