//! Password strength policy and identity field checks.

use thiserror::Error;

use crate::config::PolicyConfig;

/// Reasons a password fails the strength policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrengthError {
    /// Password is shorter than the policy minimum.
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },

    /// Password draws from too few character classes.
    #[error("password must mix at least {required} character classes (found {found})")]
    TooFewClasses { required: usize, found: usize },
}

/// Character classes counted by the strength policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharClasses {
    pub lowercase: bool,
    pub uppercase: bool,
    pub digit: bool,
    pub symbol: bool,
}

impl CharClasses {
    /// Classify every character of `password`.
    ///
    /// Anything that is not a lowercase letter, uppercase letter or decimal
    /// digit counts as a symbol.
    pub fn of(password: &str) -> Self {
        password.chars().fold(Self::default(), |mut classes, c| {
            if c.is_lowercase() {
                classes.lowercase = true;
            } else if c.is_uppercase() {
                classes.uppercase = true;
            } else if c.is_ascii_digit() {
                classes.digit = true;
            } else {
                classes.symbol = true;
            }
            classes
        })
    }

    /// Number of distinct classes present.
    pub fn count(&self) -> usize {
        [self.lowercase, self.uppercase, self.digit, self.symbol]
            .iter()
            .filter(|&&present| present)
            .count()
    }
}

/// Strength rules applied whenever a password is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length in characters.
    pub min_length: usize,
    /// Distinct character classes required.
    pub min_classes: usize,
    /// Consecutive failed validations that lock the account.
    pub max_login_failures: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::from_config(&PolicyConfig::default())
    }
}

impl PasswordPolicy {
    /// Build the policy from configuration.
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            min_length: config.min_password_length,
            min_classes: config.min_character_classes,
            max_login_failures: config.max_login_failures,
        }
    }

    /// Check a candidate password.
    ///
    /// # Examples
    ///
    /// ```
    /// use acctguard::PasswordPolicy;
    ///
    /// let policy = PasswordPolicy::default();
    /// assert!(policy.check("Sh0rt!").is_err());
    /// assert!(policy.check("onlylowercase").is_err());
    /// assert!(policy.check("Passw0rd!1").is_ok());
    /// ```
    pub fn check(&self, password: &str) -> Result<(), StrengthError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(StrengthError::TooShort {
                min: self.min_length,
            });
        }

        let found = CharClasses::of(password).count();
        if found < self.min_classes {
            return Err(StrengthError::TooFewClasses {
                required: self.min_classes,
                found,
            });
        }

        Ok(())
    }

    /// Whether `password` passes [`check`](Self::check).
    pub fn is_strong(&self, password: &str) -> bool {
        self.check(password).is_ok()
    }
}

/// Check a username: non-empty, printable, no whitespace.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && !username
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
}
