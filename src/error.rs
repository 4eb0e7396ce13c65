//! Error types for acctguard.

use thiserror::Error;

use crate::account::{CreateError, CredentialError};

/// Common error type for acctguard.
///
/// Policy checks on an [`Account`](crate::Account) report through plain
/// booleans; this type covers the surrounding plumbing (construction,
/// configuration, logging setup).
#[derive(Error, Debug)]
pub enum AcctError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Account construction failed.
    #[error("account creation failed: {0}")]
    Create(#[from] CreateError),

    /// Credential derivation or parsing failed.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
}

/// Result type alias for acctguard operations.
pub type Result<T> = std::result::Result<T, AcctError>;
