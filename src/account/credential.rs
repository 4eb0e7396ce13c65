//! Opaque password credentials.
//!
//! Uses Argon2id. A [`Credential`] only ever holds the PHC-formatted hash;
//! the plaintext password is dropped as soon as it has been derived.

use std::fmt;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use thiserror::Error;

use crate::config::HashingConfig;

/// Credential-related errors.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Argon2 rejected the configured parameters.
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),
}

/// Argon2id hasher with fixed cost parameters.
#[derive(Clone)]
pub struct Hasher {
    params: Params,
}

impl Hasher {
    /// Build a hasher from configuration, rejecting parameters Argon2 refuses.
    pub fn from_config(config: &HashingConfig) -> Result<Self, CredentialError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            Some(config.output_len),
        )
        .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Memory cost in KiB.
    pub fn memory_kib(&self) -> u32 {
        self.params.m_cost()
    }

    /// Time cost (iterations).
    pub fn iterations(&self) -> u32 {
        self.params.t_cost()
    }

    /// Degree of parallelism.
    pub fn parallelism(&self) -> u32 {
        self.params.p_cost()
    }
}

impl Default for Hasher {
    /// 64 MiB memory, 3 iterations, 1 lane, 32-byte output.
    fn default() -> Self {
        Self::from_config(&HashingConfig::default())
            .expect("default hashing parameters are accepted by argon2")
    }
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hasher")
            .field("memory_kib", &self.memory_kib())
            .field("iterations", &self.iterations())
            .field("parallelism", &self.parallelism())
            .finish()
    }
}

/// A securely derived password credential.
///
/// There is no way to get the password back out, and no `PartialEq`:
/// the only comparison is [`Credential::matches`].
#[derive(Clone)]
pub struct Credential {
    phc: String,
}

impl Credential {
    /// Derive a credential from a plaintext password with a fresh random salt.
    pub fn derive(password: &str, hasher: &Hasher) -> Result<Self, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = hasher
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::HashError(e.to_string()))?;

        Ok(Self {
            phc: hash.to_string(),
        })
    }

    /// The stored PHC string (algorithm, parameters, salt and hash).
    pub fn phc(&self) -> &str {
        &self.phc
    }

    /// Check a candidate password against this credential.
    ///
    /// Verification uses the parameters recorded in the hash, not the
    /// current hasher configuration.
    pub fn matches(&self, candidate: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.phc) else {
            return false;
        };
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
