//! Configuration module for acctguard.

use serde::Deserialize;
use std::path::Path;

use crate::{AcctError, Result};

/// Authentication policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Consecutive failed validations after which an account is rate limited.
    #[serde(default = "default_max_login_failures")]
    pub max_login_failures: u32,
    /// Minimum password length in characters.
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Distinct character classes a password must draw from (1-4).
    #[serde(default = "default_min_character_classes")]
    pub min_character_classes: usize,
}

fn default_max_login_failures() -> u32 {
    10
}

fn default_min_password_length() -> usize {
    8
}

fn default_min_character_classes() -> usize {
    2
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_login_failures: default_max_login_failures(),
            min_password_length: default_min_password_length(),
            min_character_classes: default_min_character_classes(),
        }
    }
}

/// Argon2id hashing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Time cost (iterations).
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
    /// Hash output length in bytes.
    #[serde(default = "default_output_len")]
    pub output_len: usize,
}

fn default_memory_kib() -> u32 {
    64 * 1024 // 64 MiB
}

fn default_iterations() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    1
}

fn default_output_len() -> usize {
    32
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
            output_len: default_output_len(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional path to a log file. Console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Authentication policy.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Credential hashing.
    #[serde(default)]
    pub hashing: HashingConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(AcctError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AcctError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `ACCTGUARD_LOG_LEVEL`: Override the log level
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("ACCTGUARD_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let policy = &self.policy;
        if policy.max_login_failures == 0 {
            return Err(AcctError::Config(
                "policy.max_login_failures must be at least 1".to_string(),
            ));
        }
        if policy.min_password_length == 0 {
            return Err(AcctError::Config(
                "policy.min_password_length must be at least 1".to_string(),
            ));
        }
        if !(1..=4).contains(&policy.min_character_classes) {
            return Err(AcctError::Config(format!(
                "policy.min_character_classes must be between 1 and 4, got {}",
                policy.min_character_classes
            )));
        }

        crate::account::Hasher::from_config(&self.hashing)?;
        Ok(())
    }
}
