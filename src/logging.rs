//! Tracing subscriber setup.
//!
//! Console output is always on. A plain-text copy goes to `[logging] file`
//! when it is set. `RUST_LOG` directives take precedence over the
//! configured level.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{AcctError, Result};

/// Map a configured level name to a filter. Unknown names mean `info`.
fn parse_level(level: &str) -> LevelFilter {
    if level.eq_ignore_ascii_case("warning") {
        return LevelFilter::WARN;
    }
    level.parse().unwrap_or(LevelFilter::INFO)
}

/// Open the configured log file for appending, creating parent directories.
fn open_log_file(config: &LoggingConfig) -> Result<Option<File>> {
    let Some(path) = config.file.as_deref().map(Path::new) else {
        return Ok(None);
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::options().create(true).append(true).open(path)?;
    Ok(Some(file))
}

/// Install the global subscriber.
///
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(parse_level(&config.level).into())
        .from_env_lossy();

    let file_layer = open_log_file(config)?
        .map(|file| fmt::layer().with_writer(Arc::new(file)).with_ansi(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| AcctError::Config(format!("logging init failed: {e}")))
}
