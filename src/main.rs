use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info};

use acctguard::config::LoggingConfig;
use acctguard::{handle_login, Account, Config, Hasher, PasswordPolicy, SystemClock};

fn main() {
    // Load configuration
    let config = match Config::load_with_env("acctguard.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load acctguard.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = acctguard::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        let console = LoggingConfig {
            file: None,
            ..config.logging.clone()
        };
        let _ = acctguard::logging::init(&console);
    }

    if let Err(e) = run(&config) {
        error!(error = %e, "Demo aborted");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> acctguard::Result<()> {
    config.validate()?;

    let policy = PasswordPolicy::from_config(&config.policy);
    let hasher = Hasher::from_config(&config.hashing)?;

    let mut acc = Account::create_with(
        "testuser",
        "SecurePass123!",
        "user@example.com",
        "2001-06-12",
        &policy,
        &hasher,
        Arc::new(SystemClock),
    )?;

    info!(valid = acc.validate_password("SecurePass123!"), "Password validation");
    info!(updated = acc.update_password("NewStrongP@ss456"), "Password update");

    let ip = Ipv4Addr::LOCALHOST;
    let result = handle_login(
        Some(&mut acc),
        Some("NewStrongP@ss456"),
        ip,
        Utc::now(),
        &mut io::stdout(),
    );
    info!(result = ?result, "Login attempt");

    let now = Utc::now();
    acc.set_unban_time((now + Duration::hours(1)).timestamp());
    acc.set_expiration_time((now + Duration::days(1)).timestamp());
    info!(
        banned = acc.is_banned(),
        expired = acc.is_expired(),
        "Account state"
    );

    acc.write_summary(&mut io::stdout());
    Ok(())
}
