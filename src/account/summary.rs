//! Human-readable account summaries.

use std::io::Write;

use chrono::{DateTime, Utc};
use tracing::error;

use super::Account;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_time(at: DateTime<Utc>) -> String {
    at.format(TIME_FORMAT).to_string()
}

impl Account {
    /// Render the summary block.
    pub fn summary(&self) -> String {
        let last_login = self
            .last_login_at()
            .map(format_time)
            .unwrap_or_else(|| "Never".to_string());

        let ban = match self.unban_at() {
            None => "Not banned".to_string(),
            Some(at) if self.is_banned() => format!("Banned until {}", format_time(at)),
            Some(_) => "Ban expired".to_string(),
        };

        let expiration = match self.expires_at() {
            None => "Never expires".to_string(),
            Some(_) if self.is_expired() => "Expired".to_string(),
            Some(at) => format!("Expires on {}", format_time(at)),
        };

        format!(
            "Account Summary for: {}\n\
             Email: {}\n\
             Birth Date: {}\n\
             Login Count: {}\n\
             Failed Login Count: {}\n\
             Last Login: {}\n\
             Last IP: {}\n\
             Status: {}, {}\n",
            self.username(),
            self.email(),
            self.birthdate(),
            self.login_count(),
            self.login_fail_count(),
            last_login,
            self.last_ip(),
            ban,
            expiration,
        )
    }

    /// Write the summary to `out`. Returns false if the write fails.
    pub fn write_summary<W: Write>(&self, out: &mut W) -> bool {
        match out
            .write_all(self.summary().as_bytes())
            .and_then(|()| out.flush())
        {
            Ok(()) => true,
            Err(e) => {
                error!(username = %self.username(), error = %e, "Failed to write account summary");
                false
            }
        }
    }
}
