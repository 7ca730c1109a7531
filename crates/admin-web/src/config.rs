//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use cafeteria_core::vote::VotingWindow;
use secrecy::SecretString;

/// Admin web server configuration.
///
/// The document store, file host and email service read their own
/// variables (see their `*Config::from_env`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Password expected in the `x-admin-password` header.
    pub admin_password: SecretString,
    /// SQLite database URL for the local fallback store.
    pub database_url: String,
    /// Image shown when no menu was uploaded.
    pub default_menu_url: Option<String>,
    /// Daily vote closing time.
    pub voting_window: VotingWindow,
    /// Days of votes kept by the retention sweep.
    pub retention_days: u32,
    /// Schedule poll interval.
    pub scheduler_interval: Duration,
    /// Pause between two report emails.
    pub send_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ADMIN_ADDR` | Server bind address | `127.0.0.1:8788` |
    /// | `ADMIN_PASSWORD` | Admin password | (required) |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:cafeteria.db?mode=rwc` |
    /// | `DEFAULT_MENU_URL` | Fallback menu image | placeholder image |
    /// | `VOTING_CLOSES_AT` | Vote closing time `HH:MM` | `19:00` |
    /// | `DATA_RETENTION_DAYS` | Retention sweep window | `30` |
    /// | `SCHEDULER_INTERVAL_SECS` | Schedule poll interval | `60` |
    /// | `REPORT_SEND_DELAY_SECS` | Pause between report emails | `4` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("ADMIN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8788".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let admin_password = env::var("ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingAdminPassword)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:cafeteria.db?mode=rwc".to_string());

        let default_menu_url = env::var("DEFAULT_MENU_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let voting_window = match env::var("VOTING_CLOSES_AT") {
            Ok(value) => VotingWindow::parse(&value).ok_or(ConfigError::Invalid {
                var: "VOTING_CLOSES_AT",
                value,
            })?,
            Err(_) => VotingWindow::default(),
        };

        Ok(Self {
            addr,
            admin_password: SecretString::from(admin_password),
            database_url,
            default_menu_url,
            voting_window,
            retention_days: parse_var("DATA_RETENTION_DAYS", 30)?,
            scheduler_interval: Duration::from_secs(parse_var("SCHEDULER_INTERVAL_SECS", 60)?),
            send_delay: Duration::from_secs(parse_var("REPORT_SEND_DELAY_SECS", 4)?),
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ADMIN_ADDR format")]
    InvalidAddr,

    #[error("ADMIN_PASSWORD environment variable is required")]
    MissingAdminPassword,

    #[error("Invalid {var}: {value}")]
    Invalid { var: &'static str, value: String },
}
