//! Application state shared across handlers.

use std::sync::Arc;

use cafeteria_core::vote::VotingWindow;
use cafeteria_core::{local_now, DateKey, MenuResolver, Repository};
use chrono::NaiveDateTime;
use media_host::MediaClient;
use reporter::ReportScheduler;
use secrecy::{ExposeSecret, SecretString};

/// Request-independent settings.
pub struct Settings {
    pub admin_password: SecretString,
    pub voting_window: VotingWindow,
    pub retention_days: u32,
    /// Local wall clock.
    pub clock: fn() -> NaiveDateTime,
}

impl Settings {
    pub fn new(admin_password: SecretString) -> Self {
        Self {
            admin_password,
            voting_window: VotingWindow::default(),
            retention_days: 30,
            clock: local_now,
        }
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        let expected = self.admin_password.expose_secret();
        !expected.is_empty() && constant_time_eq(expected.as_bytes(), candidate.as_bytes())
    }
}

/// Byte comparison whose running time depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Votes, schedule config and send logs.
    pub repo: Repository,
    /// Menu lookup and upload records.
    pub menus: MenuResolver,
    /// File host client.
    pub media: MediaClient,
    /// Automatic report scheduler (and its reporter).
    pub scheduler: ReportScheduler,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        repo: Repository,
        menus: MenuResolver,
        media: MediaClient,
        scheduler: ReportScheduler,
        settings: Settings,
    ) -> Self {
        Self {
            repo,
            menus,
            media,
            scheduler,
            settings: Arc::new(settings),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.settings.clock)()
    }

    pub fn today(&self) -> DateKey {
        DateKey::of(self.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_password() {
        let settings = Settings::new(SecretString::from("s3cret".to_string()));
        assert!(settings.verify_password("s3cret"));
        assert!(!settings.verify_password("s3crex"));
        assert!(!settings.verify_password("s3cret "));
        assert!(!settings.verify_password(""));
    }

    #[test]
    fn test_empty_password_never_matches() {
        let settings = Settings::new(SecretString::from(String::new()));
        assert!(!settings.verify_password(""));
    }
}
