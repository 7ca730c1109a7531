//! Recording mailer.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use cafeteria_core::{MailError, TemplateMailer};
use serde_json::Value;

/// A [`TemplateMailer`] that records sends instead of delivering them.
#[derive(Debug)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, Value)>>,
    failing: HashSet<String>,
    configured: bool,
}

impl Default for RecordingMailer {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: HashSet::new(),
            configured: true,
        }
    }
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer that reports itself as not configured.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::default()
        }
    }

    /// Make sends to `address` fail with [`MailError::Rejected`].
    pub fn fail_for(mut self, address: impl Into<String>) -> Self {
        self.failing.insert(address.into().to_lowercase());
        self
    }

    /// Every successful send, in order.
    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent().into_iter().map(|(to, _)| to).collect()
    }
}

#[async_trait]
impl TemplateMailer for RecordingMailer {
    async fn send_template(&self, to: &str, params: &Value) -> Result<(), MailError> {
        if !self.configured {
            return Err(MailError::NotConfigured);
        }
        if self.failing.contains(&to.to_lowercase()) {
            return Err(MailError::Rejected(format!("mailbox unavailable: {to}")));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((to.to_string(), params.clone()));
        Ok(())
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}
