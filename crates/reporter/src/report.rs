//! Report batch sending.

use std::sync::Arc;
use std::time::Duration;

use cafeteria_core::report::ReportSummary;
use cafeteria_core::{DateKey, Repository, SendLog, SendSource, TemplateMailer};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::ReportError;

/// Pause between two sends of a batch.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(4);

/// Outcome of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SendSummary {
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    /// Id of the appended send log, if it could be stored.
    pub log_id: Option<String>,
}

/// Sends the daily report.
#[derive(Clone)]
pub struct Reporter {
    repo: Repository,
    mailer: Arc<dyn TemplateMailer>,
    send_delay: Duration,
}

impl Reporter {
    pub fn new(repo: Repository, mailer: Arc<dyn TemplateMailer>) -> Self {
        Self {
            repo,
            mailer,
            send_delay: DEFAULT_SEND_DELAY,
        }
    }

    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn mailer_configured(&self) -> bool {
        self.mailer.is_configured()
    }

    /// Send today's summary to every recipient, one after the other.
    ///
    /// A failed recipient is counted and the batch goes on. A send log is
    /// appended once the batch is over.
    pub async fn send_daily_report(
        &self,
        recipients: &[String],
        source: SendSource,
        now: NaiveDateTime,
    ) -> Result<SendSummary, ReportError> {
        if recipients.is_empty() {
            return Err(ReportError::NoRecipients);
        }
        if !self.mailer.is_configured() {
            return Err(ReportError::MailerNotConfigured);
        }

        let all = self.repo.load_all_votes().await;
        let report = ReportSummary::build(&all, now);
        let total = recipients.len();

        info!(
            source = ?source,
            recipient_count = total,
            votes_total = report.total_count,
            "Sending daily report"
        );

        let mut summary = SendSummary::default();
        for (i, email) in recipients.iter().enumerate() {
            if i > 0 && !self.send_delay.is_zero() {
                tokio::time::sleep(self.send_delay).await;
            }

            let params = serde_json::to_value(report.for_recipient(email, i + 1, total))?;
            match self.mailer.send_template(email, &params).await {
                Ok(()) => {
                    summary.sent += 1;
                    info!(recipient = %email, index = i + 1, total, "Report sent");
                }
                Err(err) => {
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", email, err));
                    warn!(recipient = %email, error = %err, "Report failed");
                }
            }
        }

        info!(sent = summary.sent, failed = summary.failed, "Report batch complete");

        let log = SendLog {
            timestamp: Utc::now(),
            source,
            success_count: summary.sent,
            error_count: summary.failed,
            votes_total: report.total_count,
            recipients: recipients.to_vec(),
            date: DateKey::of(now),
        };
        match self.repo.append_send_log(&log).await {
            Ok(id) => summary.log_id = Some(id),
            Err(e) => warn!(error = %e, "Failed to store send log"),
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafeteria_core::{collections, Ballot, Choice, DayVotes};
    use chrono::NaiveDate;
    use mock_store::{MemoryLocalStore, MemoryRemoteStore, RecordingMailer};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    async fn setup(mailer: RecordingMailer) -> (Reporter, Arc<MemoryRemoteStore>, Arc<RecordingMailer>) {
        let remote = Arc::new(MemoryRemoteStore::new());
        let repo = Repository::new(remote.clone(), Arc::new(MemoryLocalStore::new()));

        let mut votes = DayVotes::default();
        for name in ["a", "b", "c"] {
            votes.push(Choice::Oui, Ballot::now(name));
        }
        votes.push(Choice::Non, Ballot::now("d"));
        repo.save_votes(DateKey::of(now()), &votes).await.unwrap();

        let mailer = Arc::new(mailer);
        let reporter = Reporter::new(repo, mailer.clone()).with_send_delay(Duration::ZERO);
        (reporter, remote, mailer)
    }

    #[tokio::test]
    async fn test_failed_recipient_does_not_stop_batch() {
        let (reporter, remote, mailer) = setup(RecordingMailer::new().fail_for("bad@x.be")).await;
        let recipients = vec![
            "a@x.be".to_string(),
            "bad@x.be".to_string(),
            "c@x.be".to_string(),
        ];

        let summary = reporter
            .send_daily_report(&recipients, SendSource::Manual, now())
            .await
            .unwrap();

        assert_eq!(summary.sent, 2);
        assert_eq!(summary.failed, 1);
        assert!(summary.errors[0].starts_with("bad@x.be"));
        assert_eq!(mailer.sent_to(), vec!["a@x.be", "c@x.be"]);

        let log_id = summary.log_id.unwrap();
        let log = remote.snapshot(collections::EMAIL_LOGS, &log_id).unwrap();
        assert_eq!(log["success_count"], 2);
        assert_eq!(log["error_count"], 1);
        assert_eq!(log["votes_total"], 4);
        assert_eq!(log["source"], "manual");
    }

    #[tokio::test]
    async fn test_params_per_recipient() {
        let (reporter, _, mailer) = setup(RecordingMailer::new()).await;
        let recipients = vec!["a@x.be".to_string(), "b@x.be".to_string()];

        reporter
            .send_daily_report(&recipients, SendSource::Automatic, now())
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent[0].1["to_email"], "a@x.be");
        assert_eq!(sent[0].1["recipient_index"], 1);
        assert_eq!(sent[1].1["recipient_index"], 2);
        assert_eq!(sent[1].1["total_recipients"], 2);
        assert_eq!(sent[0].1["oui_percent"], 75);
        assert_eq!(sent[0].1["date_fr"], "mercredi 5 mars 2025");
        assert_ne!(sent[0].1["unique_send_id"], sent[1].1["unique_send_id"]);
    }

    #[tokio::test]
    async fn test_refuses_without_recipients_or_mailer() {
        let (reporter, _, _) = setup(RecordingMailer::new()).await;
        assert!(matches!(
            reporter.send_daily_report(&[], SendSource::Manual, now()).await,
            Err(ReportError::NoRecipients)
        ));

        let (reporter, remote, _) = setup(RecordingMailer::unconfigured()).await;
        assert!(matches!(
            reporter
                .send_daily_report(&["a@x.be".to_string()], SendSource::Manual, now())
                .await,
            Err(ReportError::MailerNotConfigured)
        ));
        assert_eq!(remote.count(collections::EMAIL_LOGS), 0);
    }

    #[tokio::test]
    async fn test_log_failure_is_not_fatal() {
        let (reporter, remote, mailer) = setup(RecordingMailer::new()).await;
        remote.set_available(false);

        let summary = reporter
            .send_daily_report(&["a@x.be".to_string()], SendSource::Manual, now())
            .await
            .unwrap();

        assert_eq!(summary.sent, 1);
        assert!(summary.log_id.is_none());
        assert_eq!(mailer.sent_to().len(), 1);
    }
}
