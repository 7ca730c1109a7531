//! Once-a-day automatic report, driven by a fixed poll interval.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use cafeteria_core::{local_now, schedule, DateKey, SendSource};
use chrono::NaiveDateTime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::{ReportError, Reporter, SendSummary};

/// How often the stored schedule is checked.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// What a poll decided.
#[derive(Debug)]
pub enum TickOutcome {
    /// Automatic sending is off.
    Disabled,
    /// Not the configured minute or day, or already sent today.
    NotDue,
    /// A send was started.
    Fired(JoinHandle<Result<SendSummary, ReportError>>),
}

/// Polls the stored schedule and fires the daily report.
///
/// Idle until [`arm`](Self::arm)ed. Disarming stops the polling only; a
/// report that already started runs to completion.
#[derive(Clone)]
pub struct ReportScheduler {
    reporter: Reporter,
    interval: Duration,
    handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ReportScheduler {
    pub fn new(reporter: Reporter) -> Self {
        Self {
            reporter,
            interval: DEFAULT_POLL_INTERVAL,
            handle: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Start polling, replacing any previous poll task.
    pub fn arm(&self) {
        let scheduler = self.clone();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                scheduler.tick(local_now()).await;
            }
        });

        if let Some(previous) = self.lock().replace(task) {
            previous.abort();
        }
        info!(interval_secs = interval.as_secs(), "Report scheduler armed");
    }

    /// Stop polling. Returns whether the scheduler was armed.
    pub fn disarm(&self) -> bool {
        match self.lock().take() {
            Some(task) => {
                task.abort();
                info!("Report scheduler disarmed");
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.lock().as_ref().is_some_and(|task| !task.is_finished())
    }

    /// One poll: read the stored schedule and fire the report if due.
    ///
    /// The last-sent guard is stamped before the send starts, so a slow
    /// batch cannot be fired twice.
    pub async fn tick(&self, now: NaiveDateTime) -> TickOutcome {
        let repo = self.reporter.repository();
        let config = repo.load_schedule().await;
        if !config.enabled {
            return TickOutcome::Disabled;
        }

        let last_sent = repo.last_sent().await;
        if !schedule::is_due(&config, now, last_sent) {
            debug!(now = %now.format("%H:%M"), time = %config.time, "Report not due");
            return TickOutcome::NotDue;
        }

        let today = DateKey::of(now);
        if let Err(e) = repo.stamp_last_sent(today).await {
            warn!(error = %e, "Failed to stamp last-sent guard");
        }
        info!(date = %today, recipients = config.recipients.len(), "Automatic report due");

        let reporter = self.reporter.clone();
        TickOutcome::Fired(tokio::spawn(async move {
            let result = reporter
                .send_daily_report(&config.recipients, SendSource::Automatic, now)
                .await;
            if let Err(e) = &result {
                error!(error = %e, "Automatic report failed");
            }
            result
        }))
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
