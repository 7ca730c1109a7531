//! Daily report delivery for the cafeteria service.
//!
//! This crate sends the daily vote summary to a list of recipients through a
//! [`TemplateMailer`](cafeteria_core::TemplateMailer), and runs the poll loop
//! that fires the automatic report once per configured day.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cafeteria_core::{local_now, Repository, SendSource, TemplateMailer};
//! use reporter::{ReportScheduler, Reporter};
//!
//! # async fn example(repo: Repository, mailer: Arc<dyn TemplateMailer>) -> Result<(), reporter::ReportError> {
//! let reporter = Reporter::new(repo, mailer);
//!
//! // Send now
//! let recipients = vec!["chef@cantine.be".to_string()];
//! let summary = reporter
//!     .send_daily_report(&recipients, SendSource::Manual, local_now())
//!     .await?;
//! println!("sent {} failed {}", summary.sent, summary.failed);
//!
//! // Or let the scheduler send at the configured time
//! let scheduler = ReportScheduler::new(reporter);
//! scheduler.arm();
//! # Ok(())
//! # }
//! ```

mod error;
mod report;
mod scheduler;

pub use error::ReportError;
pub use report::{Reporter, SendSummary, DEFAULT_SEND_DELAY};
pub use scheduler::{ReportScheduler, TickOutcome, DEFAULT_POLL_INTERVAL};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
