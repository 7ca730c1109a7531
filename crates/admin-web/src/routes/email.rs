//! Email report routes: schedule setup, stop, manual send and logs.

use axum::extract::State;
use axum::Json;
use cafeteria_core::{recipients, schedule, DateKey, ScheduleConfig, SendLogEntry, SendSource, Tier};
use chrono::NaiveDateTime;
use reporter::SendSummary;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::AdminGuard;
use crate::error::Result;
use crate::state::AppState;

/// Send logs shown on the dashboard.
const RECENT_LOGS: usize = 7;

/// Schedule config and scheduler status.
#[derive(Serialize)]
pub struct EmailStatus {
    pub config: ScheduleConfig,
    pub day_names: Vec<&'static str>,
    pub armed: bool,
    pub mailer_configured: bool,
    pub next_send: Option<NaiveDateTime>,
    pub last_sent: Option<DateKey>,
}

#[derive(Deserialize)]
pub struct SetupRequest {
    pub recipients: Vec<String>,
    pub time: String,
    pub days: Vec<u8>,
}

#[derive(Serialize)]
pub struct SetupResponse {
    pub config: ScheduleConfig,
    pub duplicates_removed: bool,
    pub stored: Tier,
    pub next_send: Option<NaiveDateTime>,
}

#[derive(Serialize)]
pub struct StopResponse {
    pub was_armed: bool,
}

#[derive(Deserialize)]
pub struct ManualSendRequest {
    pub recipients: Vec<String>,
}

pub async fn status(_admin: AdminGuard, State(state): State<AppState>) -> Json<EmailStatus> {
    let config = state.repo.load_schedule().await;
    let now = state.now();

    Json(EmailStatus {
        day_names: schedule::day_names(&config.days),
        armed: state.scheduler.is_armed(),
        mailer_configured: state.scheduler.reporter().mailer_configured(),
        next_send: config.enabled.then(|| schedule::next_send(&config, now)).flatten(),
        last_sent: state.repo.last_sent().await,
        config,
    })
}

/// Validate, save and arm automatic sending.
pub async fn setup(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Json(req): Json<SetupRequest>,
) -> Result<Json<SetupResponse>> {
    let (emails, duplicates_removed) = recipients::collect_deduped(&req.recipients)?;
    if duplicates_removed {
        warn!("Duplicate recipients removed from schedule");
    }

    let config = schedule::validate(
        &ScheduleConfig {
            enabled: true,
            recipients: emails,
            time: req.time,
            days: req.days,
        },
        state.scheduler.reporter().mailer_configured(),
    )?;

    let stored = state.repo.save_schedule(&config).await?;
    state.scheduler.arm();

    info!(
        time = %config.time,
        days = ?config.days,
        recipients = config.recipients.len(),
        "Automatic sending enabled"
    );

    Ok(Json(SetupResponse {
        next_send: schedule::next_send(&config, state.now()),
        config,
        duplicates_removed,
        stored,
    }))
}

/// Disable automatic sending.
pub async fn stop(_admin: AdminGuard, State(state): State<AppState>) -> Result<Json<StopResponse>> {
    let mut config = state.repo.load_schedule().await;
    config.enabled = false;
    state.repo.save_schedule(&config).await?;

    let was_armed = state.scheduler.disarm();
    info!(was_armed, "Automatic sending disabled");
    Ok(Json(StopResponse { was_armed }))
}

/// Send today's report now. Duplicate recipients are refused.
pub async fn send_now(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Json(req): Json<ManualSendRequest>,
) -> Result<Json<SendSummary>> {
    let emails = recipients::collect_strict(&req.recipients)?;
    let summary = state
        .scheduler
        .reporter()
        .send_daily_report(&emails, SendSource::Manual, state.now())
        .await?;
    Ok(Json(summary))
}

pub async fn logs(_admin: AdminGuard, State(state): State<AppState>) -> Result<Json<Vec<SendLogEntry>>> {
    Ok(Json(state.repo.recent_send_logs(RECENT_LOGS).await?))
}
