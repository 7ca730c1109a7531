//! Admin dashboard routes: stats, history, exports and data maintenance.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use cafeteria_core::stats::{self, DashboardStats, DayStats};
use cafeteria_core::{DateKey, Language, MenuSource};
use serde::Serialize;
use tracing::info;

use crate::auth::AdminGuard;
use crate::error::Result;
use crate::state::AppState;

#[derive(Serialize)]
pub struct LoginResponse {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub dashboard: DashboardStats,
    /// Last recorded days, oldest first.
    pub trend: Vec<DayStats>,
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub date: DateKey,
    pub reset: bool,
}

#[derive(Serialize)]
pub struct SweepResponse {
    pub cutoff: DateKey,
    pub removed: usize,
}

/// Password check for the admin login form.
pub async fn login(_admin: AdminGuard) -> Json<LoginResponse> {
    Json(LoginResponse { ok: true })
}

pub async fn stats(_admin: AdminGuard, State(state): State<AppState>) -> Json<StatsResponse> {
    let today = state.today();
    let all = state.repo.load_all_votes().await;
    Json(StatsResponse {
        dashboard: stats::dashboard(&all, today),
        trend: stats::trend(&all, today),
    })
}

pub async fn history(_admin: AdminGuard, State(state): State<AppState>) -> Json<Vec<DayStats>> {
    let all = state.repo.load_all_votes().await;
    Json(stats::history(&all))
}

/// All recorded days as a CSV download.
pub async fn export_csv(_admin: AdminGuard, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let all = state.repo.load_all_votes().await;
    let csv = stats::export_csv(&all)?;
    let disposition = format!("attachment; filename=\"cantine-export-{}.csv\"", state.today());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// Today's results as plain text.
pub async fn export_today(_admin: AdminGuard, State(state): State<AppState>) -> impl IntoResponse {
    let today = state.today();
    let votes = state.repo.load_votes(today).await;
    let menu = state.menus.resolve(today, Language::Fr).await;
    let menu_url = (menu.source != MenuSource::Default).then_some(menu.url.as_str());

    let text = stats::export_day_text(today, &votes, menu_url);
    let disposition = format!("attachment; filename=\"resultats-cantine-{}.txt\"", today);

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        text,
    )
}

/// Delete today's votes from both tiers.
pub async fn reset_today(_admin: AdminGuard, State(state): State<AppState>) -> Result<Json<ResetResponse>> {
    let date = state.today();
    state.repo.reset_day(date).await?;
    info!(date = %date, "Daily votes reset");
    Ok(Json(ResetResponse { date, reset: true }))
}

/// Delete days older than the retention window.
pub async fn retention_sweep(_admin: AdminGuard, State(state): State<AppState>) -> Json<SweepResponse> {
    let cutoff = state.today().days_before(state.settings.retention_days);
    let removed = state.repo.purge_before(cutoff).await;
    info!(cutoff = %cutoff, removed, "Retention sweep complete");
    Json(SweepResponse { cutoff, removed })
}
