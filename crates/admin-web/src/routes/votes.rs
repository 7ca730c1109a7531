//! Public vote routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cafeteria_core::stats::DayStats;
use cafeteria_core::vote::{self, Countdown};
use cafeteria_core::{Ballot, Choice, DateKey, DayVotes, Tier};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AdminError, Result};
use crate::state::AppState;

/// Today's votes and voting window.
#[derive(Serialize)]
pub struct TodayResponse {
    pub date: DateKey,
    pub votes: DayVotes,
    pub stats: DayStats,
    pub open: bool,
    pub closes_at: String,
    /// Time left while voting is open.
    pub countdown: Option<Countdown>,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    pub name: String,
    pub choice: String,
}

#[derive(Serialize)]
pub struct VoteResponse {
    pub date: DateKey,
    pub choice: Choice,
    pub ballot: Ballot,
    /// Tier that accepted the write.
    pub stored: Tier,
    pub stats: DayStats,
}

/// Today's ballots.
pub async fn today(State(state): State<AppState>) -> Json<TodayResponse> {
    let now = state.now();
    let date = DateKey::of(now);
    let votes = state.repo.load_votes(date).await;
    let window = state.settings.voting_window;
    let open = window.is_open(now);

    Json(TodayResponse {
        date,
        stats: DayStats::of(date, &votes),
        votes,
        open,
        closes_at: window.closes_at().format("%H:%M").to_string(),
        countdown: open.then(|| window.countdown(now)),
    })
}

/// Submit a vote for today.
///
/// Load, append and save run without a lock, so two submissions for the
/// same day can race: the later save wins and drops the earlier ballot.
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<VoteRequest>,
) -> Result<(StatusCode, Json<VoteResponse>)> {
    let choice: Choice = req.choice.parse().map_err(AdminError::BadRequest)?;
    let now = state.now();
    let date = DateKey::of(now);

    let mut votes = state.repo.load_votes(date).await;
    let ballot = vote::cast_ballot(&mut votes, &req.name, choice, &state.settings.voting_window, now)?;
    let stored = state.repo.save_votes(date, &votes).await?;

    info!(date = %date, choice = %choice, total = votes.total(), "Vote recorded");

    Ok((
        StatusCode::CREATED,
        Json(VoteResponse {
            date,
            choice,
            ballot,
            stored,
            stats: DayStats::of(date, &votes),
        }),
    ))
}
