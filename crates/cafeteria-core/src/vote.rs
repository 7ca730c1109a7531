//! Ballot rules: voting window, name and duplicate checks.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;
use thiserror::Error;

use crate::models::{Ballot, Choice, DayVotes};

/// Why a ballot was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("name is required")]
    EmptyName,

    #[error("voting is closed for today (closes at {0})")]
    Closed(String),

    #[error("{0} has already voted today")]
    DuplicateName(String),
}

/// Daily voting window, open from midnight until `closes_at` local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingWindow {
    closes_at: NaiveTime,
}

impl Default for VotingWindow {
    fn default() -> Self {
        Self {
            closes_at: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Remaining time display for an open window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub hours: i64,
    pub minutes: i64,
}

impl VotingWindow {
    pub fn new(closes_at: NaiveTime) -> Self {
        Self { closes_at }
    }

    /// Parse a `HH:MM` closing time.
    pub fn parse(closes_at: &str) -> Option<Self> {
        NaiveTime::parse_from_str(closes_at.trim(), "%H:%M").ok().map(Self::new)
    }

    pub fn closes_at(&self) -> NaiveTime {
        self.closes_at
    }

    pub fn is_open(&self, now: NaiveDateTime) -> bool {
        now.time() < self.closes_at
    }

    /// Time until closing; zero once closed.
    pub fn time_left(&self, now: NaiveDateTime) -> TimeDelta {
        let left = now.date().and_time(self.closes_at) - now;
        left.max(TimeDelta::zero())
    }

    pub fn countdown(&self, now: NaiveDateTime) -> Countdown {
        let left = self.time_left(now);
        Countdown {
            hours: left.num_hours(),
            minutes: left.num_minutes() % 60,
        }
    }
}

/// Validate and record a vote in `votes`.
///
/// The caller persists `votes` afterwards.
pub fn cast_ballot(
    votes: &mut DayVotes,
    name: &str,
    choice: Choice,
    window: &VotingWindow,
    now: NaiveDateTime,
) -> Result<Ballot, VoteError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(VoteError::EmptyName);
    }
    if !window.is_open(now) {
        return Err(VoteError::Closed(window.closes_at.format("%H:%M").to_string()));
    }
    if votes.contains_name(name) {
        return Err(VoteError::DuplicateName(name.to_string()));
    }

    let ballot = Ballot::now(name);
    votes.push(choice, ballot.clone());
    Ok(ballot)
}
