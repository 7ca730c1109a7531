//! Template variables of the daily email report.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::DayVotes;
use crate::stats::{week_average, DayStats};
use crate::DateKey;

const WEEKDAYS: [&str; 7] = [
    "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
];

const MONTHS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin",
    "juillet", "août", "septembre", "octobre", "novembre", "décembre",
];

/// Long French date, e.g. `mercredi 5 mars 2025`.
pub fn french_long_date(date: NaiveDate) -> String {
    format!(
        "{} {} {} {}",
        WEEKDAYS[date.weekday().num_days_from_sunday() as usize],
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Variables shared by every recipient of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub date_fr: String,
    pub time: String,
    pub oui_count: usize,
    pub non_count: usize,
    pub total_count: usize,
    pub oui_percent: u32,
    pub non_percent: u32,
    pub average_week: usize,
}

impl ReportSummary {
    pub fn build(all: &BTreeMap<DateKey, DayVotes>, now: NaiveDateTime) -> Self {
        let today = DateKey::of(now);
        let stats = match all.get(&today) {
            Some(votes) => DayStats::of(today, votes),
            None => DayStats::of(today, &DayVotes::default()),
        };

        Self {
            date_fr: french_long_date(today.date()),
            time: now.format("%H:%M").to_string(),
            oui_count: stats.oui_count,
            non_count: stats.non_count,
            total_count: stats.total,
            oui_percent: stats.oui_percent,
            non_percent: stats.non_percent,
            average_week: week_average(all, today),
        }
    }

    /// Full parameter set for one recipient. `index` is 1-based.
    pub fn for_recipient(&self, to_email: &str, index: usize, total_recipients: usize) -> ReportParams {
        ReportParams {
            to_email: to_email.to_string(),
            summary: self.clone(),
            unique_send_id: Uuid::new_v4().to_string(),
            recipient_index: index,
            total_recipients,
            send_timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Template variables for a single send.
///
/// The per-recipient fields keep the email API from collapsing identical
/// sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportParams {
    pub to_email: String,
    #[serde(flatten)]
    pub summary: ReportSummary,
    pub unique_send_id: String,
    pub recipient_index: usize,
    pub total_recipients: usize,
    pub send_timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ballot, Choice};

    #[test]
    fn test_french_long_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(french_long_date(date), "mercredi 5 mars 2025");
        let date = NaiveDate::from_ymd_opt(2024, 8, 18).unwrap();
        assert_eq!(french_long_date(date), "dimanche 18 août 2024");
    }

    #[test]
    fn test_params_carry_all_template_fields() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        let mut votes = DayVotes::default();
        votes.push(Choice::Oui, Ballot::now("a"));
        votes.push(Choice::Oui, Ballot::now("b"));
        votes.push(Choice::Oui, Ballot::now("c"));
        votes.push(Choice::Non, Ballot::now("d"));
        let mut all = BTreeMap::new();
        all.insert(DateKey::of(now), votes);

        let summary = ReportSummary::build(&all, now);
        let first = summary.for_recipient("a@x.be", 1, 2);
        let second = summary.for_recipient("b@x.be", 2, 2);
        assert_ne!(first.unique_send_id, second.unique_send_id);

        let value = serde_json::to_value(&first).unwrap();
        for field in [
            "to_email", "date_fr", "time", "oui_count", "non_count", "total_count",
            "oui_percent", "non_percent", "average_week", "unique_send_id",
            "recipient_index", "total_recipients", "send_timestamp",
        ] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert_eq!(value["time"], "18:00");
        assert_eq!(value["oui_percent"], 75);
        assert_eq!(value["average_week"], 4);
    }
}
