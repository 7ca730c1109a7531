//! Vote aggregation for the dashboard, exports and reports.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Choice, DayVotes};
use crate::DateKey;

/// Days in the trailing average and the trend chart.
pub const WEEK_WINDOW: usize = 7;

/// Counts and percentages of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayStats {
    pub date: DateKey,
    pub oui_count: usize,
    pub non_count: usize,
    pub total: usize,
    pub oui_percent: u32,
    pub non_percent: u32,
}

impl DayStats {
    pub fn of(date: DateKey, votes: &DayVotes) -> Self {
        let oui = votes.count(Choice::Oui);
        let non = votes.count(Choice::Non);
        let (oui_percent, non_percent) = percentages(oui, non);
        Self {
            date,
            oui_count: oui,
            non_count: non,
            total: oui + non,
            oui_percent,
            non_percent,
        }
    }
}

/// Rounded (half up) percentages that always sum to 100, or both 0 without
/// votes.
pub fn percentages(oui: usize, non: usize) -> (u32, u32) {
    let total = oui + non;
    if total == 0 {
        return (0, 0);
    }
    let oui_percent = ((oui * 200 + total) / (total * 2)) as u32;
    (oui_percent, 100 - oui_percent)
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub today: DayStats,
    /// Rounded mean of daily totals over the last recorded days.
    pub week_average: usize,
    pub days_recorded: usize,
}

pub fn dashboard(all: &BTreeMap<DateKey, DayVotes>, today: DateKey) -> DashboardStats {
    let today_stats = match all.get(&today) {
        Some(votes) => DayStats::of(today, votes),
        None => DayStats::of(today, &DayVotes::default()),
    };
    DashboardStats {
        today: today_stats,
        week_average: week_average(all, today),
        days_recorded: all.len(),
    }
}

fn last_days(all: &BTreeMap<DateKey, DayVotes>, today: DateKey) -> impl Iterator<Item = (&DateKey, &DayVotes)> {
    let recorded = all.range(..=today);
    let skip = recorded.clone().count().saturating_sub(WEEK_WINDOW);
    recorded.skip(skip)
}

/// Rounded average daily total over the last seven recorded days up to
/// `today`. Zero when nothing was recorded.
pub fn week_average(all: &BTreeMap<DateKey, DayVotes>, today: DateKey) -> usize {
    let (days, total) = last_days(all, today).fold((0usize, 0usize), |(days, total), (_, votes)| {
        (days + 1, total + votes.total())
    });
    if days == 0 {
        return 0;
    }
    (total * 2 + days) / (days * 2)
}

/// The last seven recorded days up to `today`, oldest first.
pub fn trend(all: &BTreeMap<DateKey, DayVotes>, today: DateKey) -> Vec<DayStats> {
    last_days(all, today)
        .map(|(date, votes)| DayStats::of(*date, votes))
        .collect()
}

/// Every recorded day, newest first.
pub fn history(all: &BTreeMap<DateKey, DayVotes>) -> Vec<DayStats> {
    all.iter()
        .rev()
        .map(|(date, votes)| DayStats::of(*date, votes))
        .collect()
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),

    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Full history as CSV, oldest first, followed by the participant names of
/// each day.
pub fn export_csv(all: &BTreeMap<DateKey, DayVotes>) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(["Date", "Mangent", "Ne mangent pas", "Total", "Pourcentage cantine"])?;

    for (date, votes) in all {
        let stats = DayStats::of(*date, votes);
        writer.write_record([
            date.to_string(),
            stats.oui_count.to_string(),
            stats.non_count.to_string(),
            stats.total.to_string(),
            format!("{}%", stats.oui_percent),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    let mut out = String::from_utf8(bytes)?;

    out.push_str("\n\nDétail des participants:\n");
    for (date, votes) in all {
        let _ = write!(out, "\n{date}:\n");
        if !votes.oui.is_empty() {
            out.push_str("Mangent à la cantine:\n");
            for ballot in &votes.oui {
                let _ = writeln!(out, "- {}", ballot.name);
            }
        }
        if !votes.non.is_empty() {
            out.push_str("Ne mangent pas à la cantine:\n");
            for ballot in &votes.non {
                let _ = writeln!(out, "- {}", ballot.name);
            }
        }
    }

    Ok(out)
}

/// Plain-text summary of one day with numbered participant lists.
///
/// `menu_url` is `None` when the default image is shown.
pub fn export_day_text(date: DateKey, votes: &DayVotes, menu_url: Option<&str>) -> String {
    let oui = votes.count(Choice::Oui);
    let non = votes.count(Choice::Non);
    let mut out = String::new();

    let _ = writeln!(out, "Résultats Cantine - {}", date.date().format("%d/%m/%Y"));
    out.push_str("================================\n\n");
    let _ = writeln!(out, "Mangent à la cantine: {oui}");
    let _ = writeln!(out, "Ne mangent pas à la cantine: {non}");
    let _ = writeln!(out, "Total participants: {}\n", oui + non);

    match menu_url {
        Some(url) => {
            let _ = writeln!(out, "Image du menu: {url}\n");
        }
        None => out.push_str("Image du menu: Image par défaut\n\n"),
    }

    out.push_str("Détail des participants:\n");
    out.push_str("------------------------\n\n");

    if oui > 0 {
        let _ = writeln!(out, "✓ MANGENT À LA CANTINE ({oui}):");
        for (i, ballot) in votes.oui.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, ballot.name);
        }
        out.push('\n');
    }
    if non > 0 {
        let _ = writeln!(out, "✗ NE MANGENT PAS À LA CANTINE ({non}):");
        for (i, ballot) in votes.non.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, ballot.name);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ballot;

    fn day(oui: usize, non: usize) -> DayVotes {
        let mut votes = DayVotes::default();
        for i in 0..oui {
            votes.push(Choice::Oui, Ballot::now(format!("oui-{i}")));
        }
        for i in 0..non {
            votes.push(Choice::Non, Ballot::now(format!("non-{i}")));
        }
        votes
    }

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_three_oui_one_non() {
        let stats = DayStats::of(key("2025-03-05"), &day(3, 1));
        assert_eq!(stats.total, 4);
        assert_eq!(stats.oui_percent, 75);
        assert_eq!(stats.non_percent, 25);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        for oui in 0..12 {
            for non in 0..12 {
                let (o, n) = percentages(oui, non);
                if oui + non == 0 {
                    assert_eq!((o, n), (0, 0));
                } else {
                    assert_eq!(o + n, 100, "oui={oui} non={non}");
                }
            }
        }
        assert_eq!(percentages(1, 2), (33, 67));
        assert_eq!(percentages(1, 1), (50, 50));
    }

    #[test]
    fn test_week_average_uses_last_seven_days_up_to_today() {
        let mut all = BTreeMap::new();
        // Eight days of 10 votes, one old day of 100 that falls out of the window.
        all.insert(key("2025-02-20"), day(100, 0));
        for d in 1..=7 {
            all.insert(key(&format!("2025-03-0{d}")), day(6, 4));
        }
        // Future day is ignored.
        all.insert(key("2025-03-20"), day(50, 50));

        assert_eq!(week_average(&all, key("2025-03-07")), 10);
        assert_eq!(trend(&all, key("2025-03-07")).len(), 7);
        assert_eq!(trend(&all, key("2025-03-07"))[0].date, key("2025-03-01"));
    }

    #[test]
    fn test_week_average_rounds() {
        let mut all = BTreeMap::new();
        all.insert(key("2025-03-01"), day(1, 0));
        all.insert(key("2025-03-02"), day(2, 0));
        assert_eq!(week_average(&all, key("2025-03-02")), 2);
        assert_eq!(week_average(&BTreeMap::new(), key("2025-03-02")), 0);
    }

    #[test]
    fn test_dashboard_without_votes_today() {
        let mut all = BTreeMap::new();
        all.insert(key("2025-03-04"), day(2, 2));
        let stats = dashboard(&all, key("2025-03-05"));
        assert_eq!(stats.today.total, 0);
        assert_eq!(stats.today.oui_percent, 0);
        assert_eq!(stats.week_average, 4);
        assert_eq!(stats.days_recorded, 1);
    }

    #[test]
    fn test_history_newest_first() {
        let mut all = BTreeMap::new();
        all.insert(key("2025-03-04"), day(1, 0));
        all.insert(key("2025-03-05"), day(0, 1));
        let rows = history(&all);
        assert_eq!(rows[0].date, key("2025-03-05"));
        assert_eq!(rows[1].oui_percent, 100);
    }

    #[test]
    fn test_export_csv_layout() {
        let mut all = BTreeMap::new();
        all.insert(key("2025-03-05"), day(3, 1));
        let csv = export_csv(&all).unwrap();

        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Date,Mangent,Ne mangent pas,Total,Pourcentage cantine"));
        assert_eq!(lines.next(), Some("2025-03-05,3,1,4,75%"));
        assert!(csv.contains("Détail des participants:"));
        assert!(csv.contains("- oui-2\n"));
        assert!(csv.contains("Ne mangent pas à la cantine:\n- non-0\n"));
    }

    #[test]
    fn test_export_day_text() {
        let text = export_day_text(key("2025-03-05"), &day(2, 0), None);
        assert!(text.starts_with("Résultats Cantine - 05/03/2025\n"));
        assert!(text.contains("Total participants: 2\n"));
        assert!(text.contains("Image par défaut"));
        assert!(text.contains("2. oui-1\n"));
        assert!(!text.contains("NE MANGENT PAS"));
    }
}
