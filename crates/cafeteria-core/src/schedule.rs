//! Automatic report schedule rules.

use chrono::{Datelike, Days, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::ScheduleConfig;
use crate::DateKey;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex"));

const DAY_NAMES: [&str; 7] = [
    "Dimanche", "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("at least one recipient is required")]
    NoRecipients,

    #[error("at least one day must be selected")]
    NoDays,

    #[error("invalid time (expected HH:MM): {0}")]
    InvalidTime(String),

    #[error("invalid weekday number: {0}")]
    InvalidDay(u8),

    #[error("email service is not configured")]
    MailerNotConfigured,
}

/// Parse a `H:MM`/`HH:MM` time of day.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    if !TIME_RE.is_match(input) {
        return None;
    }
    NaiveTime::parse_from_str(input, "%H:%M").ok()
}

/// Check a config before enabling it and return its normalized form:
/// `HH:MM` time, sorted unique days.
pub fn validate(config: &ScheduleConfig, mailer_configured: bool) -> Result<ScheduleConfig, ScheduleError> {
    if config.recipients.is_empty() {
        return Err(ScheduleError::NoRecipients);
    }
    if config.days.is_empty() {
        return Err(ScheduleError::NoDays);
    }
    if let Some(day) = config.days.iter().find(|d| **d > 6) {
        return Err(ScheduleError::InvalidDay(*day));
    }
    let time = parse_time(&config.time).ok_or_else(|| ScheduleError::InvalidTime(config.time.clone()))?;
    if !mailer_configured {
        return Err(ScheduleError::MailerNotConfigured);
    }

    let mut days = config.days.clone();
    days.sort_unstable();
    days.dedup();

    Ok(ScheduleConfig {
        enabled: config.enabled,
        recipients: config.recipients.clone(),
        time: time.format("%H:%M").to_string(),
        days,
    })
}

/// Whether a poll at `now` should fire the daily report.
///
/// True when the config is enabled, the current `HH:MM` equals the
/// configured time, today is a selected day and nothing was sent today.
pub fn is_due(config: &ScheduleConfig, now: NaiveDateTime, last_sent: Option<DateKey>) -> bool {
    if !config.enabled {
        return false;
    }
    let Some(time) = parse_time(&config.time) else {
        return false;
    };
    let today = DateKey::of(now);

    now.format("%H:%M").to_string() == time.format("%H:%M").to_string()
        && config.days.contains(&today.weekday_number())
        && last_sent != Some(today)
}

/// Next instant the report will fire, looking up to a week ahead.
pub fn next_send(config: &ScheduleConfig, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if !config.enabled {
        return None;
    }
    let time = parse_time(&config.time)?;

    (0..=7u64).find_map(|offset| {
        let date = now.date().checked_add_days(Days::new(offset))?;
        let weekday = date.weekday().num_days_from_sunday() as u8;
        let candidate = date.and_time(time);
        (config.days.contains(&weekday) && candidate > now).then_some(candidate)
    })
}

/// French names of the selected days, Sunday first.
pub fn day_names(days: &[u8]) -> Vec<&'static str> {
    let mut sorted: Vec<u8> = days.iter().copied().filter(|d| *d < 7).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.into_iter().map(|d| DAY_NAMES[d as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config(time: &str, days: &[u8]) -> ScheduleConfig {
        ScheduleConfig {
            enabled: true,
            recipients: vec!["chef@cantine.be".to_string()],
            time: time.to_string(),
            days: days.to_vec(),
        }
    }

    // 2025-03-05 is a Wednesday.
    fn wednesday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(h, m, 30)
            .unwrap()
    }

    #[test]
    fn test_due_on_matching_minute_and_day() {
        let cfg = config("18:00", &[1, 3, 5]);
        assert!(is_due(&cfg, wednesday(18, 0), None));
        assert!(!is_due(&cfg, wednesday(18, 1), None));
        assert!(!is_due(&cfg, wednesday(17, 59), None));
    }

    #[test]
    fn test_not_due_twice_the_same_day() {
        let cfg = config("18:00", &[1, 3, 5]);
        let today = DateKey::of(wednesday(18, 0));
        assert!(!is_due(&cfg, wednesday(18, 0), Some(today)));
        assert!(is_due(&cfg, wednesday(18, 0), Some(today.days_before(2))));
    }

    #[test]
    fn test_not_due_on_unselected_day_or_disabled() {
        assert!(!is_due(&config("18:00", &[1, 5]), wednesday(18, 0), None));

        let mut cfg = config("18:00", &[3]);
        cfg.enabled = false;
        assert!(!is_due(&cfg, wednesday(18, 0), None));
    }

    #[test]
    fn test_single_digit_hour_matches() {
        assert!(is_due(&config("8:05", &[3]), wednesday(8, 5), None));
    }

    #[test]
    fn test_validate_normalizes() {
        let cfg = validate(&config("7:30", &[5, 1, 5]), true).unwrap();
        assert_eq!(cfg.time, "07:30");
        assert_eq!(cfg.days, vec![1, 5]);
    }

    #[test]
    fn test_validate_errors() {
        let mut no_recipients = config("18:00", &[1]);
        no_recipients.recipients.clear();
        assert_eq!(validate(&no_recipients, true).unwrap_err(), ScheduleError::NoRecipients);
        assert_eq!(validate(&config("18:00", &[]), true).unwrap_err(), ScheduleError::NoDays);
        assert_eq!(validate(&config("18:00", &[7]), true).unwrap_err(), ScheduleError::InvalidDay(7));
        assert_eq!(
            validate(&config("24:00", &[1]), true).unwrap_err(),
            ScheduleError::InvalidTime("24:00".to_string())
        );
        assert_eq!(
            validate(&config("18:00", &[1]), false).unwrap_err(),
            ScheduleError::MailerNotConfigured
        );
    }

    #[test]
    fn test_next_send_same_day_and_next_week() {
        let cfg = config("18:00", &[3]);
        assert_eq!(
            next_send(&cfg, wednesday(9, 0)),
            Some(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap().and_hms_opt(18, 0, 0).unwrap())
        );
        assert_eq!(
            next_send(&cfg, wednesday(19, 0)),
            Some(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap().and_hms_opt(18, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_next_send_picks_nearest_day() {
        let cfg = config("12:00", &[1, 5]);
        // Wednesday evening -> Friday noon.
        assert_eq!(
            next_send(&cfg, wednesday(20, 0)),
            Some(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap().and_hms_opt(12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_day_names() {
        assert_eq!(day_names(&[5, 1, 0]), vec!["Dimanche", "Lundi", "Vendredi"]);
    }
}
