//! Calendar-day keys used as per-day document ids.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An ISO `YYYY-MM-DD` calendar day.
///
/// Serialized as the plain string, which is also the document id of every
/// per-day record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

/// A string that is not a `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date key: {0}")]
pub struct DateKeyError(pub String);

impl DateKey {
    /// strftime format of a key.
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's key in the server's local timezone.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Key of the day containing a local wall-clock instant.
    pub fn of(now: NaiveDateTime) -> Self {
        Self(now.date())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The key `days` calendar days earlier.
    pub fn days_before(&self, days: u32) -> Self {
        Self(
            self.0
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN),
        )
    }

    /// Weekday number, 0 = Sunday through 6 = Saturday.
    pub fn weekday_number(&self) -> u8 {
        self.0.weekday().num_days_from_sunday() as u8
    }
}

/// The server's local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT)
            .map(Self)
            .map_err(|_| DateKeyError(s.to_string()))
    }
}

impl TryFrom<String> for DateKey {
    type Error = DateKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}
