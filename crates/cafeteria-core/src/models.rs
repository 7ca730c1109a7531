//! Document shapes shared by the stores, the rules and the HTTP surface.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::DateKey;

/// A lunch vote answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    /// Eats at the cafeteria.
    Oui,
    /// Does not.
    Non,
}

impl Choice {
    pub fn label(&self) -> &'static str {
        match self {
            Choice::Oui => "oui",
            Choice::Non => "non",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oui" => Ok(Choice::Oui),
            "non" => Ok(Choice::Non),
            other => Err(format!("unknown choice: {other}")),
        }
    }
}

/// One participant's vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// Name as typed (trimmed).
    pub name: String,
    /// When the vote was cast.
    pub timestamp: DateTime<Utc>,
}

impl Ballot {
    /// A ballot stamped with the current time.
    pub fn now(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: Utc::now(),
        }
    }
}

/// All ballots of one day, per choice, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayVotes {
    #[serde(default)]
    pub oui: Vec<Ballot>,
    #[serde(default)]
    pub non: Vec<Ballot>,
}

impl DayVotes {
    pub fn ballots(&self, choice: Choice) -> &[Ballot] {
        match choice {
            Choice::Oui => &self.oui,
            Choice::Non => &self.non,
        }
    }

    pub fn count(&self, choice: Choice) -> usize {
        self.ballots(choice).len()
    }

    pub fn total(&self) -> usize {
        self.oui.len() + self.non.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Whether `name` already voted today, ignoring case and surrounding spaces.
    pub fn contains_name(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.oui
            .iter()
            .chain(self.non.iter())
            .any(|b| b.name.trim().to_lowercase() == wanted)
    }

    /// Appends without any duplicate check; see [`crate::vote::cast_ballot`].
    pub fn push(&mut self, choice: Choice, ballot: Ballot) {
        match choice {
            Choice::Oui => self.oui.push(ballot),
            Choice::Non => self.non.push(ballot),
        }
    }
}

/// Remote shape of a day in the `votes` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDocument {
    #[serde(default)]
    pub votes: DayVotes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateKey>,
}

impl VoteDocument {
    pub fn new(date: DateKey, votes: DayVotes) -> Self {
        Self {
            votes,
            last_updated: Some(Utc::now()),
            date: Some(date),
        }
    }
}

/// Kind of an uploaded menu file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuFileKind {
    #[default]
    Image,
    Pdf,
}

impl MenuFileKind {
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.eq_ignore_ascii_case("application/pdf") {
            MenuFileKind::Pdf
        } else {
            MenuFileKind::Image
        }
    }

    /// Kind from a stored `fileType` tag; anything but `pdf` is an image.
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("pdf") {
            MenuFileKind::Pdf
        } else {
            MenuFileKind::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MenuFileKind::Image => "image",
            MenuFileKind::Pdf => "pdf",
        }
    }
}

/// Menu language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Fr,
    Nl,
}

impl Language {
    pub fn other(&self) -> Self {
        match self {
            Language::Fr => Language::Nl,
            Language::Nl => Language::Fr,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::Nl => "nl",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Language::Fr),
            "nl" => Ok(Language::Nl),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

/// A resolved menu file: where it lives and how to show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuFileView {
    pub url: String,
    pub kind: MenuFileKind,
    pub public_id: Option<String>,
}

/// A document of the `menu_files` collection.
///
/// Holds untagged fields plus optional per-language variants. A language
/// variant is only meaningful when its URL is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuFileDocument {
    #[serde(rename = "fileURL", default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(
        rename = "fileType",
        default,
        deserialize_with = "lenient_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_type: Option<MenuFileKind>,
    #[serde(rename = "publicId", default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,

    #[serde(rename = "fileURL_fr", default, skip_serializing_if = "Option::is_none")]
    pub file_url_fr: Option<String>,
    #[serde(
        rename = "fileType_fr",
        default,
        deserialize_with = "lenient_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_type_fr: Option<MenuFileKind>,
    #[serde(rename = "publicId_fr", default, skip_serializing_if = "Option::is_none")]
    pub public_id_fr: Option<String>,

    #[serde(rename = "fileURL_nl", default, skip_serializing_if = "Option::is_none")]
    pub file_url_nl: Option<String>,
    #[serde(
        rename = "fileType_nl",
        default,
        deserialize_with = "lenient_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_type_nl: Option<MenuFileKind>,
    #[serde(rename = "publicId_nl", default, skip_serializing_if = "Option::is_none")]
    pub public_id_nl: Option<String>,

    /// Kept as stored; older records use other date formats.
    #[serde(rename = "uploadDate", default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

fn lenient_kind<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<MenuFileKind>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.map(|v| MenuFileKind::from_tag(v.as_str().unwrap_or_default())))
}

fn view(url: &Option<String>, kind: Option<MenuFileKind>, public_id: &Option<String>) -> Option<MenuFileView> {
    let url = url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
    Some(MenuFileView {
        url: url.to_string(),
        kind: kind.unwrap_or_default(),
        public_id: public_id.clone(),
    })
}

impl MenuFileDocument {
    /// The language-specific file, if one was uploaded for `lang`.
    pub fn variant(&self, lang: Language) -> Option<MenuFileView> {
        match lang {
            Language::Fr => view(&self.file_url_fr, self.file_type_fr.or(self.file_type), &self.public_id_fr),
            Language::Nl => view(&self.file_url_nl, self.file_type_nl.or(self.file_type), &self.public_id_nl),
        }
    }

    /// The file stored without a language tag.
    pub fn untagged(&self) -> Option<MenuFileView> {
        view(&self.file_url, self.file_type, &self.public_id)
    }

    /// Best file for `lang`: its own variant, then the untagged fields, then
    /// the other language's variant.
    pub fn best_for(&self, lang: Language) -> Option<MenuFileView> {
        self.variant(lang)
            .or_else(|| self.untagged())
            .or_else(|| self.variant(lang.other()))
    }

    pub fn set_variant(&mut self, lang: Language, file: &HostedFile) {
        let (url, kind, id) = match lang {
            Language::Fr => (&mut self.file_url_fr, &mut self.file_type_fr, &mut self.public_id_fr),
            Language::Nl => (&mut self.file_url_nl, &mut self.file_type_nl, &mut self.public_id_nl),
        };
        *url = Some(file.url.clone());
        *kind = Some(file.kind);
        *id = Some(file.public_id.clone());
    }

    pub fn set_untagged(&mut self, file: &HostedFile) {
        self.file_url = Some(file.url.clone());
        self.file_type = Some(file.kind);
        self.public_id = Some(file.public_id.clone());
    }
}

/// A document of the legacy `menu_images` collection. Always an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMenuImage {
    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub date: Option<DateKey>,
}

impl LegacyMenuImage {
    pub fn view(&self) -> Option<MenuFileView> {
        let url = if self.image_url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
            &self.image_url
        } else {
            &self.url
        };
        view(url, Some(MenuFileKind::Image), &self.public_id)
    }
}

/// A file stored on the media host after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedFile {
    pub url: String,
    pub public_id: String,
    pub kind: MenuFileKind,
    pub original_filename: Option<String>,
}

fn default_send_time() -> String {
    "18:00".to_string()
}

/// Automatic report settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub recipients: Vec<String>,
    /// `HH:MM`, local time.
    #[serde(default = "default_send_time")]
    pub time: String,
    /// Weekday numbers, 0 = Sunday.
    #[serde(default)]
    pub days: Vec<u8>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            recipients: Vec::new(),
            time: default_send_time(),
            days: Vec::new(),
        }
    }
}

/// Remote shape of the schedule config, with bookkeeping fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDocument {
    #[serde(flatten)]
    pub config: ScheduleConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl ScheduleDocument {
    pub const VERSION: &'static str = "1.0";

    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            config,
            last_updated: Some(Utc::now()),
            version: Some(Self::VERSION.to_string()),
            timezone: None,
        }
    }
}

/// What triggered a report batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendSource {
    Automatic,
    Manual,
}

/// Summary of one report batch, appended to `email_logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendLog {
    pub timestamp: DateTime<Utc>,
    pub source: SendSource,
    pub success_count: usize,
    pub error_count: usize,
    pub votes_total: usize,
    #[serde(default)]
    pub recipients: Vec<String>,
    pub date: DateKey,
}

/// A stored [`SendLog`] with its document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendLogEntry {
    pub id: String,
    #[serde(flatten)]
    pub log: SendLog,
}
