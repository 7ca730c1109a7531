//! Two-tier persistence: the remote document store first, local storage as
//! the fallback and mirror.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::models::{DayVotes, ScheduleConfig, ScheduleDocument, SendLog, SendLogEntry, VoteDocument};
use crate::trait_def::{LocalStore, RemoteStore};
use crate::DateKey;

/// Remote collection names and fixed document ids.
pub mod collections {
    pub const VOTES: &str = "votes";
    pub const MENU_FILES: &str = "menu_files";
    pub const MENU_IMAGES: &str = "menu_images";
    pub const EMAIL_CONFIG: &str = "email_config";
    pub const EMAIL_LOGS: &str = "email_logs";

    /// Id of the single schedule document in [`EMAIL_CONFIG`].
    pub const SCHEDULE_DOC_ID: &str = "settings";
}

/// Local storage keys.
pub mod keys {
    use crate::DateKey;

    pub const VOTES_PREFIX: &str = "votes_";
    pub const SCHEDULE: &str = "autoEmailConfig";
    pub const LAST_SENT: &str = "lastEmailSent";

    pub fn votes(date: DateKey) -> String {
        format!("{VOTES_PREFIX}{date}")
    }
}

/// Which storage tier accepted a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Remote,
    Local,
}

/// Typed access to votes, the schedule config and send logs.
///
/// Reads try the remote store and fall back to local storage when it fails.
/// Writes are mirrored locally before the remote write, so a failed remote
/// write never loses data.
#[derive(Clone)]
pub struct Repository {
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
}

fn decode<T: DeserializeOwned>(collection: &str, id: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| StoreError::Malformed {
        collection: collection.to_string(),
        id: id.to_string(),
        source,
    })
}

fn encode<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

impl Repository {
    pub fn new(remote: Arc<dyn RemoteStore>, local: Arc<dyn LocalStore>) -> Self {
        Self { remote, local }
    }

    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    pub fn local(&self) -> &Arc<dyn LocalStore> {
        &self.local
    }

    // ---- votes ----

    /// Votes of one day; empty when nothing was recorded or both tiers fail.
    ///
    /// A day that only exists locally (saved during an outage) is returned
    /// and pushed to the remote store.
    pub async fn load_votes(&self, date: DateKey) -> DayVotes {
        let id = date.to_string();
        let remote = match self.remote.get(collections::VOTES, &id).await {
            Ok(Some(value)) => decode::<VoteDocument>(collections::VOTES, &id, value).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        match remote {
            Ok(Some(doc)) => {
                self.mirror_votes(date, &doc.votes).await;
                doc.votes
            }
            Ok(None) => match self.local_votes(date).await {
                Some(votes) => {
                    self.push_local_votes(date, &votes).await;
                    votes
                }
                None => DayVotes::default(),
            },
            Err(e) => {
                warn!(store = self.remote.name(), date = %date, error = %e, "Remote vote load failed, using local copy");
                self.local_votes(date).await.unwrap_or_default()
            }
        }
    }

    /// Save one day's votes. Errors only when neither tier accepted the write.
    pub async fn save_votes(&self, date: DateKey, votes: &DayVotes) -> Result<Tier> {
        let mirrored = self.mirror_votes(date, votes).await;
        let doc = encode(&VoteDocument::new(date, votes.clone()))?;

        match self.remote.set(collections::VOTES, &date.to_string(), &doc).await {
            Ok(()) => {
                debug!(date = %date, total = votes.total(), "Votes saved");
                Ok(Tier::Remote)
            }
            Err(e) if mirrored => {
                warn!(store = self.remote.name(), date = %date, error = %e, "Remote vote save failed, kept local copy");
                Ok(Tier::Local)
            }
            Err(e) => Err(e),
        }
    }

    /// Every recorded day, keyed by date.
    ///
    /// Days found only in local storage are merged in and pushed to the
    /// remote store.
    pub async fn load_all_votes(&self) -> BTreeMap<DateKey, DayVotes> {
        let mut all = match self.remote.list(collections::VOTES).await {
            Ok(docs) => {
                let mut all = BTreeMap::new();
                for doc in docs {
                    let Ok(date) = doc.id.parse::<DateKey>() else {
                        debug!(id = %doc.id, "Skipping non-date vote document");
                        continue;
                    };
                    match decode::<VoteDocument>(collections::VOTES, &doc.id, doc.data) {
                        Ok(parsed) => {
                            all.insert(date, parsed.votes);
                        }
                        Err(e) => warn!(error = %e, "Skipping malformed vote document"),
                    }
                }
                all
            }
            Err(e) => {
                warn!(store = self.remote.name(), error = %e, "Remote vote listing failed, scanning local copies");
                return self.all_local_votes().await;
            }
        };

        for (date, votes) in self.all_local_votes().await {
            if !all.contains_key(&date) {
                self.push_local_votes(date, &votes).await;
                all.insert(date, votes);
            }
        }
        all
    }

    /// Delete one day's votes from both tiers.
    pub async fn reset_day(&self, date: DateKey) -> Result<()> {
        if let Err(e) = self.local.remove(&keys::votes(date)).await {
            warn!(date = %date, error = %e, "Failed to remove local vote copy");
        }
        self.remote.delete(collections::VOTES, &date.to_string()).await?;
        info!(date = %date, "Votes reset");
        Ok(())
    }

    /// Delete every day strictly older than `cutoff` from both tiers.
    ///
    /// Returns the number of days removed from at least one tier.
    pub async fn purge_before(&self, cutoff: DateKey) -> usize {
        let mut dates = BTreeSet::new();

        match self.remote.list(collections::VOTES).await {
            Ok(docs) => dates.extend(docs.iter().filter_map(|d| d.id.parse::<DateKey>().ok())),
            Err(e) => warn!(error = %e, "Remote vote listing failed during purge"),
        }
        match self.local.keys_with_prefix(keys::VOTES_PREFIX).await {
            Ok(found) => dates.extend(found.iter().filter_map(|k| local_vote_date(k))),
            Err(e) => warn!(error = %e, "Local vote listing failed during purge"),
        }

        let mut purged = 0;
        for date in dates.into_iter().filter(|d| *d < cutoff) {
            let remote = self.remote.delete(collections::VOTES, &date.to_string()).await;
            let local = self.local.remove(&keys::votes(date)).await;
            if let Err(e) = &remote {
                warn!(date = %date, error = %e, "Remote purge failed");
            }
            if remote.is_ok() || local.is_ok() {
                purged += 1;
            }
        }

        info!(cutoff = %cutoff, purged, "Vote retention sweep complete");
        purged
    }

    async fn mirror_votes(&self, date: DateKey, votes: &DayVotes) -> bool {
        let stored = match serde_json::to_string(votes) {
            Ok(json) => self.local.set(&keys::votes(date), &json).await,
            Err(e) => Err(e.into()),
        };
        match stored {
            Ok(()) => true,
            Err(e) => {
                warn!(date = %date, error = %e, "Failed to mirror votes locally");
                false
            }
        }
    }

    async fn push_local_votes(&self, date: DateKey, votes: &DayVotes) {
        info!(date = %date, total = votes.total(), "Migrating local vote copy to remote store");
        let pushed = match encode(&VoteDocument::new(date, votes.clone())) {
            Ok(doc) => self.remote.set(collections::VOTES, &date.to_string(), &doc).await,
            Err(e) => Err(e),
        };
        if let Err(e) = pushed {
            warn!(date = %date, error = %e, "Vote migration failed");
        }
    }

    async fn local_votes(&self, date: DateKey) -> Option<DayVotes> {
        let raw = match self.local.get(&keys::votes(date)).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(date = %date, error = %e, "Local vote load failed");
                return None;
            }
        };
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(date = %date, error = %e, "Malformed local vote copy"))
            .ok()
    }

    async fn all_local_votes(&self) -> BTreeMap<DateKey, DayVotes> {
        let found = match self.local.keys_with_prefix(keys::VOTES_PREFIX).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Local vote listing failed");
                return BTreeMap::new();
            }
        };

        let mut all = BTreeMap::new();
        for date in found.iter().filter_map(|k| local_vote_date(k)) {
            if let Some(votes) = self.local_votes(date).await {
                all.insert(date, votes);
            }
        }
        all
    }

    // ---- schedule ----

    /// The stored schedule config.
    ///
    /// The remote copy wins and is mirrored locally. When only a local copy
    /// exists it is pushed to the remote store. Falls back to the local copy
    /// when the remote store fails, then to the default.
    pub async fn load_schedule(&self) -> ScheduleConfig {
        let remote = match self
            .remote
            .get(collections::EMAIL_CONFIG, collections::SCHEDULE_DOC_ID)
            .await
        {
            Ok(Some(value)) => {
                decode::<ScheduleDocument>(collections::EMAIL_CONFIG, collections::SCHEDULE_DOC_ID, value)
                    .map(|doc| Some(doc.config))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        match remote {
            Ok(Some(config)) => {
                self.mirror_schedule(&config).await;
                config
            }
            Ok(None) => match self.local_schedule().await {
                Some(config) => {
                    info!("Migrating local schedule config to remote store");
                    if let Err(e) = self.save_remote_schedule(&config).await {
                        warn!(error = %e, "Schedule migration failed");
                    }
                    config
                }
                None => ScheduleConfig::default(),
            },
            Err(e) => {
                warn!(store = self.remote.name(), error = %e, "Remote schedule load failed, using local copy");
                self.local_schedule().await.unwrap_or_default()
            }
        }
    }

    /// Persist the schedule config to both tiers.
    pub async fn save_schedule(&self, config: &ScheduleConfig) -> Result<Tier> {
        let mirrored = self.mirror_schedule(config).await;
        match self.save_remote_schedule(config).await {
            Ok(()) => Ok(Tier::Remote),
            Err(e) if mirrored => {
                warn!(error = %e, "Remote schedule save failed, kept local copy");
                Ok(Tier::Local)
            }
            Err(e) => Err(e),
        }
    }

    async fn save_remote_schedule(&self, config: &ScheduleConfig) -> Result<()> {
        let doc = encode(&ScheduleDocument::new(config.clone()))?;
        self.remote
            .set(collections::EMAIL_CONFIG, collections::SCHEDULE_DOC_ID, &doc)
            .await
    }

    async fn mirror_schedule(&self, config: &ScheduleConfig) -> bool {
        let stored = match serde_json::to_string(config) {
            Ok(json) => self.local.set(keys::SCHEDULE, &json).await,
            Err(e) => Err(e.into()),
        };
        stored
            .inspect_err(|e| warn!(error = %e, "Failed to mirror schedule locally"))
            .is_ok()
    }

    async fn local_schedule(&self) -> Option<ScheduleConfig> {
        let raw = self
            .local
            .get(keys::SCHEDULE)
            .await
            .inspect_err(|e| warn!(error = %e, "Local schedule load failed"))
            .ok()??;
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(error = %e, "Malformed local schedule copy"))
            .ok()
    }

    /// Date of the last automatic report, if any.
    pub async fn last_sent(&self) -> Option<DateKey> {
        match self.local.get(keys::LAST_SENT).await {
            Ok(raw) => raw.and_then(|s| s.parse().ok()),
            Err(e) => {
                warn!(error = %e, "Failed to read last-sent guard");
                None
            }
        }
    }

    pub async fn stamp_last_sent(&self, date: DateKey) -> Result<()> {
        self.local.set(keys::LAST_SENT, &date.to_string()).await
    }

    // ---- send logs ----

    pub async fn append_send_log(&self, log: &SendLog) -> Result<String> {
        self.remote.add(collections::EMAIL_LOGS, &encode(log)?).await
    }

    /// The `limit` most recent send logs, newest first.
    pub async fn recent_send_logs(&self, limit: usize) -> Result<Vec<SendLogEntry>> {
        let docs = self
            .remote
            .latest(collections::EMAIL_LOGS, "timestamp", limit)
            .await?;

        Ok(docs
            .into_iter()
            .filter_map(|doc| {
                decode::<SendLog>(collections::EMAIL_LOGS, &doc.id, doc.data)
                    .inspect_err(|e| warn!(error = %e, "Skipping malformed send log"))
                    .ok()
                    .map(|log| SendLogEntry { id: doc.id, log })
            })
            .collect())
    }
}

fn local_vote_date(key: &str) -> Option<DateKey> {
    key.strip_prefix(keys::VOTES_PREFIX)?.parse().ok()
}
