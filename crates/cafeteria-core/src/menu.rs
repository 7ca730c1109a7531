//! Today's menu file lookup.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{HostedFile, Language, LegacyMenuImage, MenuFileDocument, MenuFileKind, MenuFileView};
use crate::repository::collections;
use crate::trait_def::RemoteStore;
use crate::DateKey;

/// Image shown when no menu was ever uploaded.
pub const DEFAULT_MENU_URL: &str =
    "https://via.placeholder.com/400x300/f0f0f0/666666?text=Menu+du+Jour";

/// Provider tag written on new menu records.
const PROVIDER: &str = "cloudinary";

/// Where a resolved menu came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuSource {
    /// Today's record in `menu_files`.
    Today,
    /// Today's record in `menu_images`.
    TodayLegacy,
    /// Most recently dated record in `menu_files`.
    Latest,
    /// Most recently dated record in `menu_images`.
    LatestLegacy,
    /// Nothing stored; the configured default image.
    Default,
}

/// A usable menu file. `url` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMenu {
    pub url: String,
    pub kind: MenuFileKind,
    pub public_id: Option<String>,
    pub source: MenuSource,
}

impl ResolvedMenu {
    fn from_view(view: MenuFileView, source: MenuSource) -> Self {
        Self {
            url: view.url,
            kind: view.kind,
            public_id: view.public_id,
            source,
        }
    }
}

/// Resolves the menu file to show and records uploads.
#[derive(Clone)]
pub struct MenuResolver {
    remote: Arc<dyn RemoteStore>,
    default_url: String,
}

impl MenuResolver {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            default_url: DEFAULT_MENU_URL.to_string(),
        }
    }

    /// Replace the fallback image URL. Blank values are ignored.
    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !url.trim().is_empty() {
            self.default_url = url;
        }
        self
    }

    pub fn default_url(&self) -> &str {
        &self.default_url
    }

    /// The menu to show today in `lang`.
    ///
    /// Order: today's record (language variant, untagged fields, other
    /// language), today's legacy record, the latest record, the latest legacy
    /// record, the default image. Store errors are logged and skipped.
    pub async fn resolve(&self, today: DateKey, lang: Language) -> ResolvedMenu {
        let id = today.to_string();

        if let Some(view) = self
            .fetch::<MenuFileDocument>(collections::MENU_FILES, &id)
            .await
            .and_then(|doc| doc.best_for(lang))
        {
            return ResolvedMenu::from_view(view, MenuSource::Today);
        }

        if let Some(view) = self
            .fetch::<LegacyMenuImage>(collections::MENU_IMAGES, &id)
            .await
            .and_then(|doc| doc.view())
        {
            return ResolvedMenu::from_view(view, MenuSource::TodayLegacy);
        }

        if let Some(view) = self
            .fetch_latest::<MenuFileDocument>(collections::MENU_FILES)
            .await
            .and_then(|doc| doc.best_for(lang))
        {
            return ResolvedMenu::from_view(view, MenuSource::Latest);
        }

        if let Some(view) = self
            .fetch_latest::<LegacyMenuImage>(collections::MENU_IMAGES)
            .await
            .and_then(|doc| doc.view())
        {
            return ResolvedMenu::from_view(view, MenuSource::LatestLegacy);
        }

        debug!(date = %today, "No menu stored, using default");
        ResolvedMenu {
            url: self.default_url.clone(),
            kind: MenuFileKind::Image,
            public_id: None,
            source: MenuSource::Default,
        }
    }

    /// Record an uploaded file as today's menu.
    ///
    /// With a language only that language's fields are replaced and the rest
    /// of the record is kept. Without one the untagged fields are written and
    /// any previous record is replaced.
    pub async fn record_upload(
        &self,
        today: DateKey,
        lang: Option<Language>,
        file: &HostedFile,
    ) -> Result<()> {
        let id = today.to_string();
        let mut doc = match lang {
            Some(_) => match self.remote.get(collections::MENU_FILES, &id).await? {
                Some(value) => serde_json::from_value(value)?,
                None => MenuFileDocument::default(),
            },
            None => MenuFileDocument::default(),
        };

        match lang {
            Some(lang) => doc.set_variant(lang, file),
            None => doc.set_untagged(file),
        }
        doc.upload_date = Some(Utc::now().to_rfc3339());
        doc.date = Some(today);
        doc.provider = Some(PROVIDER.to_string());

        self.remote
            .set(collections::MENU_FILES, &id, &serde_json::to_value(&doc)?)
            .await?;
        info!(
            date = %today,
            lang = lang.map(|l| l.as_str()).unwrap_or("any"),
            kind = file.kind.as_str(),
            "Menu file recorded"
        );
        Ok(())
    }

    /// Delete today's menu record. Returns whether anything was deleted.
    pub async fn delete_today(&self, today: DateKey) -> Result<bool> {
        let id = today.to_string();
        for collection in [collections::MENU_FILES, collections::MENU_IMAGES] {
            if self.remote.get(collection, &id).await?.is_some() {
                self.remote.delete(collection, &id).await?;
                info!(date = %today, collection, "Menu record deleted");
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, collection: &str, id: &str) -> Option<T> {
        match self.remote.get(collection, id).await {
            Ok(Some(value)) => serde_json::from_value(value)
                .inspect_err(|e| warn!(collection, id, error = %e, "Malformed menu record"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(collection, id, error = %e, "Menu lookup failed");
                None
            }
        }
    }

    async fn fetch_latest<T: serde::de::DeserializeOwned>(&self, collection: &str) -> Option<T> {
        match self.remote.latest(collection, "date", 1).await {
            Ok(docs) => docs.into_iter().next().and_then(|doc| {
                serde_json::from_value(doc.data)
                    .inspect_err(|e| warn!(collection, id = %doc.id, error = %e, "Malformed menu record"))
                    .ok()
            }),
            Err(e) => {
                warn!(collection, error = %e, "Latest menu lookup failed");
                None
            }
        }
    }
}
