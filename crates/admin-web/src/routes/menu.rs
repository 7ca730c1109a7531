//! Menu routes: public lookup, admin upload and delete.

use axum::extract::{Multipart, Query, State};
use axum::Json;
use cafeteria_core::{HostedFile, Language, MenuFileKind, ResolvedMenu};
use media_host::transform;
use media_host::{MenuUpload, UploadError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AdminGuard;
use crate::error::{AdminError, Result};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MenuQuery {
    pub lang: Option<String>,
    /// Check that the hosted file still answers.
    #[serde(default)]
    pub verify: bool,
}

/// Resolved menu with display URLs.
#[derive(Serialize)]
pub struct MenuResponse {
    #[serde(flatten)]
    pub menu: ResolvedMenu,
    pub preview_url: String,
    pub modal_url: String,
    /// First page as an image, for PDFs.
    pub thumbnail_url: Option<String>,
    /// Whether the file answered a `HEAD` request; only set with `verify=true`.
    pub available: Option<bool>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub file: HostedFile,
    pub lang: Option<Language>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

fn parse_lang(raw: Option<&str>) -> Result<Option<Language>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map(Some).map_err(AdminError::BadRequest),
        None => Ok(None),
    }
}

/// Today's menu for a language (default French).
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> Result<Json<MenuResponse>> {
    let lang = parse_lang(query.lang.as_deref())?.unwrap_or(Language::Fr);
    let menu = state.menus.resolve(state.today(), lang).await;

    let thumbnail_url = match menu.kind {
        MenuFileKind::Pdf => state.media.pdf_thumbnail_url(&menu.url),
        MenuFileKind::Image => None,
    };
    let available = if query.verify {
        Some(state.media.exists(&menu.url).await)
    } else {
        None
    };

    Ok(Json(MenuResponse {
        preview_url: transform::preview_url(&menu.url),
        modal_url: transform::modal_url(&menu.url),
        thumbnail_url,
        available,
        menu,
    }))
}

/// Upload today's menu file (`file` field, optional `lang` field).
pub async fn upload(
    _admin: AdminGuard,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut file: Option<MenuUpload> = None;
    let mut lang_field: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AdminError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("menu").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AdminError::BadRequest(e.to_string()))?;
                file = Some(MenuUpload::new(file_name, content_type, bytes.to_vec()));
            }
            Some("lang") => {
                lang_field = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AdminError::BadRequest(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let file = file.ok_or(UploadError::Empty)?;
    let lang = parse_lang(lang_field.as_deref())?;
    let today = state.today();

    let hosted = state.media.upload(today, file).await?;
    state.menus.record_upload(today, lang, &hosted).await?;

    info!(date = %today, lang = ?lang, url = %hosted.url, "Menu recorded");
    Ok(Json(UploadResponse { file: hosted, lang }))
}

/// Delete today's menu record.
pub async fn delete(_admin: AdminGuard, State(state): State<AppState>) -> Result<Json<DeleteResponse>> {
    let deleted = state.menus.delete_today(state.today()).await?;
    Ok(Json(DeleteResponse { deleted }))
}
