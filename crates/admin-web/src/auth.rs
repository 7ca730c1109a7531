//! Admin password check.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AdminError;
use crate::state::AppState;

/// Header carrying the admin password.
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Extractor that only succeeds for requests carrying the admin password.
pub struct AdminGuard;

#[async_trait]
impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(ADMIN_PASSWORD_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AdminError::Unauthorized)?;

        if state.settings.verify_password(provided) {
            Ok(AdminGuard)
        } else {
            Err(AdminError::Unauthorized)
        }
    }
}
