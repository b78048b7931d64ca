use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::app::AppServices;
use crate::context::PrincipalContext;
use crate::errors;

#[derive(Debug, Deserialize)]
pub struct RenewRequest {
    /// The expired (or expiring) access token.
    pub access_token: String,
    /// The refresh token issued alongside it.
    pub refresh_token: String,
}

/// POST /admin/session/renew: exchange an expired credential pair for a
/// fresh one. Public; callers arrive here precisely because their access
/// token no longer passes the auth middleware.
pub async fn renew(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RenewRequest>,
) -> axum::response::Response {
    match services
        .sessions
        .renew(&body.access_token, &body.refresh_token, Utc::now())
        .await
    {
        Ok(tokens) => (StatusCode::OK, Json(tokens)).into_response(),
        Err(e) => errors::session_error_to_response(e),
    }
}

/// POST /admin/session/logout: revoke the caller's refresh token.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.sessions.close(principal.user_id()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::session_error_to_response(e),
    }
}
