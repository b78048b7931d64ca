use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use gatehouse_auth::SessionError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map a session failure onto a response.
///
/// Every credential problem collapses into the same 401; only a store outage
/// differs (503, retryable once the cache is back).
pub fn session_error_to_response(err: SessionError) -> axum::response::Response {
    match err {
        SessionError::Token(_)
        | SessionError::NoActiveSession(_)
        | SessionError::RefreshMismatch => {
            tracing::debug!(error = %err, "session request rejected");
            json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_session",
                "session is invalid or expired",
            )
        }
        SessionError::Store(e) => {
            tracing::error!(error = %e, "session store unavailable");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "session store unavailable",
            )
        }
    }
}
