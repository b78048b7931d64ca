use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::AppServices;
use crate::context::PrincipalContext;
use crate::errors;

/// GET /admin/menus: the navigation forest visible to the caller.
pub async fn menus(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.menu.build(&services.menu_providers, principal.principal()) {
        Ok(forest) => (StatusCode::OK, Json(forest)).into_response(),
        Err(e) => {
            // Declaration defects are provider bugs, normally caught by
            // startup verification.
            tracing::error!(error = %e, "menu declaration defect");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "menu_defect",
                e.to_string(),
            )
        }
    }
}
