use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;

use crate::app::errors::{self, ApiResult};
use crate::app::services::{self, AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_alerts))
        .route("/stream", get(stream_alerts))
}

/// GET /alerts
///
/// Derived on every call; nothing is stored.
pub async fn list_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult<Response> {
    let alerts = services
        .alerts_for(principal.role(), Utc::now())
        .map_err(errors::document_error_to_response)?;
    Ok(Json(alerts).into_response())
}

/// GET /alerts/stream
pub async fn stream_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> impl IntoResponse {
    services::alerts_sse_stream(services, principal.role())
}
