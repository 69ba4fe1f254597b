use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;

use vitach_auth::Route;
use vitach_maintenance::{MaintenanceRecord, Vehicle, resolve};
use vitach_parties::ServiceProvider;

use crate::app::errors::{self, ApiResult};
use crate::app::routes::common::require_view;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/resolved", get(resolved))
}

/// GET /maintenance/resolved
///
/// Maintenance records with vehicle and provider names filled in.
pub async fn resolved(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult<Response> {
    require_view(&principal, Route::Maintenance)?;
    let documents = services.documents();
    let records = documents
        .list::<MaintenanceRecord>()
        .map_err(errors::document_error_to_response)?;
    let vehicles = documents
        .list::<Vehicle>()
        .map_err(errors::document_error_to_response)?;
    let providers = documents
        .list::<ServiceProvider>()
        .map_err(errors::document_error_to_response)?;

    let resolved = resolve(records, &vehicles, &providers, Utc::now().date_naive());
    Ok(Json(resolved).into_response())
}
