use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;

use vitach_ai::AiJob;
use vitach_auth::Route;

use crate::app::errors::{self, ApiResult};
use crate::app::routes::common::require_view;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/stock", get(stock_predictions))
}

/// GET /predictions/stock
///
/// Consumption-based restocking recommendations, computed on demand.
pub async fn stock_predictions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult<Response> {
    require_view(&principal, Route::AiPredictions)?;
    let job = services
        .stock_forecast_job(Utc::now())
        .map_err(errors::document_error_to_response)?;

    let result = job.run().map_err(|e| {
        tracing::error!(error = %e, "stock forecast failed");
        errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "ai_error", e.to_string())
    })?;
    Ok(Json(result).into_response())
}
