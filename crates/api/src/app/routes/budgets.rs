use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;

use vitach_auth::Route;
use vitach_purchasing::{Budget, check_budget};

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::common::require_view;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/check", post(check))
}

/// POST /budgets/check
///
/// How `amount` would sit against the service's current budget, counting
/// approved orders as spend. Open to whoever may raise orders, since the check
/// runs while filling in a new order.
pub async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::BudgetCheckRequest>,
) -> ApiResult<Response> {
    require_view(&principal, Route::NewOrder)?;
    let budgets: Vec<Budget> = services
        .documents()
        .list::<Budget>()
        .map_err(errors::document_error_to_response)?
        .into_iter()
        .map(|s| s.record)
        .collect();

    let result = check_budget(
        &budgets,
        &services.spend_entries(),
        body.service.trim(),
        body.amount,
        Utc::now(),
    );
    Ok(Json(result).into_response())
}
