use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;

use vitach_auth::Permission;
use vitach_core::DocumentId;
use vitach_hr::LeaveRequest;

use crate::app::errors::{self, ApiResult};
use crate::app::routes::common::{parse_id, require};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/:id/approve", post(approve))
        .route("/:id/reject", post(reject))
}

pub async fn approve(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    decide(&services, &principal, &id, true)
}

pub async fn reject(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    decide(&services, &principal, &id, false)
}

fn decide(
    services: &AppServices,
    principal: &PrincipalContext,
    id: &str,
    approve: bool,
) -> ApiResult<Response> {
    require(principal, Permission::LeaveRequestsDecide)?;
    let id: DocumentId = parse_id(id, "leave request")?;

    let (stored, ()) = services
        .documents()
        .modify::<LeaveRequest, _>(id, Utc::now(), |req| {
            req.decide(approve, principal.user_id(), Utc::now())
        })
        .map_err(errors::document_error_to_response)?;

    tracing::info!(leave_request = %id, approve, by = %principal.user_id(), "leave request decided");
    Ok(Json(stored).into_response())
}
