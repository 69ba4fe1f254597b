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
use vitach_purchasing::Workflow;

use crate::app::errors::{self, ApiResult};
use crate::app::routes::common::{parse_id, require};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/:id/steps/:key/advance", post(advance_step))
}

/// POST /workflows/:id/steps/:key/advance
///
/// Completes one step; the step's own actor list is checked by the workflow.
pub async fn advance_step(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, key)): Path<(String, String)>,
) -> ApiResult<Response> {
    require(&principal, Permission::WorkflowsAdvance)?;
    let id: DocumentId = parse_id(&id, "workflow")?;

    let (stored, ()) = services
        .documents()
        .modify::<Workflow, _>(id, Utc::now(), |w| w.advance(&key, principal.role()))
        .map_err(errors::document_error_to_response)?;

    let progress = stored.record.progress();
    Ok(Json(serde_json::json!({
        "workflow": stored,
        "progress": progress,
    }))
    .into_response())
}
