use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Datelike, Utc};
use serde_json::Value as JsonValue;

use vitach_auth::Route;
use vitach_core::DocumentId;
use vitach_hr::Employee;
use vitach_it::{Incident, IncidentAction, incident_stats, next_ticket};

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::collections::{self, Collection};
use crate::app::routes::common::{decode, parse_id, require, require_view};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Incident desk, nested under `/it_incidents`.
pub fn router() -> Router {
    Router::new()
        .route("/", get(collections::list::<Incident>).post(open_incident))
        .route(
            "/:id",
            get(collections::get_one::<Incident>)
                .patch(collections::update::<Incident>)
                .delete(collections::delete::<Incident>),
        )
        .route("/:id/transition", post(transition))
        .route("/sla", get(sla))
        .route("/stats", get(stats))
}

/// Opens a ticket numbered after the last one issued this year.
pub async fn open_incident(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<JsonValue>,
) -> ApiResult<Response> {
    require(&principal, Incident::CREATE)?;
    let mut incident: Incident = decode(body)?;
    incident.prepare_create();
    incident.requested_by = Some(principal.user_id());

    let now = Utc::now();
    let mut created = services
        .documents()
        .create_from::<Incident>(principal.user_id(), now, |existing| {
            incident.ticket = next_ticket(existing.iter().map(|s| s.record.ticket.as_str()), now.year());
            Ok(vec![incident])
        })
        .map_err(errors::document_error_to_response)?;

    let stored = created.pop().ok_or_else(|| {
        errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "incident was not stored")
    })?;
    tracing::info!(
        ticket = %stored.record.ticket,
        priority = ?stored.record.priority,
        by = %principal.user_id(),
        "incident opened"
    );
    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

/// POST /it_incidents/:id/transition
pub async fn transition(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(action): Json<IncidentAction>,
) -> ApiResult<Response> {
    require(&principal, Incident::MODIFY)?;
    let id: DocumentId = parse_id(&id, "incident")?;
    if let IncidentAction::Assign { assignee_id } = &action {
        services
            .documents()
            .get::<Employee>(*assignee_id)
            .map_err(errors::document_error_to_response)?;
    }

    let (stored, ()) = services
        .documents()
        .modify::<Incident, _>(id, Utc::now(), |incident| incident.apply(action, Utc::now()))
        .map_err(errors::document_error_to_response)?;
    tracing::info!(
        ticket = %stored.record.ticket,
        status = ?stored.record.status,
        by = %principal.user_id(),
        "incident updated"
    );
    Ok(Json(stored).into_response())
}

/// Open tickets against their response-time target.
pub async fn sla(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult<Response> {
    require_view(&principal, Route::It)?;
    let now = Utc::now();
    let rows: Vec<dto::IncidentSla> = services
        .documents()
        .list::<Incident>()
        .map_err(errors::document_error_to_response)?
        .into_iter()
        .filter(|s| s.record.status.is_open())
        .map(|s| dto::IncidentSla {
            id: s.id,
            sla: s.record.sla_status(s.audit.created_at, now),
            sla_hours: s.record.priority.sla_hours(),
            ticket: s.record.ticket,
            priority: s.record.priority,
            status: s.record.status,
        })
        .collect();
    Ok(Json(rows).into_response())
}

pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult<Response> {
    require_view(&principal, Route::It)?;
    let incidents = services
        .documents()
        .list::<Incident>()
        .map_err(errors::document_error_to_response)?;
    Ok(Json(incident_stats(&incidents, Utc::now())).into_response())
}
