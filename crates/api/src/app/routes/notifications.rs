//! Per-user notifications. A caller only ever sees or touches their own.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::Utc;

use vitach_alerts::{Notification, unread_count};
use vitach_auth::Permission;
use vitach_core::{DocumentId, DomainError, Stored};

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::common::{parse_id, require};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_own).post(create))
        .route("/read-all", post(mark_all_read))
        .route("/:id/read", post(mark_read))
        .route("/:id", delete(remove))
}

fn own(services: &AppServices, principal: &PrincipalContext) -> ApiResult<Vec<Stored<Notification>>> {
    services
        .documents()
        .list_where::<Notification>("user_id", &principal.user_id().to_string())
        .map_err(errors::document_error_to_response)
}

pub async fn list_own(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult<Response> {
    let mut notifications = own(&services, &principal)?;
    notifications.reverse();
    let unread = unread_count(notifications.iter().map(|n| &n.record));

    Ok(Json(serde_json::json!({
        "notifications": notifications,
        "unread": unread,
    }))
    .into_response())
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateNotificationRequest>,
) -> ApiResult<Response> {
    require(&principal, Permission::NotificationsWrite)?;
    let recipient = body.user_id.unwrap_or_else(|| principal.user_id());
    let notification = Notification::new(recipient, body.kind, &body.title, &body.message);

    let stored = services
        .documents()
        .create(notification, principal.user_id(), Utc::now())
        .map_err(errors::document_error_to_response)?;
    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

pub async fn mark_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id: DocumentId = parse_id(&id, "notification")?;
    let owner = principal.user_id();

    // Someone else's notification reads as missing.
    let (stored, _) = services
        .documents()
        .modify::<Notification, _>(id, Utc::now(), |n| {
            if n.user_id != owner {
                return Err(DomainError::not_found());
            }
            Ok(n.mark_read(Utc::now()))
        })
        .map_err(errors::document_error_to_response)?;
    Ok(Json(stored).into_response())
}

pub async fn mark_all_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult<Response> {
    let now = Utc::now();
    let mut updated = 0usize;
    for unread in own(&services, &principal)?.into_iter().filter(|n| !n.record.read) {
        let (_, changed) = services
            .documents()
            .modify::<Notification, _>(unread.id, now, |n| Ok(n.mark_read(now)))
            .map_err(errors::document_error_to_response)?;
        updated += usize::from(changed);
    }
    Ok(Json(serde_json::json!({ "updated": updated })).into_response())
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: DocumentId = parse_id(&id, "notification")?;
    let documents = services.documents();
    let stored = documents
        .get::<Notification>(id)
        .map_err(errors::document_error_to_response)?;
    if stored.record.user_id != principal.user_id() {
        return Err(errors::json_error(StatusCode::NOT_FOUND, "not_found", "notification not found"));
    }
    documents
        .delete::<Notification>(id)
        .map_err(errors::document_error_to_response)?;
    Ok(StatusCode::NO_CONTENT)
}
