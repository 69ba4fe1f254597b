//! Generic CRUD over the flat document collections.
//!
//! Reads are gated by the page the collection belongs to, writes by the
//! collection's write permission. Bodies are decoded into the collection's
//! schema type and validated before anything is stored.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde_json::Value as JsonValue;

use vitach_auth::{Permission, Route};
use vitach_core::{DocumentId, Record};
use vitach_hr::{Attendance, Employee, LeaveRequest, LeaveStatus};
use vitach_inventory::{Article, StockItem, StockWithdrawal};
use vitach_it::{Incident, IncidentStatus, ItAsset};
use vitach_maintenance::{MaintenanceRecord, Vehicle};
use vitach_parties::{Service, ServiceProvider, Supplier};
use vitach_purchasing::{Budget, Workflow};

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::common::{decode, parse_id, require, require_view};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// A document collection exposed over HTTP.
pub trait Collection: Record {
    /// Page whose roles may read the collection.
    const VIEW: Route;
    const CREATE: Permission;
    /// Update and delete.
    const MODIFY: Permission;

    /// Adjust a decoded body before it is stored.
    fn prepare_create(&mut self) {}
}

macro_rules! collection {
    ($t:ty, $view:expr, $write:expr) => {
        impl Collection for $t {
            const VIEW: Route = $view;
            const CREATE: Permission = $write;
            const MODIFY: Permission = $write;
        }
    };
}

collection!(StockItem, Route::Stock, Permission::StockWrite);
collection!(Article, Route::Articles, Permission::ArticlesWrite);
collection!(Employee, Route::Employees, Permission::EmployeesWrite);
collection!(Supplier, Route::Suppliers, Permission::SuppliersWrite);
collection!(ServiceProvider, Route::Providers, Permission::ProvidersWrite);
collection!(Service, Route::Services, Permission::ServicesWrite);
collection!(Vehicle, Route::Maintenance, Permission::VehiclesWrite);
collection!(MaintenanceRecord, Route::Maintenance, Permission::MaintenanceWrite);
collection!(Budget, Route::Budgets, Permission::BudgetsWrite);
collection!(Workflow, Route::Workflows, Permission::WorkflowsWrite);
collection!(Attendance, Route::Hr, Permission::AttendanceWrite);
collection!(ItAsset, Route::It, Permission::ItAssetsWrite);

/// Anyone may file a request; only deciders may edit or remove one.
impl Collection for LeaveRequest {
    const VIEW: Route = Route::Hr;
    const CREATE: Permission = Permission::LeaveRequestsCreate;
    const MODIFY: Permission = Permission::LeaveRequestsDecide;

    fn prepare_create(&mut self) {
        self.status = LeaveStatus::Pending;
        self.decided_by = None;
        self.decided_at = None;
    }
}

/// Anyone may report an incident; the desk numbers and works it.
impl Collection for Incident {
    const VIEW: Route = Route::It;
    const CREATE: Permission = Permission::IncidentsCreate;
    const MODIFY: Permission = Permission::IncidentsManage;

    fn prepare_create(&mut self) {
        self.ticket.clear();
        self.status = IncidentStatus::New;
        self.requested_by = None;
        self.assignee_id = None;
        self.solution.clear();
        self.resolved_at = None;
    }
}

/// Full CRUD router for one collection, nested under `/{R::COLLECTION}`.
pub fn router<R: Collection>() -> Router {
    Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route("/:id", get(get_one::<R>).patch(update::<R>).delete(delete::<R>))
}

/// Withdrawals are only written through `POST /stock/:id/withdraw`.
pub fn withdrawals_router() -> Router {
    Router::new()
        .route("/", get(list_withdrawals))
        .route("/:id", get(get_withdrawal))
}

pub async fn create<R: Collection>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<JsonValue>,
) -> ApiResult<Response> {
    require(&principal, R::CREATE)?;
    let mut record: R = decode(body)?;
    record.prepare_create();

    let stored = services
        .documents()
        .create(record, principal.user_id(), Utc::now())
        .map_err(errors::document_error_to_response)?;
    tracing::info!(collection = R::COLLECTION, id = %stored.id, by = %principal.user_id(), "document created");

    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

pub async fn list<R: Collection>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(filter): Query<dto::FieldFilter>,
) -> ApiResult<Response> {
    require_view(&principal, R::VIEW)?;
    list_filtered::<R>(&services, filter)
}

pub async fn get_one<R: Collection>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    require_view(&principal, R::VIEW)?;
    let id: DocumentId = parse_id(&id, R::COLLECTION)?;
    let stored = services
        .documents()
        .get::<R>(id)
        .map_err(errors::document_error_to_response)?;
    Ok(Json(stored).into_response())
}

/// Partial update: top-level fields of the body replace the stored ones.
pub async fn update<R: Collection>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(patch): Json<JsonValue>,
) -> ApiResult<Response> {
    require(&principal, R::MODIFY)?;
    let id: DocumentId = parse_id(&id, R::COLLECTION)?;
    let stored = services
        .documents()
        .update::<R>(id, patch, Utc::now())
        .map_err(errors::document_error_to_response)?;
    Ok(Json(stored).into_response())
}

pub async fn delete<R: Collection>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require(&principal, R::MODIFY)?;
    let id: DocumentId = parse_id(&id, R::COLLECTION)?;
    services
        .documents()
        .delete::<R>(id)
        .map_err(errors::document_error_to_response)?;
    tracing::info!(collection = R::COLLECTION, id = %id, by = %principal.user_id(), "document deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_withdrawals(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(filter): Query<dto::FieldFilter>,
) -> ApiResult<Response> {
    require_view(&principal, Route::Stock)?;
    list_filtered::<StockWithdrawal>(&services, filter)
}

pub async fn get_withdrawal(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    require_view(&principal, Route::Stock)?;
    let id: DocumentId = parse_id(&id, StockWithdrawal::COLLECTION)?;
    let stored = services
        .documents()
        .get::<StockWithdrawal>(id)
        .map_err(errors::document_error_to_response)?;
    Ok(Json(stored).into_response())
}

fn list_filtered<R: Record>(services: &AppServices, filter: dto::FieldFilter) -> ApiResult<Response> {
    let docs = match (filter.field, filter.value) {
        (None, None) => services.documents().list::<R>(),
        (Some(field), Some(value)) => services.documents().list_where::<R>(&field, &value),
        _ => {
            return Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "field and value must be given together",
            ));
        }
    }
    .map_err(errors::document_error_to_response)?;
    Ok(Json(docs).into_response())
}
