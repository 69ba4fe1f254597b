//! Attendance: HR entries, quick attendance for the whole staff and the
//! employees' own clock-in/clock-out.
//!
//! Days and times are the server's local wall clock.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate, Utc};
use serde_json::{Value as JsonValue, json};

use vitach_auth::{Permission, Route};
use vitach_core::{DocumentId, DomainError};
use vitach_hr::{Attendance, ClockEvent, Employee, day_record, summarize};

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::collections::{self, Collection};
use crate::app::routes::common::{decode, require, require_view};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(collections::list::<Attendance>).post(create))
        .route(
            "/:id",
            get(collections::get_one::<Attendance>)
                .patch(collections::update::<Attendance>)
                .delete(collections::delete::<Attendance>),
        )
        .route("/clock", post(clock))
        .route("/quick", post(quick))
        .route("/summary", get(summary))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn active_employee(services: &AppServices, id: DocumentId) -> ApiResult<Employee> {
    let employee = services
        .documents()
        .get::<Employee>(id)
        .map_err(errors::document_error_to_response)?
        .record;
    if !employee.active {
        return Err(errors::domain_error_to_response(DomainError::invariant(format!(
            "{} is no longer active",
            employee.full_name()
        ))));
    }
    Ok(employee)
}

fn already_recorded(date: NaiveDate) -> DomainError {
    DomainError::conflict(format!("attendance already recorded for {date}"))
}

/// HR entry for one employee and day.
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<JsonValue>,
) -> ApiResult<Response> {
    require(&principal, Attendance::CREATE)?;
    let record: Attendance = decode(body)?;
    active_employee(&services, record.employee_id)?;

    let mut created = services
        .documents()
        .create_from::<Attendance>(principal.user_id(), Utc::now(), |existing| {
            if day_record(existing, record.employee_id, record.date).is_some() {
                return Err(already_recorded(record.date));
            }
            Ok(vec![record])
        })
        .map_err(errors::document_error_to_response)?;

    let stored = created.pop().ok_or_else(|| {
        errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "attendance was not stored")
    })?;
    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

/// POST /attendance/clock
///
/// 201 with the opened day on arrival, 200 with the completed day on
/// departure, 409 once the day is complete.
pub async fn clock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::ClockRequest>,
) -> ApiResult<Response> {
    require(&principal, Permission::AttendanceClock)?;
    let employee = active_employee(&services, body.employee_id)?;
    let now = Local::now().naive_local();
    let (date, time) = (now.date(), now.time());

    let mut open_day = None;
    let created = services
        .documents()
        .create_from::<Attendance>(principal.user_id(), Utc::now(), |existing| {
            if let Some(day) = day_record(existing, body.employee_id, date) {
                open_day = Some(day.id);
                return Ok(vec![]);
            }
            Attendance::check_in(body.employee_id, date, time, body.signature, body.device).map(|a| vec![a])
        })
        .map_err(errors::document_error_to_response)?;

    if let Some(stored) = created.into_iter().next() {
        tracing::info!(employee = %body.employee_id, name = %employee.full_name(), %time, "arrival recorded");
        return Ok((
            StatusCode::CREATED,
            Json(json!({ "event": ClockEvent::Arrival, "attendance": stored })),
        )
            .into_response());
    }

    let id = open_day.ok_or_else(|| {
        errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "attendance day not found")
    })?;
    let (stored, ()) = services
        .documents()
        .modify::<Attendance, _>(id, Utc::now(), |day| day.check_out(time))
        .map_err(errors::document_error_to_response)?;
    tracing::info!(employee = %body.employee_id, name = %employee.full_name(), %time, "departure recorded");
    Ok(Json(json!({ "event": ClockEvent::Departure, "attendance": stored })).into_response())
}

/// POST /attendance/quick
///
/// Marks every active employee present 08:00-17:00 on the given day, unless
/// anything was already recorded for that day.
pub async fn quick(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::DayQuery>,
) -> ApiResult<Response> {
    require(&principal, Permission::AttendanceWrite)?;
    let date = query.date.unwrap_or_else(today);
    let staff: Vec<DocumentId> = services
        .documents()
        .list::<Employee>()
        .map_err(errors::document_error_to_response)?
        .into_iter()
        .filter(|e| e.record.active)
        .map(|e| e.id)
        .collect();

    let created = services
        .documents()
        .create_from::<Attendance>(principal.user_id(), Utc::now(), |existing| {
            if existing.iter().any(|s| s.record.date == date) {
                return Err(already_recorded(date));
            }
            Ok(staff.iter().map(|&id| Attendance::full_day(id, date)).collect())
        })
        .map_err(errors::document_error_to_response)?;

    tracing::info!(%date, count = created.len(), by = %principal.user_id(), "quick attendance recorded");
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::DayQuery>,
) -> ApiResult<Response> {
    require_view(&principal, Route::Hr)?;
    let records = services
        .documents()
        .list::<Attendance>()
        .map_err(errors::document_error_to_response)?;
    let date = query.date.unwrap_or_else(today);
    Ok(Json(summarize(records.iter().map(|s| &s.record), date)).into_response())
}
