use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Local, Utc};

use vitach_auth::Route;
use vitach_hr::{Attendance, summarize};
use vitach_inventory::{StockItem, StockLevel};
use vitach_it::{Incident, incident_stats};
use vitach_purchasing::OrderStatus;

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::common::require_view;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/summary", get(summary))
}

/// GET /reports/summary
pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult<Response> {
    require_view(&principal, Route::Reports)?;
    let now = Utc::now();
    let documents = services.documents();

    let mut orders = dto::OrderCounts::default();
    for order in services.orders_list() {
        orders.total += 1;
        match order.status {
            OrderStatus::PendingPrice => orders.pending_price += 1,
            OrderStatus::PendingApproval => orders.pending_approval += 1,
            OrderStatus::Approved => orders.approved += 1,
            OrderStatus::Rejected => orders.rejected += 1,
        }
    }

    let mut spend_by_service: BTreeMap<String, u64> = BTreeMap::new();
    for entry in services.spend_entries() {
        let total = spend_by_service.entry(entry.service).or_default();
        *total = total.saturating_add(entry.amount);
    }

    let mut stock = dto::StockCounts::default();
    for item in documents.list::<StockItem>().map_err(errors::document_error_to_response)? {
        stock.items += 1;
        match item.record.level() {
            StockLevel::OutOfStock => stock.out_of_stock += 1,
            StockLevel::Low => stock.low += 1,
            StockLevel::Normal => {}
        }
    }

    let incidents = documents.list::<Incident>().map_err(errors::document_error_to_response)?;
    let attendance = documents.list::<Attendance>().map_err(errors::document_error_to_response)?;

    Ok(Json(dto::ReportSummary {
        generated_at: now,
        orders,
        spend_by_service,
        stock,
        incidents: incident_stats(&incidents, now),
        attendance: summarize(attendance.iter().map(|s| &s.record), Local::now().date_naive()),
    })
    .into_response())
}
