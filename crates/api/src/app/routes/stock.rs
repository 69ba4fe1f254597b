use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;

use vitach_auth::Permission;
use vitach_core::{DocumentId, Record};
use vitach_hr::Employee;
use vitach_inventory::{StockItem, StockWithdrawal};

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::common::{parse_id, require};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/:id/withdraw", post(withdraw))
}

/// POST /stock/:id/withdraw
///
/// Takes the quantity out of stock for an employee and records the signed
/// withdrawal. The withdrawal record is validated before stock is touched.
pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::WithdrawStockRequest>,
) -> ApiResult<Response> {
    require(&principal, Permission::StockWithdraw)?;
    let stock_id: DocumentId = parse_id(&id, "stock")?;
    let employee_id: DocumentId = parse_id(&body.employee_id, "employee")?;
    let documents = services.documents();

    documents
        .get::<Employee>(employee_id)
        .map_err(errors::document_error_to_response)?;
    let item = documents
        .get::<StockItem>(stock_id)
        .map_err(errors::document_error_to_response)?;

    let now = Utc::now();
    let withdrawal = StockWithdrawal {
        stock_id,
        item_name: item.record.name,
        employee_id,
        quantity: body.quantity,
        withdrawn_at: now,
        signature: body.signature,
        reason: body.reason,
    };
    withdrawal.validate().map_err(errors::domain_error_to_response)?;

    let (stock, remaining) = documents
        .modify::<StockItem, _>(stock_id, now, |s| s.withdraw(body.quantity))
        .map_err(errors::document_error_to_response)?;
    let recorded = documents
        .create(withdrawal, principal.user_id(), now)
        .map_err(errors::document_error_to_response)?;

    tracing::info!(stock_id = %stock_id, quantity = body.quantity, remaining, "stock withdrawn");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "stock": stock,
            "withdrawal": recorded,
        })),
    )
        .into_response())
}
