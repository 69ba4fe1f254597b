//! Order approval lifecycle over HTTP.
//!
//! Every transition is authorized here against the role policy and again
//! inside the aggregate, then appended as one event.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;

use vitach_auth::Permission;
use vitach_core::AggregateId;
use vitach_parties::Supplier;
use vitach_purchasing::{
    Actor, ApproveOrder, CreateOrder, OrderCommand, OrderId, PriceOrder, RejectOrder, actions_for,
};

use crate::app::errors::{self, ApiResult};
use crate::app::routes::common::{CmdAuth, parse_id};
use crate::app::services::{self, AppServices};
use crate::app::dto;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/stream", get(stream_orders))
        .route("/:id", get(get_order))
        .route("/:id/actions", get(order_actions))
        .route("/:id/price", post(price_order))
        .route("/:id/approve", post(approve_order))
        .route("/:id/reject", post(reject_order))
}

fn actor(principal: &PrincipalContext) -> Actor {
    Actor {
        user_id: principal.user_id(),
        role: principal.role(),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> ApiResult<Response> {
    let order_id = OrderId::new(AggregateId::new());

    let cmd = CmdAuth::new(
        OrderCommand::CreateOrder(CreateOrder {
            order_id,
            actor: actor(&principal),
            service: body.service,
            article: body.article,
            description: body.description,
            quantity: body.quantity,
            unit: body.unit,
            urgency: body.urgency,
            comment: body.comment,
            group_id: body.group_id,
            occurred_at: Utc::now(),
        }),
        Permission::OrdersCreate,
    )
    .authorize(&principal)?;

    services
        .dispatch_order(order_id, cmd)
        .map_err(errors::dispatch_error_to_response)?;
    tracing::info!(order_id = %order_id, by = %principal.user_id(), "order created");

    Ok((StatusCode::CREATED, order_json(&services, order_id)).into_response())
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::OrdersQuery>,
) -> ApiResult<Response> {
    let status = query.status.as_deref().map(dto::parse_order_status).transpose()?;
    let orders: Vec<_> = services
        .orders_list()
        .into_iter()
        .filter(|o| status.is_none_or(|s| o.status == s))
        .collect();
    Ok(Json(orders).into_response())
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let order_id = OrderId::new(parse_id(&id, "order")?);
    services
        .orders_get(&order_id)
        .map(|view| Json(view).into_response())
        .ok_or_else(|| errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"))
}

/// GET /orders/:id/actions
///
/// Transitions the caller's role is offered on this order.
pub async fn order_actions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let order_id = OrderId::new(parse_id(&id, "order")?);
    let view = services
        .orders_get(&order_id)
        .ok_or_else(|| errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"))?;

    Ok(Json(serde_json::json!({
        "order_id": order_id.to_string(),
        "status": view.status,
        "actions": actions_for(view.status, principal.role()),
    }))
    .into_response())
}

pub async fn price_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::PriceOrderRequest>,
) -> ApiResult<Response> {
    let order_id = OrderId::new(parse_id(&id, "order")?);

    let cmd = CmdAuth::new(
        OrderCommand::PriceOrder(PriceOrder {
            order_id,
            actor: actor(&principal),
            price: body.price,
            supplier: body.supplier.trim().to_string(),
            comment: body.comment,
            occurred_at: Utc::now(),
        }),
        Permission::OrdersPrice,
    )
    .authorize(&principal)?;

    // An empty supplier is left to the aggregate's own validation.
    if let OrderCommand::PriceOrder(p) = &cmd {
        if !p.supplier.is_empty() && !supplier_exists(&services, &p.supplier)? {
            return Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("unknown supplier '{}'", p.supplier),
            ));
        }
    }

    services
        .dispatch_order(order_id, cmd)
        .map_err(errors::dispatch_error_to_response)?;
    tracing::info!(order_id = %order_id, by = %principal.user_id(), "order priced");

    Ok(order_json(&services, order_id).into_response())
}

pub async fn approve_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::DecisionRequest>,
) -> ApiResult<Response> {
    let order_id = OrderId::new(parse_id(&id, "order")?);

    let cmd = CmdAuth::new(
        OrderCommand::ApproveOrder(ApproveOrder {
            order_id,
            actor: actor(&principal),
            signature: body.signature,
            comment: body.comment,
            occurred_at: Utc::now(),
        }),
        Permission::OrdersDecide,
    )
    .authorize(&principal)?;

    services
        .dispatch_order(order_id, cmd)
        .map_err(errors::dispatch_error_to_response)?;
    tracing::info!(order_id = %order_id, by = %principal.user_id(), "order approved");

    Ok(order_json(&services, order_id).into_response())
}

pub async fn reject_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::DecisionRequest>,
) -> ApiResult<Response> {
    let order_id = OrderId::new(parse_id(&id, "order")?);

    let cmd = CmdAuth::new(
        OrderCommand::RejectOrder(RejectOrder {
            order_id,
            actor: actor(&principal),
            signature: body.signature,
            comment: body.comment,
            occurred_at: Utc::now(),
        }),
        Permission::OrdersDecide,
    )
    .authorize(&principal)?;

    services
        .dispatch_order(order_id, cmd)
        .map_err(errors::dispatch_error_to_response)?;
    tracing::info!(order_id = %order_id, by = %principal.user_id(), "order rejected");

    Ok(order_json(&services, order_id).into_response())
}

/// GET /orders/stream
pub async fn stream_orders(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    services::orders_sse_stream(services)
}

fn supplier_exists(services: &AppServices, name: &str) -> ApiResult<bool> {
    let suppliers = services
        .documents()
        .list::<Supplier>()
        .map_err(errors::document_error_to_response)?;
    Ok(suppliers.iter().any(|s| s.record.contact.name.trim() == name))
}

fn order_json(services: &AppServices, order_id: OrderId) -> Json<serde_json::Value> {
    match services.orders_get(&order_id) {
        Some(view) => Json(serde_json::to_value(view).unwrap_or_default()),
        None => Json(serde_json::json!({ "id": order_id.to_string() })),
    }
}
