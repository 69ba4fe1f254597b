use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vitach_alerts::NotificationKind;
use vitach_auth::{Identity, Role};
use vitach_core::{DocumentId, UserId};
use vitach_hr::AttendanceSummary;
use vitach_it::{IncidentPriority, IncidentStats, IncidentStatus, SlaStatus};
use vitach_purchasing::{OrderStatus, Urgency};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SetUserStatusRequest {
    pub disabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub service: String,
    pub article: String,
    #[serde(default)]
    pub description: String,
    pub quantity: u64,
    pub unit: String,
    #[serde(default)]
    pub urgency: Urgency,
    pub comment: Option<String>,
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PriceOrderRequest {
    pub price: Option<u64>,
    #[serde(default)]
    pub supplier: String,
    pub comment: Option<String>,
}

/// Body of both approve and reject.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub signature: String,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FieldFilter {
    pub field: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawStockRequest {
    pub employee_id: String,
    pub quantity: u64,
    #[serde(default)]
    pub signature: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BudgetCheckRequest {
    pub service: String,
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    /// Defaults to the caller.
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PolicyQuery {
    pub path: Option<String>,
}

/// First call of the day records the arrival, the second the departure.
#[derive(Debug, Deserialize)]
pub struct ClockRequest {
    pub employee_id: DocumentId,
    /// Required for the arrival.
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub device: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.user_id,
            email: identity.email,
            display_name: identity.display_name,
            role: identity.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct IncidentSla {
    pub id: DocumentId,
    pub ticket: String,
    pub priority: IncidentPriority,
    pub status: IncidentStatus,
    pub sla_hours: i64,
    pub sla: SlaStatus,
}

#[derive(Debug, Default, Serialize)]
pub struct OrderCounts {
    pub total: usize,
    pub pending_price: usize,
    pub pending_approval: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct StockCounts {
    pub items: usize,
    pub low: usize,
    pub out_of_stock: usize,
}

/// Cross-module figures for the reports page.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,
    pub orders: OrderCounts,
    /// Approved spend per service, GNF.
    pub spend_by_service: BTreeMap<String, u64>,
    pub stock: StockCounts,
    pub incidents: IncidentStats,
    pub attendance: AttendanceSummary,
}

// -------------------------
// Mapping helpers
// -------------------------

/// Status literals are the snake_case wire names; the legacy `pending` is
/// not one of them.
pub fn parse_order_status(s: &str) -> Result<OrderStatus, axum::response::Response> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|_| {
        errors::json_error(
            axum::http::StatusCode::BAD_REQUEST,
            "invalid_status",
            "status must be one of: pending_price, pending_approval, approved, rejected",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_literals() {
        assert_eq!(parse_order_status("pending_price").ok(), Some(OrderStatus::PendingPrice));
        assert_eq!(parse_order_status("approved").ok(), Some(OrderStatus::Approved));
        assert!(parse_order_status("pending").is_err());
        assert!(parse_order_status("Approved").is_err());
    }

    #[test]
    fn create_order_defaults() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"service":"IT","article":"Toner","quantity":2,"unit":"unité"}"#,
        )
        .unwrap();
        assert_eq!(req.urgency, Urgency::Normal);
        assert!(req.description.is_empty());
        assert!(req.comment.is_none());
    }
}
