use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use vitach_auth::Role;
use vitach_core::Stored;
use vitach_hr::{LeaveRequest, LeaveStatus};
use vitach_inventory::{StockItem, StockLevel};
use vitach_maintenance::MaintenanceRecord;
use vitach_purchasing::{OrderStatus, OrderView, Urgency};

/// Maintenance is flagged this many days ahead of its scheduled date.
pub const MAINTENANCE_WINDOW_DAYS: i64 = 7;
/// Maintenance this close (or overdue) is critical.
const MAINTENANCE_CRITICAL_DAYS: i64 = 3;
/// Orders waiting at least this long are escalated to critical.
const ORDER_ESCALATION_DAYS: i64 = 7;

/// Declared lowest first so that `Ord` ranks critical highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Low,
    Medium,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    OrderAwaitingPrice,
    OrderAwaitingApproval,
    LowStock,
    MaintenanceDue,
    LeaveAwaitingApproval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Stable per source document, e.g. `stock-<id>`.
    pub id: String,
    pub kind: AlertKind,
    pub title: String,
    pub description: String,
    pub priority: AlertPriority,
    /// Timestamp used for recency ordering.
    pub at: DateTime<Utc>,
}

/// Collections the feed is derived from, fetched wholesale by the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlertSources<'a> {
    pub orders: &'a [OrderView],
    pub stock: &'a [Stored<StockItem>],
    pub maintenance: &'a [Stored<MaintenanceRecord>],
    pub leave_requests: &'a [Stored<LeaveRequest>],
}

/// Alerts visible to `role`, most urgent first, newest first within a priority.
pub fn collect_alerts(role: Role, sources: AlertSources<'_>, now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for order in sources.orders {
        let kind = match (order.status, role) {
            (OrderStatus::PendingPrice, Role::Purchasing) => AlertKind::OrderAwaitingPrice,
            (OrderStatus::PendingApproval, Role::Director) => AlertKind::OrderAwaitingApproval,
            _ => continue,
        };
        alerts.push(order_alert(order, kind, now));
    }

    for item in sources.stock {
        let priority = match item.record.level() {
            StockLevel::OutOfStock => AlertPriority::Critical,
            StockLevel::Low => AlertPriority::Medium,
            StockLevel::Normal => continue,
        };
        alerts.push(Alert {
            id: format!("stock-{}", item.id),
            kind: AlertKind::LowStock,
            title: "Stock bas".to_string(),
            description: format!(
                "Le stock de \"{}\" est bas ({} unités, seuil {})",
                item.record.name, item.record.quantity, item.record.reorder_threshold
            ),
            priority,
            at: item.audit.updated_at,
        });
    }

    let today = now.date_naive();
    for m in sources.maintenance {
        if !m.record.is_due_within(today, MAINTENANCE_WINDOW_DAYS) {
            continue;
        }
        let days = m.record.days_until_due(today);
        let description = if days < 0 {
            format!("\"{}\" en retard de {} jour(s)", m.record.kind, -days)
        } else {
            format!("\"{}\" prévu dans {} jour(s)", m.record.kind, days)
        };
        alerts.push(Alert {
            id: format!("maintenance-{}", m.id),
            kind: AlertKind::MaintenanceDue,
            title: "Entretien proche".to_string(),
            description,
            priority: if days <= MAINTENANCE_CRITICAL_DAYS {
                AlertPriority::Critical
            } else {
                AlertPriority::Medium
            },
            at: m.record.scheduled_on.and_time(NaiveTime::MIN).and_utc(),
        });
    }

    if role == Role::Director {
        for leave in sources.leave_requests {
            if leave.record.status != LeaveStatus::Pending {
                continue;
            }
            alerts.push(Alert {
                id: format!("leave-{}", leave.id),
                kind: AlertKind::LeaveAwaitingApproval,
                title: "Congé en attente".to_string(),
                description: format!(
                    "Demande de congé du {} au {} ({} jour(s))",
                    leave.record.start,
                    leave.record.end,
                    leave.record.duration_days()
                ),
                priority: AlertPriority::Low,
                at: leave.audit.created_at,
            });
        }
    }

    alerts.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.at.cmp(&a.at))
            .then_with(|| a.id.cmp(&b.id))
    });
    alerts
}

fn order_alert(order: &OrderView, kind: AlertKind, now: DateTime<Utc>) -> Alert {
    let since = match kind {
        AlertKind::OrderAwaitingApproval => order.priced_at.unwrap_or(order.created_at),
        _ => order.created_at,
    };
    let waiting = now - since;

    let mut priority = match order.urgency {
        Urgency::Critical => AlertPriority::Critical,
        Urgency::Urgent => AlertPriority::Medium,
        Urgency::Normal => AlertPriority::Low,
    };
    if waiting >= Duration::days(ORDER_ESCALATION_DAYS) {
        priority = AlertPriority::Critical;
    }

    let (title, verb) = match kind {
        AlertKind::OrderAwaitingApproval => ("Commande à valider", "attend une validation"),
        _ => ("Commande en attente", "attend un prix"),
    };

    Alert {
        id: format!("order-{}", order.id),
        kind,
        title: title.to_string(),
        description: format!(
            "La commande \"{}\" ({}) {verb} depuis {} jour(s)",
            order.article,
            order.service,
            waiting.num_days().max(0)
        ),
        priority,
        at: since,
    }
}
