use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vitach_core::UserId;

use crate::order::{OrderCreated, OrderEvent, OrderId, OrderStatus, Urgency};

/// Flat, serializable row for one order, folded from its events.
///
/// This is what lists, streams and alert derivation see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub service: String,
    pub article: String,
    pub description: String,
    pub quantity: u64,
    pub unit: String,
    pub urgency: Urgency,
    pub comment: Option<String>,
    pub group_id: Option<Uuid>,
    pub requested_by: UserId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub price: Option<u64>,
    pub supplier: Option<String>,
    pub pricing_comment: Option<String>,
    pub priced_by: Option<UserId>,
    pub priced_at: Option<DateTime<Utc>>,
    pub signature_dg: Option<String>,
    pub dg_comment: Option<String>,
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl OrderView {
    pub fn created(e: &OrderCreated) -> Self {
        Self {
            id: e.order_id,
            service: e.service.clone(),
            article: e.article.clone(),
            description: e.description.clone(),
            quantity: e.quantity,
            unit: e.unit.clone(),
            urgency: e.urgency,
            comment: e.comment.clone(),
            group_id: e.group_id,
            requested_by: e.requested_by,
            created_at: e.occurred_at,
            status: OrderStatus::PendingPrice,
            price: None,
            supplier: None,
            pricing_comment: None,
            priced_by: None,
            priced_at: None,
            signature_dg: None,
            dg_comment: None,
            decided_by: None,
            decided_at: None,
            updated_at: e.occurred_at,
            version: 1,
        }
    }

    /// Fold a follow-up event. Creation events are ignored here.
    pub fn apply(&mut self, event: &OrderEvent) {
        match event {
            OrderEvent::OrderCreated(_) => return,
            OrderEvent::OrderPriced(e) => {
                self.status = OrderStatus::PendingApproval;
                self.price = Some(e.price);
                self.supplier = Some(e.supplier.clone());
                self.pricing_comment = e.comment.clone();
                self.priced_by = Some(e.priced_by);
                self.priced_at = Some(e.occurred_at);
                self.updated_at = e.occurred_at;
            }
            OrderEvent::OrderApproved(e) => {
                self.status = OrderStatus::Approved;
                self.signature_dg = Some(e.signature.clone());
                self.dg_comment = e.comment.clone();
                self.decided_by = Some(e.decided_by);
                self.decided_at = Some(e.occurred_at);
                self.updated_at = e.occurred_at;
            }
            OrderEvent::OrderRejected(e) => {
                self.status = OrderStatus::Rejected;
                self.signature_dg = Some(e.signature.clone());
                self.dg_comment = e.comment.clone();
                self.decided_by = Some(e.decided_by);
                self.decided_at = Some(e.occurred_at);
                self.updated_at = e.occurred_at;
            }
        }
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderApproved, OrderPriced};
    use vitach_core::AggregateId;

    #[test]
    fn folds_full_lifecycle() {
        let now = Utc::now();
        let order_id = OrderId::new(AggregateId::new());
        let mut view = OrderView::created(&OrderCreated {
            order_id,
            requested_by: UserId::new(),
            service: "IT".to_string(),
            article: "Laptop".to_string(),
            description: "Developer laptop".to_string(),
            quantity: 5,
            unit: "unité".to_string(),
            urgency: Urgency::Urgent,
            comment: None,
            group_id: None,
            occurred_at: now,
        });

        view.apply(&OrderEvent::OrderPriced(OrderPriced {
            order_id,
            priced_by: UserId::new(),
            price: 100_000,
            supplier: "LDLC".to_string(),
            comment: None,
            occurred_at: now,
        }));
        view.apply(&OrderEvent::OrderApproved(OrderApproved {
            order_id,
            decided_by: UserId::new(),
            signature: "sig".to_string(),
            comment: None,
            occurred_at: now,
        }));

        assert_eq!(view.status, OrderStatus::Approved);
        assert_eq!(view.price, Some(100_000));
        assert_eq!(view.signature_dg.as_deref(), Some("sig"));
        assert_eq!(view.version, 3);
    }
}
