use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vitach_auth::Role;
use vitach_core::{Aggregate, AggregateId, AggregateRoot, DomainError, UserId, require_non_empty};
use vitach_events::Event;

/// Purchase order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order approval lifecycle.
///
/// `PendingPrice → PendingApproval → {Approved | Rejected}`; the last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPrice,
    PendingApproval,
    Approved,
    Rejected,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Approved | OrderStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPrice => "pending_price",
            OrderStatus::PendingApproval => "pending_approval",
            OrderStatus::Approved => "approved",
            OrderStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
    Critical,
}

/// Who is issuing a command. Role checks happen inside the aggregate too,
/// so a caller that skips the offered actions is still refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    service: String,
    article: String,
    description: String,
    quantity: u64,
    unit: String,
    urgency: Urgency,
    comment: Option<String>,
    group_id: Option<Uuid>,
    requested_by: Option<UserId>,
    created_at: Option<DateTime<Utc>>,
    status: OrderStatus,
    price: Option<u64>,
    supplier: Option<String>,
    pricing_comment: Option<String>,
    priced_by: Option<UserId>,
    priced_at: Option<DateTime<Utc>>,
    signature_dg: Option<String>,
    dg_comment: Option<String>,
    decided_by: Option<UserId>,
    decided_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Order {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            service: String::new(),
            article: String::new(),
            description: String::new(),
            quantity: 0,
            unit: String::new(),
            urgency: Urgency::Normal,
            comment: None,
            group_id: None,
            requested_by: None,
            created_at: None,
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
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn article(&self) -> &str {
        &self.article
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn urgency(&self) -> Urgency {
        self.urgency
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn price(&self) -> Option<u64> {
        self.price
    }

    pub fn supplier(&self) -> Option<&str> {
        self.supplier.as_deref()
    }

    pub fn signature_dg(&self) -> Option<&str> {
        self.signature_dg.as_deref()
    }

    pub fn dg_comment(&self) -> Option<&str> {
        self.dg_comment.as_deref()
    }

    pub fn requested_by(&self) -> Option<UserId> {
        self.requested_by
    }

    /// Status/field consistency:
    /// - `pending_price` iff neither price nor supplier is set;
    /// - `approved`/`rejected` iff a DG signature is set.
    pub fn check_invariants(&self) -> Result<(), String> {
        let unpriced = self.price.is_none() && self.supplier.is_none();
        if (self.status == OrderStatus::PendingPrice) != unpriced {
            return Err(format!(
                "status {} inconsistent with price={:?} supplier={:?}",
                self.status.as_str(),
                self.price,
                self.supplier
            ));
        }
        if self.status.is_terminal() != self.signature_dg.is_some() {
            return Err(format!(
                "status {} inconsistent with signature presence",
                self.status.as_str()
            ));
        }
        Ok(())
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateOrder (requester or DG).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub order_id: OrderId,
    pub actor: Actor,
    pub service: String,
    pub article: String,
    pub description: String,
    pub quantity: u64,
    pub unit: String,
    pub urgency: Urgency,
    pub comment: Option<String>,
    /// Shared by orders raised together from one multi-article request.
    pub group_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
}

impl CreateOrder {
    /// Field rules, checked before anything is written.
    pub fn validate(&self) -> Result<(), DomainError> {
        require_non_empty("service", &self.service)?;
        require_non_empty("article", &self.article)?;
        require_non_empty("description", &self.description)?;
        require_non_empty("unit", &self.unit)?;
        if self.quantity == 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        Ok(())
    }
}

/// Command: PriceOrder (purchasing or DG).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOrder {
    pub order_id: OrderId,
    pub actor: Actor,
    /// Unit-less amount in GNF; `None` models a missing form field.
    pub price: Option<u64>,
    pub supplier: String,
    pub comment: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApproveOrder (DG only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveOrder {
    pub order_id: OrderId,
    pub actor: Actor,
    pub signature: String,
    pub comment: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RejectOrder (DG only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectOrder {
    pub order_id: OrderId,
    pub actor: Actor,
    pub signature: String,
    pub comment: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    CreateOrder(CreateOrder),
    PriceOrder(PriceOrder),
    ApproveOrder(ApproveOrder),
    RejectOrder(RejectOrder),
}

/// Event: OrderCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub requested_by: UserId,
    pub service: String,
    pub article: String,
    pub description: String,
    pub quantity: u64,
    pub unit: String,
    pub urgency: Urgency,
    pub comment: Option<String>,
    pub group_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderPriced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPriced {
    pub order_id: OrderId,
    pub priced_by: UserId,
    pub price: u64,
    pub supplier: String,
    pub comment: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderApproved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderApproved {
    pub order_id: OrderId,
    pub decided_by: UserId,
    pub signature: String,
    pub comment: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderRejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRejected {
    pub order_id: OrderId,
    pub decided_by: UserId,
    pub signature: String,
    pub comment: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderCreated(OrderCreated),
    OrderPriced(OrderPriced),
    OrderApproved(OrderApproved),
    OrderRejected(OrderRejected),
}

impl OrderEvent {
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderEvent::OrderCreated(e) => e.order_id,
            OrderEvent::OrderPriced(e) => e.order_id,
            OrderEvent::OrderApproved(e) => e.order_id,
            OrderEvent::OrderRejected(e) => e.order_id,
        }
    }
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated(_) => "purchasing.order.created",
            OrderEvent::OrderPriced(_) => "purchasing.order.priced",
            OrderEvent::OrderApproved(_) => "purchasing.order.approved",
            OrderEvent::OrderRejected(_) => "purchasing.order.rejected",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderCreated(e) => e.occurred_at,
            OrderEvent::OrderPriced(e) => e.occurred_at,
            OrderEvent::OrderApproved(e) => e.occurred_at,
            OrderEvent::OrderRejected(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderCreated(e) => {
                self.id = e.order_id;
                self.service = e.service.clone();
                self.article = e.article.clone();
                self.description = e.description.clone();
                self.quantity = e.quantity;
                self.unit = e.unit.clone();
                self.urgency = e.urgency;
                self.comment = e.comment.clone();
                self.group_id = e.group_id;
                self.requested_by = Some(e.requested_by);
                self.created_at = Some(e.occurred_at);
                self.status = OrderStatus::PendingPrice;
                self.created = true;
            }
            OrderEvent::OrderPriced(e) => {
                self.price = Some(e.price);
                self.supplier = Some(e.supplier.clone());
                self.pricing_comment = e.comment.clone();
                self.priced_by = Some(e.priced_by);
                self.priced_at = Some(e.occurred_at);
                self.status = OrderStatus::PendingApproval;
            }
            OrderEvent::OrderApproved(e) => {
                self.signature_dg = Some(e.signature.clone());
                self.dg_comment = e.comment.clone();
                self.decided_by = Some(e.decided_by);
                self.decided_at = Some(e.occurred_at);
                self.status = OrderStatus::Approved;
            }
            OrderEvent::OrderRejected(e) => {
                self.signature_dg = Some(e.signature.clone());
                self.dg_comment = e.comment.clone();
                self.decided_by = Some(e.decided_by);
                self.decided_at = Some(e.occurred_at);
                self.status = OrderStatus::Rejected;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::CreateOrder(cmd) => self.handle_create(cmd),
            OrderCommand::PriceOrder(cmd) => self.handle_price(cmd),
            OrderCommand::ApproveOrder(cmd) => self
                .handle_decision(cmd.order_id, cmd.actor, &cmd.signature)
                .map(|()| {
                    vec![OrderEvent::OrderApproved(OrderApproved {
                        order_id: cmd.order_id,
                        decided_by: cmd.actor.user_id,
                        signature: cmd.signature.clone(),
                        comment: normalize(&cmd.comment),
                        occurred_at: cmd.occurred_at,
                    })]
                }),
            OrderCommand::RejectOrder(cmd) => self
                .handle_decision(cmd.order_id, cmd.actor, &cmd.signature)
                .map(|()| {
                    vec![OrderEvent::OrderRejected(OrderRejected {
                        order_id: cmd.order_id,
                        decided_by: cmd.actor.user_id,
                        signature: cmd.signature.clone(),
                        comment: normalize(&cmd.comment),
                        occurred_at: cmd.occurred_at,
                    })]
                }),
        }
    }
}

impl Order {
    fn ensure_order_id(&self, order_id: OrderId) -> Result<(), DomainError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn ensure_role(actor: Actor, allowed: &[Role]) -> Result<(), DomainError> {
        if allowed.contains(&actor.role) {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }

    fn ensure_not_decided(&self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::invariant(format!(
                "order is already {} and cannot change",
                self.status.as_str()
            )));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateOrder) -> Result<Vec<OrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("order already exists"));
        }
        Self::ensure_role(cmd.actor, &[Role::Requester, Role::Director])?;
        cmd.validate()?;

        Ok(vec![OrderEvent::OrderCreated(OrderCreated {
            order_id: cmd.order_id,
            requested_by: cmd.actor.user_id,
            service: cmd.service.trim().to_string(),
            article: cmd.article.trim().to_string(),
            description: cmd.description.trim().to_string(),
            quantity: cmd.quantity,
            unit: cmd.unit.trim().to_string(),
            urgency: cmd.urgency,
            comment: normalize(&cmd.comment),
            group_id: cmd.group_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_price(&self, cmd: &PriceOrder) -> Result<Vec<OrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(cmd.order_id)?;
        Self::ensure_role(cmd.actor, &[Role::Purchasing, Role::Director])?;
        self.ensure_not_decided()?;

        if self.status != OrderStatus::PendingPrice {
            return Err(DomainError::invariant("only orders awaiting a price can be priced"));
        }

        let price = match cmd.price {
            Some(p) if p > 0 => p,
            _ => return Err(DomainError::validation("price is required and must be positive")),
        };
        require_non_empty("supplier", &cmd.supplier)?;

        Ok(vec![OrderEvent::OrderPriced(OrderPriced {
            order_id: cmd.order_id,
            priced_by: cmd.actor.user_id,
            price,
            supplier: cmd.supplier.trim().to_string(),
            comment: normalize(&cmd.comment),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_decision(&self, order_id: OrderId, actor: Actor, signature: &str) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(order_id)?;
        Self::ensure_role(actor, &[Role::Director])?;
        self.ensure_not_decided()?;

        if self.status != OrderStatus::PendingApproval {
            return Err(DomainError::invariant("only priced orders can be approved or rejected"));
        }

        require_non_empty("signature", signature)
    }
}

fn normalize(comment: &Option<String>) -> Option<String> {
    comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Transition a role may be offered on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    Price,
    Approve,
    Reject,
}

/// Actions offered for `(status, role)`; mirrors the checks in `Order::handle`.
pub fn actions_for(status: OrderStatus, role: Role) -> Vec<OrderAction> {
    match (status, role) {
        (OrderStatus::PendingPrice, Role::Purchasing | Role::Director) => vec![OrderAction::Price],
        (OrderStatus::PendingApproval, Role::Director) => {
            vec![OrderAction::Approve, OrderAction::Reject]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vitach_events::execute;

    fn test_order_id() -> OrderId {
        OrderId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn actor(role: Role) -> Actor {
        Actor {
            user_id: UserId::new(),
            role,
        }
    }

    fn create_cmd(order_id: OrderId) -> CreateOrder {
        CreateOrder {
            order_id,
            actor: actor(Role::Requester),
            service: "IT".to_string(),
            article: "Laptop".to_string(),
            description: "Developer laptop".to_string(),
            quantity: 5,
            unit: "unité".to_string(),
            urgency: Urgency::Normal,
            comment: None,
            group_id: None,
            occurred_at: test_time(),
        }
    }

    fn price_cmd(order_id: OrderId, price: Option<u64>, supplier: &str) -> OrderCommand {
        OrderCommand::PriceOrder(PriceOrder {
            order_id,
            actor: actor(Role::Purchasing),
            price,
            supplier: supplier.to_string(),
            comment: None,
            occurred_at: test_time(),
        })
    }

    fn approve_cmd(order_id: OrderId, role: Role, signature: &str) -> OrderCommand {
        OrderCommand::ApproveOrder(ApproveOrder {
            order_id,
            actor: actor(role),
            signature: signature.to_string(),
            comment: Some("ok".to_string()),
            occurred_at: test_time(),
        })
    }

    fn reject_cmd(order_id: OrderId, signature: &str) -> OrderCommand {
        OrderCommand::RejectOrder(RejectOrder {
            order_id,
            actor: actor(Role::Director),
            signature: signature.to_string(),
            comment: None,
            occurred_at: test_time(),
        })
    }

    fn created_order() -> Order {
        let order_id = test_order_id();
        let mut order = Order::empty(order_id);
        execute(&mut order, &OrderCommand::CreateOrder(create_cmd(order_id))).unwrap();
        order
    }

    fn priced_order() -> Order {
        let mut order = created_order();
        let id = order.id_typed();
        execute(&mut order, &price_cmd(id, Some(100_000), "LDLC")).unwrap();
        order
    }

    #[test]
    fn create_starts_pending_price_without_price_or_supplier() {
        let order = created_order();
        assert_eq!(order.status(), OrderStatus::PendingPrice);
        assert_eq!(order.price(), None);
        assert_eq!(order.supplier(), None);
        assert_eq!(order.quantity(), 5);
        assert_eq!(order.unit(), "unité");
        assert_eq!(order.service(), "IT");
        assert!(order.requested_by().is_some());
        assert_eq!(order.version(), 1);
    }

    #[test]
    fn create_rejects_zero_quantity_and_missing_fields() {
        let order_id = test_order_id();
        let order = Order::empty(order_id);

        let mut cmd = create_cmd(order_id);
        cmd.quantity = 0;
        let err = order.handle(&OrderCommand::CreateOrder(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("quantity")));

        let mut cmd = create_cmd(order_id);
        cmd.article = "  ".to_string();
        let err = order.handle(&OrderCommand::CreateOrder(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("article")));
    }

    #[test]
    fn purchasing_cannot_create_orders() {
        let order_id = test_order_id();
        let mut cmd = create_cmd(order_id);
        cmd.actor = actor(Role::Purchasing);
        let err = Order::empty(order_id)
            .handle(&OrderCommand::CreateOrder(cmd))
            .unwrap_err();
        assert_eq!(err, DomainError::Unauthorized);
    }

    #[test]
    fn price_moves_to_pending_approval() {
        let order = priced_order();
        assert_eq!(order.status(), OrderStatus::PendingApproval);
        assert_eq!(order.price(), Some(100_000));
        assert_eq!(order.supplier(), Some("LDLC"));
        assert!(order.check_invariants().is_ok());
    }

    #[test]
    fn price_without_price_or_supplier_is_refused_and_state_unchanged() {
        let order = created_order();
        let id = order.id_typed();

        for cmd in [price_cmd(id, None, "LDLC"), price_cmd(id, Some(0), "LDLC"), price_cmd(id, Some(10), " ")] {
            let mut copy = order.clone();
            let err = execute(&mut copy, &cmd).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
            assert_eq!(copy, order);
        }
    }

    #[test]
    fn requester_cannot_price() {
        let order = created_order();
        let cmd = OrderCommand::PriceOrder(PriceOrder {
            order_id: order.id_typed(),
            actor: actor(Role::Requester),
            price: Some(1),
            supplier: "LDLC".to_string(),
            comment: None,
            occurred_at: test_time(),
        });
        assert_eq!(order.handle(&cmd).unwrap_err(), DomainError::Unauthorized);
    }

    #[test]
    fn approve_records_signature() {
        let mut order = priced_order();
        let id = order.id_typed();
        execute(&mut order, &approve_cmd(id, Role::Director, "data:image/png;base64,AAA")).unwrap();

        assert_eq!(order.status(), OrderStatus::Approved);
        assert_eq!(order.signature_dg(), Some("data:image/png;base64,AAA"));
        assert_eq!(order.dg_comment(), Some("ok"));
        assert!(order.check_invariants().is_ok());
    }

    #[test]
    fn reject_records_signature() {
        let mut order = priced_order();
        let id = order.id_typed();
        execute(&mut order, &reject_cmd(id, "sig")).unwrap();

        assert_eq!(order.status(), OrderStatus::Rejected);
        assert_eq!(order.signature_dg(), Some("sig"));
    }

    #[test]
    fn decision_requires_signature() {
        let order = priced_order();
        let id = order.id_typed();
        for cmd in [approve_cmd(id, Role::Director, ""), reject_cmd(id, "   ")] {
            let mut copy = order.clone();
            let err = execute(&mut copy, &cmd).unwrap_err();
            assert!(matches!(err, DomainError::Validation(msg) if msg.contains("signature")));
            assert_eq!(copy, order);
        }
    }

    #[test]
    fn purchasing_is_refused_approval_even_when_bypassing_actions() {
        let order = priced_order();
        assert!(actions_for(order.status(), Role::Purchasing).is_empty());

        let err = order
            .handle(&approve_cmd(order.id_typed(), Role::Purchasing, "sig"))
            .unwrap_err();
        assert_eq!(err, DomainError::Unauthorized);
    }

    #[test]
    fn decided_orders_accept_no_further_transition() {
        let mut order = priced_order();
        let id = order.id_typed();
        execute(&mut order, &approve_cmd(id, Role::Director, "sig")).unwrap();

        for cmd in [reject_cmd(id, "sig"), approve_cmd(id, Role::Director, "sig"), price_cmd(id, Some(5), "X")] {
            let err = order.handle(&cmd).unwrap_err();
            match err {
                DomainError::InvariantViolation(msg) if msg.contains("already approved") => {}
                other => panic!("expected terminal-state violation, got {other:?}"),
            }
        }
    }

    #[test]
    fn approve_before_pricing_is_an_invariant_violation() {
        let order = created_order();
        let err = order
            .handle(&approve_cmd(order.id_typed(), Role::Director, "sig"))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn commands_on_missing_order_are_not_found() {
        let id = test_order_id();
        let err = Order::empty(id).handle(&price_cmd(id, Some(1), "X")).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn offered_actions_follow_status_and_role() {
        use OrderAction::*;
        assert_eq!(actions_for(OrderStatus::PendingPrice, Role::Purchasing), vec![Price]);
        assert_eq!(actions_for(OrderStatus::PendingPrice, Role::Director), vec![Price]);
        assert!(actions_for(OrderStatus::PendingPrice, Role::Requester).is_empty());
        assert_eq!(
            actions_for(OrderStatus::PendingApproval, Role::Director),
            vec![Approve, Reject]
        );
        assert!(actions_for(OrderStatus::PendingApproval, Role::Purchasing).is_empty());
        for role in Role::ALL {
            assert!(actions_for(OrderStatus::Approved, role).is_empty());
            assert!(actions_for(OrderStatus::Rejected, role).is_empty());
        }
    }

    #[test]
    fn legacy_pending_status_is_not_accepted() {
        assert!(serde_json::from_str::<OrderStatus>("\"pending\"").is_err());
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"pending_approval\"").unwrap(),
            OrderStatus::PendingApproval
        );
    }

    #[derive(Debug, Clone)]
    enum Step {
        Price(Option<u64>, String, Role),
        Approve(String, Role),
        Reject(String, Role),
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::Requester), Just(Role::Purchasing), Just(Role::Director)]
    }

    fn any_step() -> impl Strategy<Value = Step> {
        let price = prop::option::of(0u64..1_000_000);
        let text = prop_oneof![Just(String::new()), Just(" ".to_string()), "[a-z]{1,8}"];
        prop_oneof![
            (price, text.clone(), any_role()).prop_map(|(p, s, r)| Step::Price(p, s, r)),
            (text.clone(), any_role()).prop_map(|(s, r)| Step::Approve(s, r)),
            (text, any_role()).prop_map(|(s, r)| Step::Reject(s, r)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: whatever sequence of commands is attempted, accepted or
        /// refused, the status stays consistent with price, supplier and signature.
        #[test]
        fn status_stays_consistent_with_fields(steps in prop::collection::vec(any_step(), 0..8)) {
            let mut order = created_order();
            let id = order.id_typed();
            prop_assert!(order.check_invariants().is_ok());

            for step in steps {
                let cmd = match step {
                    Step::Price(price, supplier, role) => OrderCommand::PriceOrder(PriceOrder {
                        order_id: id,
                        actor: actor(role),
                        price,
                        supplier,
                        comment: None,
                        occurred_at: test_time(),
                    }),
                    Step::Approve(signature, role) => OrderCommand::ApproveOrder(ApproveOrder {
                        order_id: id,
                        actor: actor(role),
                        signature,
                        comment: None,
                        occurred_at: test_time(),
                    }),
                    Step::Reject(signature, role) => OrderCommand::RejectOrder(RejectOrder {
                        order_id: id,
                        actor: actor(role),
                        signature,
                        comment: None,
                        occurred_at: test_time(),
                    }),
                };

                let before = order.clone();
                if execute(&mut order, &cmd).is_err() {
                    prop_assert_eq!(&order, &before);
                }
                prop_assert!(order.check_invariants().is_ok(), "{:?}", order.check_invariants());
            }
        }
    }
}
