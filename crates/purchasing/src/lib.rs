//! Purchasing domain: the event-sourced order-approval lifecycle, service
//! budgets and workflow definitions.
//!
//! Pure domain logic only (no IO, no HTTP, no storage).

pub mod budget;
pub mod order;
pub mod view;
pub mod workflow;

pub use budget::{Budget, BudgetCheck, BudgetPeriod, BudgetStatus, SpendEntry, check_budget};
pub use order::{
    Actor, ApproveOrder, CreateOrder, Order, OrderAction, OrderApproved, OrderCommand, OrderCreated,
    OrderEvent, OrderId, OrderPriced, OrderRejected, OrderStatus, PriceOrder, RejectOrder, Urgency,
    actions_for,
};
pub use view::OrderView;
pub use workflow::{StepActor, StepStatus, Workflow, WorkflowStep};
