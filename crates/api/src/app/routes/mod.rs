use axum::{
    Router,
    routing::{get, post},
};

use vitach_core::Record;
use vitach_hr::{Attendance, Employee, LeaveRequest};
use vitach_inventory::{Article, StockItem, StockWithdrawal};
use vitach_it::{Incident, ItAsset};
use vitach_maintenance::{MaintenanceRecord, Vehicle};
use vitach_parties::{Service, ServiceProvider, Supplier};
use vitach_purchasing::{Budget, Workflow};

pub mod alerts;
pub mod attendance;
pub mod auth;
pub mod budgets;
pub mod collections;
pub mod common;
pub mod it;
pub mod leave;
pub mod maintenance;
pub mod notifications;
pub mod orders;
pub mod policy;
pub mod predictions;
pub mod reports;
pub mod stock;
pub mod system;
pub mod users;
pub mod workflows;

fn collection_path<R: Record>() -> String {
    format!("/{}", R::COLLECTION)
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    use collections::router as crud;

    Router::new()
        .route("/me", get(system::me))
        .route("/auth/logout", post(auth::logout))
        .route("/policy/routes", get(policy::routes))
        .nest("/users", users::router())
        .nest("/orders", orders::router())
        .nest("/alerts", alerts::router())
        .nest("/notifications", notifications::router())
        .nest("/predictions", predictions::router())
        .nest("/reports", reports::router())
        .nest(&collection_path::<StockItem>(), crud::<StockItem>().merge(stock::router()))
        .nest(
            &collection_path::<StockWithdrawal>(),
            collections::withdrawals_router(),
        )
        .nest(&collection_path::<Article>(), crud::<Article>())
        .nest(&collection_path::<Employee>(), crud::<Employee>())
        .nest(&collection_path::<Supplier>(), crud::<Supplier>())
        .nest(&collection_path::<ServiceProvider>(), crud::<ServiceProvider>())
        .nest(&collection_path::<Service>(), crud::<Service>())
        .nest(&collection_path::<Vehicle>(), crud::<Vehicle>())
        .nest(
            &collection_path::<MaintenanceRecord>(),
            crud::<MaintenanceRecord>().merge(maintenance::router()),
        )
        .nest(&collection_path::<Budget>(), crud::<Budget>().merge(budgets::router()))
        .nest(&collection_path::<Workflow>(), crud::<Workflow>().merge(workflows::router()))
        .nest(
            &collection_path::<LeaveRequest>(),
            crud::<LeaveRequest>().merge(leave::router()),
        )
        .nest(&collection_path::<Attendance>(), attendance::router())
        .nest(&collection_path::<ItAsset>(), crud::<ItAsset>())
        .nest(&collection_path::<Incident>(), it::router())
}
