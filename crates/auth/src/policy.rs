//! Static role policy: which pages a role may open and which mutations it may
//! perform. Every HTTP mutation is checked against [`permissions_for`]; page
//! access is answered by [`decide_route`].

use serde::Serialize;

use crate::{Permission, Role};

/// Where a refused or unknown page sends the user.
pub const DEFAULT_REDIRECT: &str = "/dashboard";

const ALL_ROLES: &[Role] = &[Role::Requester, Role::Purchasing, Role::Director];
const REQUESTERS: &[Role] = &[Role::Requester, Role::Director];
const BUYERS: &[Role] = &[Role::Purchasing, Role::Director];
const DIRECTOR: &[Role] = &[Role::Director];

/// Pages of the application.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Dashboard,
    NewOrder,
    Purchasing,
    DgValidation,
    Orders,
    Maintenance,
    Stock,
    Articles,
    Services,
    Suppliers,
    Providers,
    Employees,
    Hr,
    Reports,
    Budgets,
    Alerts,
    Settings,
    Permissions,
    AdvancedDashboard,
    AiPredictions,
    Workflows,
    It,
    Offline,
}

impl Route {
    pub const ALL: [Route; 23] = [
        Route::Dashboard,
        Route::NewOrder,
        Route::Purchasing,
        Route::DgValidation,
        Route::Orders,
        Route::Maintenance,
        Route::Stock,
        Route::Articles,
        Route::Services,
        Route::Suppliers,
        Route::Providers,
        Route::Employees,
        Route::Hr,
        Route::Reports,
        Route::Budgets,
        Route::Alerts,
        Route::Settings,
        Route::Permissions,
        Route::AdvancedDashboard,
        Route::AiPredictions,
        Route::Workflows,
        Route::It,
        Route::Offline,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "dashboard",
            Route::NewOrder => "new-order",
            Route::Purchasing => "purchasing",
            Route::DgValidation => "dg-validation",
            Route::Orders => "orders",
            Route::Maintenance => "maintenance",
            Route::Stock => "stock",
            Route::Articles => "articles",
            Route::Services => "services",
            Route::Suppliers => "suppliers",
            Route::Providers => "providers",
            Route::Employees => "employees",
            Route::Hr => "hr",
            Route::Reports => "reports",
            Route::Budgets => "budgets",
            Route::Alerts => "alerts",
            Route::Settings => "settings",
            Route::Permissions => "permissions",
            Route::AdvancedDashboard => "advanced-dashboard",
            Route::AiPredictions => "ai-predictions",
            Route::Workflows => "workflows",
            Route::It => "it",
            Route::Offline => "offline",
        }
    }

    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Route::Dashboard
            | Route::Orders
            | Route::Maintenance
            | Route::Stock
            | Route::Articles
            | Route::Alerts => ALL_ROLES,
            Route::NewOrder => REQUESTERS,
            Route::Purchasing | Route::Suppliers | Route::Providers => BUYERS,
            Route::DgValidation
            | Route::Services
            | Route::Employees
            | Route::Hr
            | Route::Reports
            | Route::Budgets
            | Route::Settings
            | Route::Permissions
            | Route::AdvancedDashboard
            | Route::AiPredictions
            | Route::Workflows
            | Route::It
            | Route::Offline => DIRECTOR,
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.trim_matches('/');
        Route::ALL.into_iter().find(|r| r.path() == path)
    }
}

/// Outcome of a page access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    Allow { route: Route },
    Redirect { to: &'static str },
}

/// Unknown pages and pages outside the role's table both redirect.
pub fn decide_route(path: &str, role: Role) -> RouteDecision {
    match Route::from_path(path) {
        Some(route) if route.allows(role) => RouteDecision::Allow { route },
        _ => RouteDecision::Redirect {
            to: DEFAULT_REDIRECT,
        },
    }
}

/// Mutations granted to each role.
pub fn permissions_for(role: Role) -> &'static [Permission] {
    use Permission::*;

    match role {
        Role::Requester => &[
            OrdersCreate,
            StockWrite,
            StockWithdraw,
            ArticlesWrite,
            VehiclesWrite,
            MaintenanceWrite,
            LeaveRequestsCreate,
            AttendanceClock,
            IncidentsCreate,
            NotificationsWrite,
        ],
        Role::Purchasing => &[
            OrdersPrice,
            StockWrite,
            StockWithdraw,
            ArticlesWrite,
            SuppliersWrite,
            ProvidersWrite,
            VehiclesWrite,
            MaintenanceWrite,
            LeaveRequestsCreate,
            AttendanceClock,
            IncidentsCreate,
            WorkflowsAdvance,
            NotificationsWrite,
        ],
        Role::Director => &Permission::ALL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_transitions_follow_role_table() {
        assert!(permissions_for(Role::Requester).contains(&Permission::OrdersCreate));
        assert!(!permissions_for(Role::Requester).contains(&Permission::OrdersPrice));
        assert!(permissions_for(Role::Purchasing).contains(&Permission::OrdersPrice));
        assert!(!permissions_for(Role::Purchasing).contains(&Permission::OrdersDecide));
        assert!(!permissions_for(Role::Purchasing).contains(&Permission::OrdersCreate));
        for p in Permission::ALL {
            assert!(permissions_for(Role::Director).contains(&p));
        }
    }

    #[test]
    fn refused_and_unknown_pages_redirect_to_dashboard() {
        assert_eq!(
            decide_route("/dg-validation", Role::Purchasing),
            RouteDecision::Redirect { to: "/dashboard" }
        );
        assert_eq!(
            decide_route("/nowhere", Role::Director),
            RouteDecision::Redirect { to: "/dashboard" }
        );
        assert_eq!(
            decide_route("purchasing", Role::Purchasing),
            RouteDecision::Allow {
                route: Route::Purchasing
            }
        );
    }

    #[test]
    fn every_role_reaches_shared_pages() {
        for role in Role::ALL {
            for route in [Route::Dashboard, Route::Orders, Route::Stock, Route::Alerts] {
                assert!(route.allows(role), "{role} should reach {}", route.path());
            }
        }
        assert!(!Route::NewOrder.allows(Role::Purchasing));
        assert!(!Route::Suppliers.allows(Role::Requester));
    }

    #[test]
    fn everyone_clocks_in_but_only_the_director_runs_it() {
        for role in Role::ALL {
            assert!(permissions_for(role).contains(&Permission::AttendanceClock));
            assert!(permissions_for(role).contains(&Permission::IncidentsCreate));
        }
        assert!(Route::It.allows(Role::Director));
        assert!(!Route::It.allows(Role::Purchasing));
        assert!(!permissions_for(Role::Requester).contains(&Permission::AttendanceWrite));
        assert!(!permissions_for(Role::Purchasing).contains(&Permission::IncidentsManage));
    }
}
