use serde::{Deserialize, Serialize};

/// Mutation or privileged read guarded by the role policy.
///
/// Rendered as dotted names (e.g. `orders.price`) in errors and in the
/// `/policy` listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Permission {
    OrdersCreate,
    OrdersPrice,
    OrdersDecide,
    StockWrite,
    StockWithdraw,
    ArticlesWrite,
    SuppliersWrite,
    ProvidersWrite,
    ServicesWrite,
    EmployeesWrite,
    LeaveRequestsCreate,
    LeaveRequestsDecide,
    AttendanceClock,
    AttendanceWrite,
    IncidentsCreate,
    IncidentsManage,
    ItAssetsWrite,
    VehiclesWrite,
    MaintenanceWrite,
    BudgetsWrite,
    WorkflowsWrite,
    WorkflowsAdvance,
    NotificationsWrite,
    UsersManage,
}

impl Permission {
    pub const ALL: [Permission; 24] = [
        Permission::OrdersCreate,
        Permission::OrdersPrice,
        Permission::OrdersDecide,
        Permission::StockWrite,
        Permission::StockWithdraw,
        Permission::ArticlesWrite,
        Permission::SuppliersWrite,
        Permission::ProvidersWrite,
        Permission::ServicesWrite,
        Permission::EmployeesWrite,
        Permission::LeaveRequestsCreate,
        Permission::LeaveRequestsDecide,
        Permission::AttendanceClock,
        Permission::AttendanceWrite,
        Permission::IncidentsCreate,
        Permission::IncidentsManage,
        Permission::ItAssetsWrite,
        Permission::VehiclesWrite,
        Permission::MaintenanceWrite,
        Permission::BudgetsWrite,
        Permission::WorkflowsWrite,
        Permission::WorkflowsAdvance,
        Permission::NotificationsWrite,
        Permission::UsersManage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::OrdersCreate => "orders.create",
            Permission::OrdersPrice => "orders.price",
            Permission::OrdersDecide => "orders.decide",
            Permission::StockWrite => "stock.write",
            Permission::StockWithdraw => "stock.withdraw",
            Permission::ArticlesWrite => "articles.write",
            Permission::SuppliersWrite => "suppliers.write",
            Permission::ProvidersWrite => "providers.write",
            Permission::ServicesWrite => "services.write",
            Permission::EmployeesWrite => "employees.write",
            Permission::LeaveRequestsCreate => "leave_requests.create",
            Permission::LeaveRequestsDecide => "leave_requests.decide",
            Permission::AttendanceClock => "attendance.clock",
            Permission::AttendanceWrite => "attendance.write",
            Permission::IncidentsCreate => "incidents.create",
            Permission::IncidentsManage => "incidents.manage",
            Permission::ItAssetsWrite => "it_assets.write",
            Permission::VehiclesWrite => "vehicles.write",
            Permission::MaintenanceWrite => "maintenance.write",
            Permission::BudgetsWrite => "budgets.write",
            Permission::WorkflowsWrite => "workflows.write",
            Permission::WorkflowsAdvance => "workflows.advance",
            Permission::NotificationsWrite => "notifications.write",
            Permission::UsersManage => "users.manage",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Permission> for &'static str {
    fn from(value: Permission) -> Self {
        value.as_str()
    }
}

impl TryFrom<String> for Permission {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == value)
            .ok_or_else(|| format!("unknown permission '{value}'"))
    }
}
