use serde::{Deserialize, Serialize};

use vitach_core::{DomainResult, Record, require_non_empty};

/// Internal department that raises orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Indicative yearly budget in GNF; enforced budgets live in `budgets`.
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Record for Service {
    const COLLECTION: &'static str = "services";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("name", &self.name)
    }
}
