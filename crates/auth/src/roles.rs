use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role stored on a user profile.
///
/// The wire names (`service`, `achat`, `dg`) are what profiles and tokens carry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Department requester: raises purchase orders.
    #[serde(rename = "service")]
    Requester,
    /// Purchasing office: prices orders and picks suppliers.
    #[serde(rename = "achat")]
    Purchasing,
    /// Director-general: approves or rejects priced orders; full access.
    #[serde(rename = "dg")]
    Director,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Requester, Role::Purchasing, Role::Director];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Requester => "service",
            Role::Purchasing => "achat",
            Role::Director => "dg",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}
