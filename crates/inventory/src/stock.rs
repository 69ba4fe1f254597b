use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitach_core::{
    DocumentId, DomainError, DomainResult, Record, require_non_empty, require_positive,
};

/// Where a stock item stands relative to its reorder threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    Normal,
}

/// A stocked article with its on-hand quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub name: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// On-hand quantity. Signed so that legacy negative counts still load.
    pub quantity: i64,
    pub reorder_threshold: i64,
    /// Unit price in GNF.
    #[serde(default)]
    pub unit_price: u64,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub unit: Option<String>,
}

impl StockItem {
    pub fn level(&self) -> StockLevel {
        if self.quantity <= 0 {
            StockLevel::OutOfStock
        } else if self.quantity <= self.reorder_threshold {
            StockLevel::Low
        } else {
            StockLevel::Normal
        }
    }

    /// At or below the reorder threshold (out of stock included).
    pub fn needs_reorder(&self) -> bool {
        self.level() != StockLevel::Normal
    }

    /// Take `quantity` out of stock and return what remains.
    ///
    /// Refused when `quantity` is zero or more than what is on hand; the item
    /// is left untouched in that case.
    pub fn withdraw(&mut self, quantity: u64) -> DomainResult<i64> {
        require_positive("quantity", quantity)?;
        let requested = i64::try_from(quantity)
            .map_err(|_| DomainError::validation("quantity is out of range"))?;
        if requested > self.quantity {
            return Err(DomainError::invariant(format!(
                "cannot withdraw {requested}: only {} available",
                self.quantity.max(0)
            )));
        }
        self.quantity -= requested;
        Ok(self.quantity)
    }
}

impl Record for StockItem {
    const COLLECTION: &'static str = "stock";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("name", &self.name)?;
        if self.reorder_threshold < 0 {
            return Err(DomainError::validation("reorder_threshold cannot be negative"));
        }
        Ok(())
    }
}

/// Audit trail of one withdrawal, signed by the receiving employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockWithdrawal {
    pub stock_id: DocumentId,
    pub item_name: String,
    pub employee_id: DocumentId,
    pub quantity: u64,
    pub withdrawn_at: DateTime<Utc>,
    /// Signature image as a data URL.
    pub signature: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Record for StockWithdrawal {
    const COLLECTION: &'static str = "stock_withdrawals";

    fn validate(&self) -> DomainResult<()> {
        require_positive("quantity", self.quantity)?;
        require_non_empty("signature", &self.signature)
    }
}
