//! Service budgets and the spend check run before an order is raised.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use vitach_core::{DomainError, DomainResult, Record, require_non_empty, require_positive};

/// Share of a budget above which a check reports a warning.
const WARNING_THRESHOLD_PERCENT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Annual,
    Monthly,
}

/// Spending ceiling for one service over a year or one month of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub service: String,
    pub year: i32,
    pub period: BudgetPeriod,
    /// 1..=12; required for monthly budgets, ignored for annual ones.
    #[serde(default)]
    pub month: Option<u32>,
    /// Amount in GNF.
    pub total_amount: u64,
}

impl Budget {
    fn covers(&self, service: &str, at: DateTime<Utc>) -> bool {
        if self.service != service || self.year != at.year() {
            return false;
        }
        match self.period {
            BudgetPeriod::Annual => true,
            BudgetPeriod::Monthly => self.month == Some(at.month()),
        }
    }
}

impl Record for Budget {
    const COLLECTION: &'static str = "budgets";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("service", &self.service)?;
        require_positive("total_amount", self.total_amount)?;
        match (self.period, self.month) {
            (BudgetPeriod::Monthly, None) => {
                Err(DomainError::validation("month is required for a monthly budget"))
            }
            (_, Some(m)) if !(1..=12).contains(&m) => {
                Err(DomainError::validation("month must be between 1 and 12"))
            }
            _ => Ok(()),
        }
    }
}

/// One approved order counted against a service's budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendEntry {
    pub service: String,
    pub amount: u64,
    /// When the order was raised; decides which period it falls in.
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    NoBudget,
    Within,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCheck {
    pub status: BudgetStatus,
    pub period: Option<BudgetPeriod>,
    pub budget_total: u64,
    pub spent: u64,
    pub requested: u64,
    pub total: u64,
    pub remaining: i64,
    pub percent_used: f64,
}

impl BudgetCheck {
    fn no_budget(requested: u64) -> Self {
        Self {
            status: BudgetStatus::NoBudget,
            period: None,
            budget_total: 0,
            spent: 0,
            requested,
            total: requested,
            remaining: 0,
            percent_used: 0.0,
        }
    }
}

/// Check `requested` against the budget covering `service` at `now`.
///
/// The first budget matching service, year and (annual or current month) wins.
/// Spend counts only entries of the same service inside that budget's period.
pub fn check_budget(
    budgets: &[Budget],
    spend: &[SpendEntry],
    service: &str,
    requested: u64,
    now: DateTime<Utc>,
) -> BudgetCheck {
    let Some(budget) = budgets.iter().find(|b| b.covers(service, now)) else {
        return BudgetCheck::no_budget(requested);
    };

    let spent: u64 = spend
        .iter()
        .filter(|e| e.service == service && e.at.year() == now.year())
        .filter(|e| budget.period == BudgetPeriod::Annual || e.at.month() == now.month())
        .fold(0u64, |acc, e| acc.saturating_add(e.amount));

    // Amounts are u64 GNF; the difference is taken in i128 and clamped.
    let total = spent.saturating_add(requested);
    let difference = i128::from(budget.total_amount) - i128::from(total);
    let remaining = i64::try_from(difference).unwrap_or(if difference < 0 { i64::MIN } else { i64::MAX });
    let percent_used = if budget.total_amount == 0 {
        0.0
    } else {
        total as f64 / budget.total_amount as f64 * 100.0
    };

    let status = if difference < 0 {
        BudgetStatus::Exceeded
    } else if percent_used > WARNING_THRESHOLD_PERCENT {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Within
    };

    BudgetCheck {
        status,
        period: Some(budget.period),
        budget_total: budget.total_amount,
        spent,
        requested,
        total,
        remaining,
        percent_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn monthly(service: &str, month: u32, total: u64) -> Budget {
        Budget {
            service: service.to_string(),
            year: 2026,
            period: BudgetPeriod::Monthly,
            month: Some(month),
            total_amount: total,
        }
    }

    fn spend(service: &str, amount: u64, when: DateTime<Utc>) -> SpendEntry {
        SpendEntry {
            service: service.to_string(),
            amount,
            at: when,
        }
    }

    #[test]
    fn without_matching_budget_reports_no_budget() {
        let check = check_budget(&[monthly("IT", 3, 1000)], &[], "IT", 50, at(2026, 4, 2));
        assert_eq!(check.status, BudgetStatus::NoBudget);
        assert_eq!(check.requested, 50);
    }

    #[test]
    fn monthly_budget_counts_only_current_month() {
        let budgets = [monthly("IT", 4, 1000)];
        let spend = [
            spend("IT", 300, at(2026, 4, 1)),
            spend("IT", 900, at(2026, 3, 30)),
            spend("RH", 900, at(2026, 4, 1)),
        ];

        let check = check_budget(&budgets, &spend, "IT", 200, at(2026, 4, 15));
        assert_eq!(check.spent, 300);
        assert_eq!(check.total, 500);
        assert_eq!(check.remaining, 500);
        assert_eq!(check.status, BudgetStatus::Within);
    }

    #[test]
    fn warning_above_eighty_percent_and_exceeded_below_zero() {
        let budgets = [Budget {
            service: "IT".to_string(),
            year: 2026,
            period: BudgetPeriod::Annual,
            month: None,
            total_amount: 1000,
        }];
        let spend = [spend("IT", 700, at(2026, 1, 10))];
        let now = at(2026, 6, 1);

        assert_eq!(check_budget(&budgets, &spend, "IT", 100, now).status, BudgetStatus::Within);
        assert_eq!(check_budget(&budgets, &spend, "IT", 150, now).status, BudgetStatus::Warning);
        assert_eq!(check_budget(&budgets, &spend, "IT", 300, now).status, BudgetStatus::Warning);

        let over = check_budget(&budgets, &spend, "IT", 301, now);
        assert_eq!(over.status, BudgetStatus::Exceeded);
        assert_eq!(over.remaining, -1);
    }

    #[test]
    fn huge_amounts_saturate_instead_of_wrapping() {
        let budgets = [monthly("IT", 4, 1000)];
        let now = at(2026, 4, 15);

        let check = check_budget(&budgets, &[], "IT", u64::MAX, now);
        assert_eq!(check.status, BudgetStatus::Exceeded);
        assert_eq!(check.total, u64::MAX);
        assert!(check.remaining < 0);

        let spend = [spend("IT", u64::MAX, at(2026, 4, 1)), spend("IT", u64::MAX, at(2026, 4, 2))];
        let check = check_budget(&budgets, &spend, "IT", 1, now);
        assert_eq!(check.spent, u64::MAX);
        assert_eq!(check.status, BudgetStatus::Exceeded);
        assert_eq!(check.remaining, i64::MIN);

        let roomy = [Budget {
            total_amount: u64::MAX,
            ..monthly("IT", 4, 1)
        }];
        let check = check_budget(&roomy, &[], "IT", 1, now);
        assert_eq!(check.status, BudgetStatus::Within);
        assert_eq!(check.remaining, i64::MAX);
    }

    #[test]
    fn monthly_budget_requires_a_valid_month() {
        let mut budget = monthly("IT", 4, 1000);
        assert!(budget.validate().is_ok());
        budget.month = None;
        assert!(budget.validate().is_err());
        budget.month = Some(13);
        assert!(budget.validate().is_err());
    }
}
