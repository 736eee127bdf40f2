use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which root finder produced an XIRR result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveMethod {
    /// Brent's method over the configured bracket
    Bracketed,
    /// Secant iteration from the seed rate (no sign change in the bracket)
    Secant,
}

/// Outcome of an XIRR calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XirrReport {
    /// Annualized rate as a fraction (0.05 = 5 %)
    pub rate: f64,

    /// Total returned or valued minus total contributed
    pub profit: f64,

    /// Sum of the absolute values of all contributions
    pub total_contributed: f64,

    /// Sum of all inflows, the terminal valuation included
    pub total_returned: f64,

    pub method: SolveMethod,

    pub terminal_date: NaiveDate,
    pub terminal_value: f64,
}

impl XirrReport {
    /// Rate as a percentage, for display.
    #[must_use]
    pub fn rate_pct(&self) -> f64 {
        self.rate * 100.0
    }
}

/// Net cash flow of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFlow {
    pub year: i32,
    /// 1..=12
    pub month: u32,
    /// Signed sum of every event in the month
    pub net: f64,
    pub event_count: usize,
}

/// Contribution and return totals of the ledger, valuation excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub contributed: f64,
    pub returned: f64,
}

impl LedgerTotals {
    /// Money still in the fund: contributed minus returned.
    #[must_use]
    pub fn net_invested(&self) -> f64 {
        self.contributed - self.returned
    }
}

/// One step of a plan's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// When the contribution is conceptually due
    pub nominal: NaiveDate,
    /// When it is recorded, after holiday roll-forward
    pub execution: NaiveDate,
    /// The user skipped this nominal or execution date
    pub ignored: bool,
}
