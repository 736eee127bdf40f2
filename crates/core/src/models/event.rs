use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a cash-flow event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// The locked starting capital (synthesized, never stored as a record)
    InitialCapital,
    /// A buy or sell entered by hand
    Manual,
    /// Materialized from a contribution plan
    Recurring,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::InitialCapital => write!(f, "Initial capital"),
            EventKind::Manual => write!(f, "Manual"),
            EventKind::Recurring => write!(f, "Recurring"),
        }
    }
}

/// A single dated, signed movement of money.
///
/// Sign convention: negative amounts leave the investor's pocket and go into
/// the fund (contributions, buys); positive amounts come back to the investor
/// (sells, withdrawals, the final valuation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowEvent {
    /// Date of the movement (daily granularity)
    pub date: NaiveDate,

    /// Signed amount, see the sign convention above
    pub amount: f64,

    /// Manual, Recurring or the synthesized InitialCapital
    pub kind: EventKind,

    /// Free text. Recurring events carry `plan:<plan name>`.
    pub remark: String,
}

impl CashFlowEvent {
    pub fn new(date: NaiveDate, amount: f64, kind: EventKind, remark: impl Into<String>) -> Self {
        Self {
            date,
            amount,
            kind,
            remark: remark.into(),
        }
    }

    pub fn manual(date: NaiveDate, amount: f64, remark: impl Into<String>) -> Self {
        Self::new(date, amount, EventKind::Manual, remark)
    }

    pub fn recurring(date: NaiveDate, amount: f64, remark: impl Into<String>) -> Self {
        Self::new(date, amount, EventKind::Recurring, remark)
    }

    /// `true` for contributions (money into the fund).
    #[must_use]
    pub fn is_contribution(&self) -> bool {
        self.amount < 0.0
    }
}

/// Criteria used to pick an event for removal.
///
/// All fields must match; `amount` is compared within the configured
/// removal epsilon because amounts round-trip through persisted text.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMatch {
    pub date: NaiveDate,
    pub amount: f64,
    pub remark: String,
    pub kind: EventKind,
}

impl EventMatch {
    pub fn new(date: NaiveDate, amount: f64, remark: impl Into<String>, kind: EventKind) -> Self {
        Self {
            date,
            amount,
            remark: remark.into(),
            kind,
        }
    }

    /// Build criteria that match exactly the given event.
    pub fn for_event(event: &CashFlowEvent) -> Self {
        Self::new(event.date, event.amount, event.remark.clone(), event.kind)
    }

    #[must_use]
    pub fn matches(&self, event: &CashFlowEvent, epsilon: f64) -> bool {
        event.date == self.date
            && event.kind == self.kind
            && event.remark == self.remark
            && (event.amount - self.amount).abs() < epsilon
    }
}

/// A bare `(date, amount)` pair, the only thing the XIRR solver looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: f64,
}

impl CashFlow {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

impl From<&CashFlowEvent> for CashFlow {
    fn from(event: &CashFlowEvent) -> Self {
        Self::new(event.date, event.amount)
    }
}
