use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::event::{CashFlow, CashFlowEvent, EventMatch};
use crate::models::ledger::{InitialCapital, Ledger};

/// Manages the cash-flow ledger: initial capital, manual events, removal.
///
/// Pure business logic, no I/O. Keeps `Ledger::events` sorted by date with
/// ties in insertion order.
pub struct LedgerService {
    removal_epsilon: f64,
}

impl LedgerService {
    pub fn new(removal_epsilon: f64) -> Self {
        Self { removal_epsilon }
    }

    /// Lock the initial capital. Only allowed once; see `reinitialize`.
    pub fn initialize(
        &self,
        ledger: &mut Ledger,
        start_date: NaiveDate,
        capital: f64,
    ) -> Result<(), CoreError> {
        if let Some(init) = ledger.initial {
            return Err(CoreError::AlreadyInitialized {
                start_date: init.start_date,
                capital: init.amount,
            });
        }
        self.reinitialize(ledger, start_date, capital)
    }

    /// Replace the locked initial capital (explicit re-lock).
    pub fn reinitialize(
        &self,
        ledger: &mut Ledger,
        start_date: NaiveDate,
        capital: f64,
    ) -> Result<(), CoreError> {
        let amount = ensure_positive(capital, "Initial capital")?;
        ledger.initial = Some(InitialCapital { start_date, amount });
        Ok(())
    }

    /// Append a manual event. Duplicates are allowed: buying the same amount
    /// twice on one day is legitimate.
    pub fn add_manual(
        &self,
        ledger: &mut Ledger,
        date: NaiveDate,
        signed_amount: f64,
        remark: impl Into<String>,
    ) -> Result<CashFlowEvent, CoreError> {
        if !signed_amount.is_finite() || signed_amount == 0.0 {
            return Err(CoreError::InvalidAmount(format!(
                "Cash-flow amount must be a non-zero number, got {signed_amount}"
            )));
        }
        let event = CashFlowEvent::manual(date, signed_amount, remark);
        ledger.insert_sorted(event.clone());
        Ok(event)
    }

    /// Remove the first event matching `criteria`.
    ///
    /// Returns `None` when nothing matches; the caller may be acting on a
    /// stale view, so that is not an error.
    pub fn remove(&self, ledger: &mut Ledger, criteria: &EventMatch) -> Option<CashFlowEvent> {
        ledger.remove_first(|e| criteria.matches(e, self.removal_epsilon))
    }

    /// `(date, amount)` pairs of the initial capital and every event, by date.
    #[must_use]
    pub fn cash_flows(&self, ledger: &Ledger) -> Vec<CashFlow> {
        ledger.all_events().iter().map(CashFlow::from).collect()
    }
}

/// Reject zero, negative, NaN and infinite amounts at an entry point.
pub(crate) fn ensure_positive(amount: f64, what: &str) -> Result<f64, CoreError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(CoreError::InvalidAmount(format!(
            "{what} must be a positive number, got {amount}"
        )))
    }
}
