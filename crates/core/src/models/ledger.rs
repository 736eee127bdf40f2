use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::event::{CashFlowEvent, EventKind};

/// Locked starting point of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialCapital {
    pub start_date: NaiveDate,
    /// Positive amount invested on `start_date`
    pub amount: f64,
}

/// The cash-flow ledger: the locked initial capital plus every manual and
/// recurring event.
///
/// Events are kept in ascending date order, ties in insertion order.
/// Outside the crate they are read-only; mutate through `LedgerService`
/// or the scheduler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    pub initial: Option<InitialCapital>,
    events: Vec<CashFlowEvent>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from events in any order. Same-day events keep their
    /// relative order.
    pub fn with_events(
        initial: Option<InitialCapital>,
        events: impl IntoIterator<Item = CashFlowEvent>,
    ) -> Self {
        let mut events: Vec<CashFlowEvent> = events.into_iter().collect();
        events.sort_by_key(|e| e.date);
        Self { initial, events }
    }

    /// Stored manual and recurring events, ascending by date.
    #[must_use]
    pub fn events(&self) -> &[CashFlowEvent] {
        &self.events
    }

    /// Insert keeping date order; same-day events stay in insertion order.
    pub(crate) fn insert_sorted(&mut self, event: CashFlowEvent) {
        let pos = self.events.partition_point(|e| e.date <= event.date);
        self.events.insert(pos, event);
    }

    /// Remove and return the first event matching `pred`.
    pub(crate) fn remove_first(
        &mut self,
        pred: impl FnMut(&CashFlowEvent) -> bool,
    ) -> Option<CashFlowEvent> {
        let idx = self.events.iter().position(pred)?;
        Some(self.events.remove(idx))
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initial.is_some()
    }

    /// The initial capital as a (negative) cash-flow event, synthesized on demand.
    #[must_use]
    pub fn initial_capital_event(&self) -> Option<CashFlowEvent> {
        self.initial.map(|init| {
            CashFlowEvent::new(init.start_date, -init.amount, EventKind::InitialCapital, "")
        })
    }

    /// Events of a given kind, in ledger order.
    pub fn events_of_kind(&self, kind: EventKind) -> impl Iterator<Item = &CashFlowEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Initial capital followed by every stored event, ascending by date.
    #[must_use]
    pub fn all_events(&self) -> Vec<CashFlowEvent> {
        let mut all = Vec::with_capacity(self.events.len() + 1);
        all.extend(self.initial_capital_event());
        all.extend(self.events.iter().cloned());
        // Stable: the initial capital stays ahead of same-day events
        all.sort_by_key(|e| e.date);
        all
    }
}
