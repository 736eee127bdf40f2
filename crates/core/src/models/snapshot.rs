use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use super::event::{CashFlowEvent, EventKind};
use super::ledger::{InitialCapital, Ledger};
use super::plan::ContributionPlan;

/// One stored cash-flow record (`records` and `drip_records` entries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub remark: String,
}

impl PersistedRecord {
    fn from_event(event: &CashFlowEvent) -> Self {
        Self {
            date: event.date,
            amount: event.amount,
            remark: event.remark.clone(),
        }
    }

    fn into_event(self, kind: EventKind) -> CashFlowEvent {
        CashFlowEvent::new(self.date, self.amount, kind, self.remark)
    }
}

/// Everything that gets saved after each mutation.
///
/// Field names are the on-disk contract shared with older versions of the
/// tool, so every field defaults when missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub initialized: bool,

    #[serde(default)]
    pub initial_capital: f64,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Manual buys and sells
    #[serde(default)]
    pub records: Vec<PersistedRecord>,

    /// Events materialized from contribution plans
    #[serde(default)]
    pub drip_records: Vec<PersistedRecord>,

    #[serde(default)]
    pub drip_plans: Vec<ContributionPlan>,
}

impl PersistedState {
    /// Capture the current ledger and plan set.
    pub fn from_parts(ledger: &Ledger, plans: &[ContributionPlan]) -> Self {
        let (initialized, initial_capital, start_date) = match ledger.initial {
            Some(init) => (true, init.amount, Some(init.start_date)),
            None => (false, 0.0, None),
        };

        Self {
            initialized,
            initial_capital,
            start_date,
            records: ledger
                .events_of_kind(EventKind::Manual)
                .map(PersistedRecord::from_event)
                .collect(),
            drip_records: ledger
                .events_of_kind(EventKind::Recurring)
                .map(PersistedRecord::from_event)
                .collect(),
            drip_plans: plans.to_vec(),
        }
    }

    /// Rebuild the runtime ledger and plan set.
    ///
    /// A snapshot flagged `initialized` without a `start_date` loads as
    /// uninitialized. Events come back sorted by date.
    pub fn into_parts(self) -> (Ledger, Vec<ContributionPlan>) {
        let initial = match (self.initialized, self.start_date) {
            (true, Some(start_date)) => Some(InitialCapital {
                start_date,
                amount: self.initial_capital,
            }),
            (true, None) => {
                warn!("Snapshot is flagged initialized but has no start_date; ignoring initial capital");
                None
            }
            _ => None,
        };

        let events = self
            .records
            .into_iter()
            .map(|r| r.into_event(EventKind::Manual))
            .chain(
                self.drip_records
                    .into_iter()
                    .map(|r| r.into_event(EventKind::Recurring)),
            );

        (Ledger::with_events(initial, events), self.drip_plans)
    }
}
