use chrono::Datelike;

use crate::models::analytics::{LedgerTotals, MonthlyFlow};
use crate::models::ledger::Ledger;

/// Aggregates over the ledger that need no valuation.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Net flow per calendar month, oldest month first. The initial capital
    /// counts as a contribution in its month; months without events are
    /// omitted.
    #[must_use]
    pub fn monthly_flows(&self, ledger: &Ledger) -> Vec<MonthlyFlow> {
        let mut months: Vec<MonthlyFlow> = Vec::new();

        for event in ledger.all_events() {
            let (year, month) = (event.date.year(), event.date.month());
            match months.last_mut() {
                Some(last) if last.year == year && last.month == month => {
                    last.net += event.amount;
                    last.event_count += 1;
                }
                _ => months.push(MonthlyFlow {
                    year,
                    month,
                    net: event.amount,
                    event_count: 1,
                }),
            }
        }

        months
    }

    /// Total contributed (initial capital included) and total returned.
    #[must_use]
    pub fn totals(&self, ledger: &Ledger) -> LedgerTotals {
        ledger
            .all_events()
            .iter()
            .fold(LedgerTotals::default(), |mut acc, e| {
                if e.amount < 0.0 {
                    acc.contributed -= e.amount;
                } else {
                    acc.returned += e.amount;
                }
                acc
            })
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
