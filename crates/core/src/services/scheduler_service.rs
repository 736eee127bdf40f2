use chrono::{Days, NaiveDate};
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::calendar::traits::CalendarPort;
use crate::models::analytics::ScheduleEntry;
use crate::models::event::CashFlowEvent;
use crate::models::ledger::Ledger;
use crate::models::plan::{ContributionPlan, Market};

/// Days past "today" the calendar is asked about, so a contribution due just
/// before a long closure can still find its execution date.
pub const CALENDAR_LOOKAHEAD_DAYS: u64 = 31;

/// Identity of a materialized recurring event: execution date, amount in
/// cents, remark. Amounts are compared in cents because they round-trip
/// through persisted text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub date: NaiveDate,
    pub cents: i64,
    pub remark: String,
}

impl DedupKey {
    pub fn new(date: NaiveDate, amount: f64, remark: impl Into<String>) -> Self {
        Self {
            date,
            cents: (amount * 100.0).round() as i64,
            remark: remark.into(),
        }
    }

    pub fn from_event(event: &CashFlowEvent) -> Self {
        Self::new(event.date, event.amount, event.remark.clone())
    }
}

/// Turns active contribution plans into recurring ledger events.
///
/// Idempotent: the dedup key is the only guard, so running it on every load
/// and after every plan edit never duplicates or drops an event.
pub struct SchedulerService;

impl SchedulerService {
    pub fn new() -> Self {
        Self
    }

    /// Append every recurring event that is due by `today` and not yet in the
    /// ledger. Returns how many were added; zero means already up to date.
    pub fn materialize(
        &self,
        ledger: &mut Ledger,
        plans: &[ContributionPlan],
        calendar: Option<&dyn CalendarPort>,
        today: NaiveDate,
    ) -> usize {
        let due: Vec<&ContributionPlan> = plans
            .iter()
            .filter(|p| p.active && p.start_date <= today)
            .filter(|p| {
                let valid = p.amount.is_finite() && p.amount > 0.0;
                if !valid {
                    warn!("Skipping plan '{}': amount {} is not positive", p.name, p.amount);
                }
                valid
            })
            .collect();

        let trading_days = self.load_trading_days(&due, calendar, today);
        let mut known: HashSet<DedupKey> = ledger.events().iter().map(DedupKey::from_event).collect();
        let mut created = 0;

        for plan in due {
            let days = trading_days.get(&plan.market).and_then(Option::as_ref);
            let remark = plan.remark();
            let amount = -plan.amount;

            for entry in self.schedule(plan, days, today) {
                if entry.ignored {
                    continue;
                }
                if !known.insert(DedupKey::new(entry.execution, amount, remark.clone())) {
                    continue;
                }
                ledger.insert_sorted(CashFlowEvent::recurring(entry.execution, amount, remark.clone()));
                created += 1;
            }
        }

        if created > 0 {
            info!("Materialized {created} recurring contribution(s) up to {today}");
        } else {
            debug!("Recurring contributions already up to date as of {today}");
        }
        created
    }

    /// The `(nominal, execution)` pairs of `plan` whose execution date is on
    /// or before `until`.
    ///
    /// Nominal dates always step from the plan's anchor, never from a rolled
    /// execution date, so holidays do not shift the cadence. The walk stops at
    /// the first nominal whose execution is after `until`.
    /// `trading_days = None` means every date is tradable; nominals past the
    /// last known trading day are recorded as they are.
    #[must_use]
    pub fn schedule(
        &self,
        plan: &ContributionPlan,
        trading_days: Option<&BTreeSet<NaiveDate>>,
        until: NaiveDate,
    ) -> Vec<ScheduleEntry> {
        let mut entries = Vec::new();
        let mut index: u32 = 0;
        let mut uncovered_from: Option<NaiveDate> = None;

        while let Some(nominal) = plan.frequency.nth_date(plan.start_date, index) {
            if nominal > until {
                break;
            }
            let execution = match roll_forward(nominal, trading_days) {
                Some(execution) => execution,
                None => {
                    uncovered_from.get_or_insert(nominal);
                    nominal
                }
            };
            if execution > until {
                break;
            }
            entries.push(ScheduleEntry {
                nominal,
                execution,
                ignored: plan.is_ignored(nominal) || plan.is_ignored(execution),
            });
            index = match index.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }

        if let Some(from) = uncovered_from {
            warn!(
                "Trading calendar for {} ends before {from}; plan '{}' uses nominal dates from there on",
                plan.market, plan.name
            );
        }
        entries
    }

    /// Nominal dates of `plan` that execute on `execution`. Several nominals
    /// collapse onto one execution date when a closure spans more than one
    /// period.
    #[must_use]
    pub fn nominals_for_execution(
        &self,
        plan: &ContributionPlan,
        trading_days: Option<&BTreeSet<NaiveDate>>,
        execution: NaiveDate,
    ) -> Vec<NaiveDate> {
        self.schedule(plan, trading_days, execution)
            .into_iter()
            .filter(|e| e.execution == execution)
            .map(|e| e.nominal)
            .collect()
    }

    /// Ask the calendar for `market`'s trading days in `from..=to`.
    ///
    /// Any failure, and an empty answer, degrade to `None` (no roll-forward)
    /// instead of failing the pass.
    pub fn trading_days_for(
        &self,
        calendar: Option<&dyn CalendarPort>,
        market: Market,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Option<BTreeSet<NaiveDate>> {
        let calendar = calendar?;
        match calendar.trading_days(market, from, to) {
            Ok(days) if days.is_empty() => {
                warn!(
                    "Calendar '{}' returned no trading days for {market} in {from}..={to}; \
                     holiday roll-forward disabled",
                    calendar.name()
                );
                None
            }
            Ok(days) => Some(days),
            Err(e) => {
                warn!(
                    "Calendar '{}' unavailable for {market}: {e}; holiday roll-forward disabled",
                    calendar.name()
                );
                None
            }
        }
    }

    /// One calendar query per market, covering every due plan of that market.
    fn load_trading_days(
        &self,
        plans: &[&ContributionPlan],
        calendar: Option<&dyn CalendarPort>,
        today: NaiveDate,
    ) -> HashMap<Market, Option<BTreeSet<NaiveDate>>> {
        let mut earliest: HashMap<Market, NaiveDate> = HashMap::new();
        for plan in plans {
            earliest
                .entry(plan.market)
                .and_modify(|d| *d = (*d).min(plan.start_date))
                .or_insert(plan.start_date);
        }

        let to = today
            .checked_add_days(Days::new(CALENDAR_LOOKAHEAD_DAYS))
            .unwrap_or(today);

        earliest
            .into_iter()
            .map(|(market, from)| (market, self.trading_days_for(calendar, market, from, to)))
            .collect()
    }
}

impl Default for SchedulerService {
    fn default() -> Self {
        Self::new()
    }
}

/// Earliest tradable date on or after `nominal`. `None` when the known
/// trading days end before it, i.e. the calendar does not cover `nominal`.
fn roll_forward(nominal: NaiveDate, trading_days: Option<&BTreeSet<NaiveDate>>) -> Option<NaiveDate> {
    match trading_days {
        None => Some(nominal),
        Some(days) => days.range(nominal..).next().copied(),
    }
}
