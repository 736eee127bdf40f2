pub mod calendar;
pub mod clock;
pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use chrono::{Days, NaiveDate};
use log::{debug, info};
use std::collections::BTreeSet;

use calendar::traits::CalendarPort;
use clock::{Clock, SystemClock};
use models::{
    analytics::{LedgerTotals, MonthlyFlow, ScheduleEntry, XirrReport},
    event::{CashFlowEvent, EventKind, EventMatch},
    ledger::{InitialCapital, Ledger},
    plan::{ContributionPlan, Frequency, Market},
    settings::TrackerConfig,
    snapshot::PersistedState,
};
use services::{
    analytics_service::AnalyticsService,
    ledger_service::{ensure_positive, LedgerService},
    scheduler_service::{SchedulerService, CALENDAR_LOOKAHEAD_DAYS},
    xirr_service::XirrService,
};
use storage::traits::SnapshotStore;

use errors::CoreError;

/// Main entry point for the Fund Tracker core library.
///
/// Holds the ledger and plan set together with the injected ports (snapshot
/// store, trading calendar, clock). Every mutation is saved immediately.
#[must_use]
pub struct FundTracker {
    ledger: Ledger,
    plans: Vec<ContributionPlan>,
    store: Box<dyn SnapshotStore>,
    calendar: Option<Box<dyn CalendarPort>>,
    clock: Box<dyn Clock>,
    config: TrackerConfig,
    ledger_service: LedgerService,
    scheduler_service: SchedulerService,
    xirr_service: XirrService,
    analytics_service: AnalyticsService,
}

impl std::fmt::Debug for FundTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundTracker")
            .field("initial", &self.ledger.initial)
            .field("events", &self.ledger.events().len())
            .field("plans", &self.plans.len())
            .field("store", &self.store.name())
            .field("calendar", &self.calendar.as_ref().map(|c| c.name().to_string()))
            .field("config", &self.config)
            .finish()
    }
}

impl FundTracker {
    /// Open a tracker on `store` using the wall clock and no trading calendar
    /// (contributions are recorded on their nominal dates).
    pub fn open(store: Box<dyn SnapshotStore>, config: TrackerConfig) -> Result<Self, CoreError> {
        let clock = SystemClock::from_offset_hours(config.utc_offset_hours)?;
        Self::open_with(store, config, None, Box::new(clock))
    }

    /// Open a tracker with every port supplied explicitly.
    ///
    /// Loads the saved snapshot (an empty store gives an empty tracker) and
    /// runs one scheduler pass so recurring contributions are up to date.
    pub fn open_with(
        store: Box<dyn SnapshotStore>,
        config: TrackerConfig,
        calendar: Option<Box<dyn CalendarPort>>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let state = store.load()?.unwrap_or_default();
        let (ledger, plans) = state.into_parts();
        debug!(
            "Loaded snapshot from {} store: {} event(s), {} plan(s)",
            store.name(),
            ledger.events().len(),
            plans.len()
        );

        let mut tracker = Self {
            ledger,
            plans,
            store,
            calendar,
            clock,
            ledger_service: LedgerService::new(config.removal_epsilon),
            scheduler_service: SchedulerService::new(),
            xirr_service: XirrService::new(config.solver),
            analytics_service: AnalyticsService::new(),
            config,
        };
        tracker.regenerate()?;
        Ok(tracker)
    }

    // ── Initial Capital ─────────────────────────────────────────────

    /// Lock the starting capital. One-way: fails with `AlreadyInitialized`
    /// once locked; use `reinitialize` to re-lock deliberately.
    pub fn initialize(&mut self, start_date: NaiveDate, capital: f64) -> Result<(), CoreError> {
        self.ledger_service
            .initialize(&mut self.ledger, start_date, capital)?;
        self.save()
    }

    /// Replace the locked starting capital.
    pub fn reinitialize(&mut self, start_date: NaiveDate, capital: f64) -> Result<(), CoreError> {
        self.ledger_service
            .reinitialize(&mut self.ledger, start_date, capital)?;
        info!("Initial capital re-locked: {capital} on {start_date}");
        self.save()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.ledger.is_initialized()
    }

    #[must_use]
    pub fn initial_capital(&self) -> Option<InitialCapital> {
        self.ledger.initial
    }

    /// The initial capital as a negative cash-flow event.
    #[must_use]
    pub fn initial_capital_event(&self) -> Option<CashFlowEvent> {
        self.ledger.initial_capital_event()
    }

    // ── Manual Events ───────────────────────────────────────────────

    /// Record a signed manual cash flow (negative = money into the fund).
    /// Requires the initial capital to be locked.
    pub fn add_manual(
        &mut self,
        date: NaiveDate,
        signed_amount: f64,
        remark: impl Into<String>,
    ) -> Result<CashFlowEvent, CoreError> {
        if !self.ledger.is_initialized() {
            return Err(CoreError::NotInitialized);
        }
        let event = self
            .ledger_service
            .add_manual(&mut self.ledger, date, signed_amount, remark)?;
        self.save()?;
        Ok(event)
    }

    /// Record a buy: `amount` (positive) goes into the fund.
    pub fn add_buy(
        &mut self,
        date: NaiveDate,
        amount: f64,
        remark: impl Into<String>,
    ) -> Result<CashFlowEvent, CoreError> {
        let amount = ensure_positive(amount, "Buy amount")?;
        self.add_manual(date, -amount, remark)
    }

    /// Record a sell: `amount` (positive) comes back to the investor.
    pub fn add_sell(
        &mut self,
        date: NaiveDate,
        amount: f64,
        remark: impl Into<String>,
    ) -> Result<CashFlowEvent, CoreError> {
        let amount = ensure_positive(amount, "Sell amount")?;
        self.add_manual(date, amount, remark)
    }

    /// Remove the first event matching `criteria`. Returns `Ok(None)` (and
    /// saves nothing) when no event matches.
    pub fn remove_event(&mut self, criteria: &EventMatch) -> Result<Option<CashFlowEvent>, CoreError> {
        let removed = self.ledger_service.remove(&mut self.ledger, criteria);
        if removed.is_some() {
            self.save()?;
        }
        Ok(removed)
    }

    /// Stored events (manual and recurring), ascending by date.
    #[must_use]
    pub fn events(&self) -> &[CashFlowEvent] {
        self.ledger.events()
    }

    /// Initial capital plus stored events, ascending by date.
    #[must_use]
    pub fn all_events(&self) -> Vec<CashFlowEvent> {
        self.ledger.all_events()
    }

    #[must_use]
    pub fn events_of_kind(&self, kind: EventKind) -> Vec<&CashFlowEvent> {
        self.ledger.events_of_kind(kind).collect()
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.ledger.events().len()
    }

    // ── Contribution Plans ──────────────────────────────────────────

    /// Create an active plan and materialize whatever is already due.
    /// Returns the new plan's id.
    pub fn add_plan(
        &mut self,
        name: impl Into<String>,
        market: Market,
        frequency: Frequency,
        amount: f64,
        start_date: NaiveDate,
    ) -> Result<String, CoreError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(CoreError::ValidationError("Plan name must not be empty".into()));
        }
        if self.plans.iter().any(|p| p.name == name) {
            return Err(CoreError::ValidationError(format!(
                "A plan named '{name}' already exists"
            )));
        }
        let amount = ensure_positive(amount, "Plan amount")?;

        let plan = ContributionPlan::new(name, market, frequency, amount, start_date);
        let id = plan.id.clone();
        info!("Added {frequency} plan '{}' ({amount} from {start_date})", plan.name);
        self.plans.push(plan);
        self.save()?;
        self.regenerate()?;
        Ok(id)
    }

    /// Delete a plan. Events it already materialized stay in the ledger.
    pub fn remove_plan(&mut self, plan_id: &str) -> Result<ContributionPlan, CoreError> {
        let idx = self.plan_index(plan_id)?;
        let plan = self.plans.remove(idx);
        self.save()?;
        Ok(plan)
    }

    /// Pause or resume a plan. Resuming catches up on every period that came
    /// due meanwhile; returns the number of events materialized.
    pub fn set_plan_active(&mut self, plan_id: &str, active: bool) -> Result<usize, CoreError> {
        let idx = self.plan_index(plan_id)?;
        self.plans[idx].active = active;
        self.save()?;
        self.regenerate()
    }

    /// Skip a nominal date of a plan from now on.
    pub fn ignore_date(&mut self, plan_id: &str, date: NaiveDate) -> Result<(), CoreError> {
        let idx = self.plan_index(plan_id)?;
        if self.plans[idx].ignored_dates.insert(date) {
            self.save()?;
        }
        Ok(())
    }

    /// Stop skipping a date; the contribution is materialized again if due.
    pub fn unignore_date(&mut self, plan_id: &str, date: NaiveDate) -> Result<usize, CoreError> {
        let idx = self.plan_index(plan_id)?;
        if !self.plans[idx].ignored_dates.remove(&date) {
            return Ok(0);
        }
        self.save()?;
        self.regenerate()
    }

    /// Delete a recurring event and make sure the scheduler never recreates it.
    ///
    /// Every nominal date that executes on the event's date is added to the
    /// owning plan's ignored dates. Returns `Ok(None)` when the event no
    /// longer exists.
    pub fn skip_recurring_event(
        &mut self,
        date: NaiveDate,
        amount: f64,
        remark: &str,
    ) -> Result<Option<CashFlowEvent>, CoreError> {
        let idx = self
            .plans
            .iter()
            .position(|p| p.remark() == remark)
            .ok_or_else(|| CoreError::PlanNotFound(remark.to_string()))?;

        let criteria = EventMatch::new(date, amount, remark, EventKind::Recurring);
        let Some(removed) = self.ledger_service.remove(&mut self.ledger, &criteria) else {
            return Ok(None);
        };

        let plan = &self.plans[idx];
        let days = self.trading_days_until(plan, date);
        let mut nominals = self
            .scheduler_service
            .nominals_for_execution(plan, days.as_ref(), date);
        if nominals.is_empty() {
            nominals.push(date);
        }

        debug!("Skipping '{}' on {date}: ignoring nominal date(s) {nominals:?}", plan.name);
        self.plans[idx].ignored_dates.extend(nominals);
        self.save()?;
        Ok(Some(removed))
    }

    #[must_use]
    pub fn plan(&self, plan_id: &str) -> Option<&ContributionPlan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    #[must_use]
    pub fn plans(&self) -> &[ContributionPlan] {
        &self.plans
    }

    /// A plan's `(nominal, execution)` schedule up to `until`, ignored
    /// entries flagged.
    pub fn upcoming_schedule(
        &self,
        plan_id: &str,
        until: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>, CoreError> {
        let plan = &self.plans[self.plan_index(plan_id)?];
        let days = self.trading_days_until(plan, until);
        Ok(self.scheduler_service.schedule(plan, days.as_ref(), until))
    }

    // ── Scheduler ───────────────────────────────────────────────────

    /// Materialize every recurring contribution due by today. Safe to call
    /// any number of times; returns how many events were added.
    pub fn regenerate(&mut self) -> Result<usize, CoreError> {
        let today = self.clock.today();
        let created = self.scheduler_service.materialize(
            &mut self.ledger,
            &self.plans,
            self.calendar.as_deref(),
            today,
        );
        if created > 0 {
            self.save()?;
        }
        Ok(created)
    }

    /// Today as seen by the injected clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ── XIRR & Analytics ────────────────────────────────────────────

    /// Annualized money-weighted return if the portfolio is worth
    /// `terminal_value` on `terminal_date`.
    pub fn calculate_xirr(
        &self,
        terminal_date: NaiveDate,
        terminal_value: f64,
    ) -> Result<XirrReport, CoreError> {
        if !terminal_value.is_finite() || terminal_value < 0.0 {
            return Err(CoreError::InvalidAmount(format!(
                "Valuation must be a non-negative number, got {terminal_value}"
            )));
        }
        let flows = self.ledger_service.cash_flows(&self.ledger);
        self.xirr_service
            .report(&flows, terminal_date, terminal_value)
    }

    /// Net flow per calendar month, oldest first.
    #[must_use]
    pub fn monthly_flows(&self) -> Vec<MonthlyFlow> {
        self.analytics_service.monthly_flows(&self.ledger)
    }

    #[must_use]
    pub fn totals(&self) -> LedgerTotals {
        self.analytics_service.totals(&self.ledger)
    }

    // ── Snapshot / Config ───────────────────────────────────────────

    /// The state exactly as it is persisted.
    #[must_use]
    pub fn snapshot(&self) -> PersistedState {
        PersistedState::from_parts(&self.ledger, &self.plans)
    }

    pub fn export_snapshot_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize snapshot: {e}")))
    }

    /// Replace the whole state with an exported snapshot, save it, then
    /// catch up on recurring contributions. Returns the number materialized.
    pub fn import_snapshot_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let state: PersistedState = serde_json::from_str(json)?;
        let (ledger, plans) = state.into_parts();
        info!(
            "Importing snapshot: {} event(s), {} plan(s)",
            ledger.events().len(),
            plans.len()
        );
        self.ledger = ledger;
        self.plans = plans;
        self.save()?;
        self.regenerate()
    }

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // ── Internal ────────────────────────────────────────────────────

    fn save(&mut self) -> Result<(), CoreError> {
        let state = PersistedState::from_parts(&self.ledger, &self.plans);
        self.store.save(&state)?;
        debug!("Saved snapshot to {} store", self.store.name());
        Ok(())
    }

    fn plan_index(&self, plan_id: &str) -> Result<usize, CoreError> {
        self.plans
            .iter()
            .position(|p| p.id == plan_id)
            .ok_or_else(|| CoreError::PlanNotFound(plan_id.to_string()))
    }

    fn trading_days_until(
        &self,
        plan: &ContributionPlan,
        until: NaiveDate,
    ) -> Option<BTreeSet<NaiveDate>> {
        let to = until
            .checked_add_days(Days::new(CALENDAR_LOOKAHEAD_DAYS))
            .unwrap_or(until);
        self.scheduler_service.trading_days_for(
            self.calendar.as_deref(),
            plan.market,
            plan.start_date,
            to,
        )
    }
}
