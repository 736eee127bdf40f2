use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

use crate::errors::CoreError;
use crate::models::plan::Market;

use super::traits::CalendarPort;

/// Routes calendar queries to the calendar registered for each market.
///
/// Itself a `CalendarPort`, so the scheduler never needs to know whether it
/// talks to one calendar or several.
pub struct CalendarRegistry {
    calendars: HashMap<Market, Box<dyn CalendarPort>>,
}

impl CalendarRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            calendars: HashMap::new(),
        }
    }

    /// Register (or replace) the calendar used for `market`.
    pub fn register(&mut self, market: Market, calendar: Box<dyn CalendarPort>) {
        self.calendars.insert(market, calendar);
    }

    /// Builder-style `register`.
    pub fn with(mut self, market: Market, calendar: Box<dyn CalendarPort>) -> Self {
        self.register(market, calendar);
        self
    }

    pub fn get_calendar_for(&self, market: Market) -> Option<&dyn CalendarPort> {
        self.calendars.get(&market).map(|c| c.as_ref())
    }

    #[must_use]
    pub fn has_calendar_for(&self, market: Market) -> bool {
        self.calendars.contains_key(&market)
    }
}

impl Default for CalendarRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarPort for CalendarRegistry {
    fn name(&self) -> &str {
        "CalendarRegistry"
    }

    fn trading_days(
        &self,
        market: Market,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, CoreError> {
        let calendar = self
            .get_calendar_for(market)
            .ok_or_else(|| CoreError::CalendarUnavailable {
                market: market.to_string(),
                message: "no calendar registered".into(),
            })?;
        calendar.trading_days(market, from, to)
    }
}
