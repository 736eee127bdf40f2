use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

use crate::errors::CoreError;
use crate::models::plan::Market;

use super::traits::CalendarPort;

/// Monday-to-Friday calendar minus an explicit holiday list.
///
/// Good enough for exchanges whose only closures are weekends and a known
/// set of public holidays. The same dates apply to every market it is asked
/// about; register one instance per market in a `CalendarRegistry` when
/// markets differ.
#[derive(Debug, Clone, Default)]
pub struct WeekdayCalendar {
    name: String,
    holidays: BTreeSet<NaiveDate>,
}

impl WeekdayCalendar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            holidays: BTreeSet::new(),
        }
    }

    /// Builder-style: add closures on top of the weekends.
    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    #[must_use]
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }
}

impl CalendarPort for WeekdayCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    fn trading_days(
        &self,
        _market: Market,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, CoreError> {
        Ok(from
            .iter_days()
            .take_while(|d| *d <= to)
            .filter(|d| self.is_trading_day(*d))
            .collect())
    }
}
