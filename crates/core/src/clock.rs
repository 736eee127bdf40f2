use chrono::{FixedOffset, NaiveDate, Utc};

use crate::errors::CoreError;

/// Supplies "today". Injected so scheduler passes are reproducible in tests.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock date at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn from_offset_hours(hours: i32) -> Result<Self, CoreError> {
        let offset = FixedOffset::east_opt(hours * 3600).ok_or_else(|| {
            CoreError::ValidationError(format!("Invalid UTC offset: {hours} hours"))
        })?;
        Ok(Self { offset })
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Always returns the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
