use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::errors::CoreError;
use crate::models::plan::Market;

/// Source of trading days, one per market or one for several.
///
/// The scheduler only needs to know which dates are tradable so it can roll
/// a contribution due on a holiday forward. Real exchange calendars live
/// outside this crate; anything that can answer the question implements
/// this trait.
pub trait CalendarPort {
    /// Human-readable name of this calendar (for logs/errors).
    fn name(&self) -> &str;

    /// Every tradable date in `from..=to` for `market`.
    ///
    /// Return `CoreError::CalendarUnavailable` when the answer is unknown;
    /// callers then treat every date as tradable.
    fn trading_days(
        &self,
        market: Market,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, CoreError>;
}
