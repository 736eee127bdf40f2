use chrono::{Days, Months, NaiveDate};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Market a plan buys into. Selects the trading calendar used for
/// holiday roll-forward.
///
/// Unknown codes in a snapshot load as the default market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Home exchange
    #[default]
    Domestic,
    /// Funds tracking an overseas exchange (follow that exchange's holidays)
    Foreign,
}

impl Market {
    /// Code used in persisted snapshots and calendar lookups.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Market::Domestic => "domestic",
            Market::Foreign => "foreign",
        }
    }

    /// Inverse of `code`, case-insensitive.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "domestic" => Some(Market::Domestic),
            "foreign" => Some(Market::Foreign),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Market {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code(&code).unwrap_or_else(|| {
            let fallback = Market::default();
            warn!("Unknown market '{code}' in snapshot; using {fallback}");
            fallback
        }))
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// How often a plan contributes. Unknown codes load as daily.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// The `index`-th nominal date counted from `anchor` (index 0 is the anchor).
    ///
    /// Always computed from the anchor rather than from the previous date, so
    /// a monthly plan anchored on the 31st is clamped to Feb 29 and comes back
    /// to Mar 31. Returns `None` past chrono's date range.
    #[must_use]
    pub fn nth_date(&self, anchor: NaiveDate, index: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => anchor.checked_add_days(Days::new(u64::from(index))),
            Frequency::Weekly => anchor.checked_add_days(Days::new(u64::from(index) * 7)),
            Frequency::Monthly => anchor.checked_add_months(Months::new(index)),
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Frequency::Daily),
            "weekly" => Some(Frequency::Weekly),
            "monthly" => Some(Frequency::Monthly),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code(&code).unwrap_or_else(|| {
            let fallback = Frequency::default();
            warn!("Unknown frequency '{code}' in snapshot; using {fallback}");
            fallback
        }))
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
        }
    }
}

/// Prefix of the remark carried by every event a plan materializes.
pub const PLAN_REMARK_PREFIX: &str = "plan:";

fn new_plan_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_active() -> bool {
    true
}

/// An automated recurring contribution ("drip" investment).
///
/// Serialized field names follow the persisted snapshot format; fields added
/// after the first release default so that older snapshots still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionPlan {
    /// Unique identifier
    #[serde(default = "new_plan_id")]
    pub id: String,

    /// Display name, unique per tracker
    pub name: String,

    #[serde(default)]
    pub market: Market,

    #[serde(default)]
    pub frequency: Frequency,

    /// Amount contributed per period (always positive)
    pub amount: f64,

    /// Phase anchor of the schedule. Never changes after creation.
    pub start_date: NaiveDate,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Nominal (or, in older snapshots, execution) dates the user skipped
    #[serde(default)]
    pub ignored_dates: BTreeSet<NaiveDate>,
}

impl ContributionPlan {
    pub fn new(
        name: impl Into<String>,
        market: Market,
        frequency: Frequency,
        amount: f64,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: new_plan_id(),
            name: name.into(),
            market,
            frequency,
            amount,
            start_date,
            active: true,
            ignored_dates: BTreeSet::new(),
        }
    }

    /// Remark attached to every event this plan materializes.
    #[must_use]
    pub fn remark(&self) -> String {
        format!("{PLAN_REMARK_PREFIX}{}", self.name)
    }

    /// Whether a nominal or execution date was skipped by the user.
    #[must_use]
    pub fn is_ignored(&self, date: NaiveDate) -> bool {
        self.ignored_dates.contains(&date)
    }
}
