use chrono::NaiveDate;
use thiserror::Error;

/// Unified error type for the entire fund-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input Validation ────────────────────────────────────────────
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    // ── XIRR ────────────────────────────────────────────────────────
    #[error("Valuation date {terminal} must be later than the earliest cash flow on {earliest}")]
    DateOrder {
        earliest: NaiveDate,
        terminal: NaiveDate,
    },

    #[error("XIRR needs at least one contribution and one inflow")]
    SignMismatch,

    #[error("XIRR did not converge: {0}")]
    NonConvergence(String),

    // ── Calendar ────────────────────────────────────────────────────
    #[error("Trading calendar unavailable for market {market}: {message}")]
    CalendarUnavailable { market: String, message: String },

    // ── Ledger / Plans ──────────────────────────────────────────────
    #[error("Initial capital has not been locked yet")]
    NotInitialized,

    #[error("Initial capital is already locked ({capital} on {start_date})")]
    AlreadyInitialized { start_date: NaiveDate, capital: f64 },

    #[error("Contribution plan not found: {0}")]
    PlanNotFound(String),

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
