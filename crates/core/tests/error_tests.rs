// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use fund_tracker_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_amount() {
        let err = CoreError::InvalidAmount("must not be zero".into());
        assert_eq!(err.to_string(), "Invalid amount: must not be zero");
    }

    #[test]
    fn date_order() {
        let err = CoreError::DateOrder {
            earliest: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            terminal: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Valuation date 2023-12-31 must be later than the earliest cash flow on 2024-01-01"
        );
    }

    #[test]
    fn sign_mismatch() {
        assert_eq!(
            CoreError::SignMismatch.to_string(),
            "XIRR needs at least one contribution and one inflow"
        );
    }

    #[test]
    fn non_convergence() {
        let err = CoreError::NonConvergence("secant stalled".into());
        assert_eq!(err.to_string(), "XIRR did not converge: secant stalled");
    }

    #[test]
    fn calendar_unavailable() {
        let err = CoreError::CalendarUnavailable {
            market: "foreign".into(),
            message: "timeout".into(),
        };
        assert_eq!(
            err.to_string(),
            "Trading calendar unavailable for market foreign: timeout"
        );
    }

    #[test]
    fn not_initialized() {
        assert_eq!(
            CoreError::NotInitialized.to_string(),
            "Initial capital has not been locked yet"
        );
    }

    #[test]
    fn already_initialized() {
        let err = CoreError::AlreadyInitialized {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            capital: 10000.0,
        };
        assert_eq!(
            err.to_string(),
            "Initial capital is already locked (10000 on 2024-01-01)"
        );
    }

    #[test]
    fn plan_not_found() {
        let err = CoreError::PlanNotFound("abc".into());
        assert_eq!(err.to_string(), "Contribution plan not found: abc");
    }

    #[test]
    fn storage_variants() {
        assert_eq!(
            CoreError::Serialization("x".into()).to_string(),
            "Serialization error: x"
        );
        assert_eq!(
            CoreError::Deserialization("y".into()).to_string(),
            "Deserialization error: y"
        );
        assert_eq!(CoreError::FileIO("z".into()).to_string(), "File I/O error: z");
    }

    #[test]
    fn validation_error() {
        let err = CoreError::ValidationError("bad".into());
        assert_eq!(err.to_string(), "Validation failed: bad");
    }
}

// ── From conversions ────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIO(ref m) if m.contains("gone")));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn question_mark_converts() {
        fn parse() -> Result<serde_json::Value, CoreError> {
            Ok(serde_json::from_str("[1,")?)
        }
        assert!(parse().is_err());
    }
}
