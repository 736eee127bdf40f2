// ═══════════════════════════════════════════════════════════════════
// Storage Tests — MemoryStore, JsonFileStore
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use fund_tracker_core::errors::CoreError;
use fund_tracker_core::models::event::CashFlowEvent;
use fund_tracker_core::models::ledger::{InitialCapital, Ledger};
use fund_tracker_core::models::plan::{ContributionPlan, Frequency, Market};
use fund_tracker_core::models::snapshot::PersistedState;
use fund_tracker_core::storage::json_file::JsonFileStore;
use fund_tracker_core::storage::memory::MemoryStore;
use fund_tracker_core::storage::traits::SnapshotStore;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn sample_state() -> PersistedState {
    let ledger = Ledger::with_events(
        Some(InitialCapital {
            start_date: d(2024, 1, 1),
            amount: 10_000.0,
        }),
        vec![
            CashFlowEvent::recurring(d(2024, 1, 2), -100.0, "plan:Index"),
            CashFlowEvent::manual(d(2024, 3, 1), 500.0, "partial sell"),
        ],
    );
    let plan = ContributionPlan::new("Index", Market::Domestic, Frequency::Weekly, 100.0, d(2024, 1, 2));
    PersistedState::from_parts(&ledger, &[plan])
}

// ═══════════════════════════════════════════════════════════════════
// MemoryStore
// ═══════════════════════════════════════════════════════════════════

mod memory_store {
    use super::*;

    #[test]
    fn empty_store_loads_none() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn with_state_loads_it() {
        let store = MemoryStore::with_state(sample_state());
        assert_eq!(store.load().unwrap(), Some(sample_state()));
    }

    #[test]
    fn clones_share_the_slot() {
        let observer = MemoryStore::new();
        let mut writer = observer.clone();

        writer.save(&sample_state()).unwrap();
        writer.save(&PersistedState::default()).unwrap();

        assert_eq!(observer.snapshot(), Some(PersistedState::default()));
        assert_eq!(observer.save_count(), 2);
    }
}

// ═══════════════════════════════════════════════════════════════════
// JsonFileStore
// ═══════════════════════════════════════════════════════════════════

mod json_file_store {
    use super::*;

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("fund_data.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fund_data.json");
        let mut store = JsonFileStore::new(&path);

        store.save(&sample_state()).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("fund_data.json.tmp").exists());
        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load().unwrap(), Some(sample_state()));
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("fund_data.json"));

        store.save(&sample_state()).unwrap();
        store.save(&PersistedState::default()).unwrap();

        assert_eq!(store.load().unwrap(), Some(PersistedState::default()));
    }

    #[test]
    fn file_uses_snapshot_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fund_data.json");
        let mut store = JsonFileStore::new(&path);
        store.save(&sample_state()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        for field in [
            "initialized",
            "initial_capital",
            "start_date",
            "records",
            "drip_records",
            "drip_plans",
        ] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(value["drip_plans"][0]["frequency"], "weekly");
    }

    #[test]
    fn loads_hand_written_legacy_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fund_data.json");
        std::fs::write(
            &path,
            r#"{
                "initialized": true,
                "initial_capital": 5000,
                "start_date": "2023-09-01",
                "records": [{ "date": "2023-10-01", "amount": -1000 }],
                "drip_plans": [{ "id": "a1", "name": "Old", "amount": 50, "start_date": "2023-09-04" }]
            }"#,
        )
        .unwrap();

        let state = JsonFileStore::new(&path).load().unwrap().unwrap();
        assert!(state.initialized);
        assert_eq!(state.initial_capital, 5000.0);
        assert_eq!(state.records.len(), 1);
        assert!(state.drip_records.is_empty());
        assert_eq!(state.drip_plans[0].frequency, Frequency::Daily);
        assert!(state.drip_plans[0].active);
    }

    #[test]
    fn corrupt_file_is_deserialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fund_data.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        match err {
            CoreError::Deserialization(msg) => assert!(msg.contains("fund_data.json")),
            other => panic!("expected Deserialization, got {other:?}"),
        }
    }

    #[test]
    fn save_into_missing_directory_is_file_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nope").join("fund_data.json"));
        let err = store.save(&sample_state()).unwrap_err();
        assert!(matches!(err, CoreError::FileIO(_)));
    }
}
