pub mod analytics;
pub mod event;
pub mod ledger;
pub mod plan;
pub mod settings;
pub mod snapshot;
