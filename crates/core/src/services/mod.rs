pub mod analytics_service;
pub mod ledger_service;
pub mod scheduler_service;
pub mod xirr_service;
