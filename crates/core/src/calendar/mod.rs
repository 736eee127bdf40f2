pub mod registry;
pub mod traits;

// Calendar implementations
pub mod weekday;
