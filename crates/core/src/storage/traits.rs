use crate::errors::CoreError;
use crate::models::snapshot::PersistedState;

/// Where the tracker keeps its snapshot between runs.
///
/// Injected into `FundTracker` so the core never hard-codes a file path;
/// tests use `MemoryStore`, desktop builds use `JsonFileStore`.
pub trait SnapshotStore {
    /// Human-readable name of this store (for logs/errors).
    fn name(&self) -> &str;

    /// Read the last saved snapshot. `Ok(None)` means nothing was saved yet.
    fn load(&self) -> Result<Option<PersistedState>, CoreError>;

    /// Durably replace the saved snapshot.
    fn save(&mut self, state: &PersistedState) -> Result<(), CoreError>;
}
